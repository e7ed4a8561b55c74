//! Implementation of the `rota run` command.
//!
//! Long-running daemon mode: arms the midnight timer chain for the
//! configured tasks and keeps it alive until interrupted. On Unix,
//! SIGHUP reloads the task definitions into a fresh session; connection
//! settings (base URL, token) require a restart.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::adapters::clock::SystemClock;
use crate::adapters::hass::HassTodoClient;
use crate::adapters::http::TriggerServer;
use crate::cli::load_config;
use crate::infrastructure::logging::LoggerImpl;
use crate::services::SessionManager;

type Manager = SessionManager<HassTodoClient, SystemClock>;

pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let _logger = LoggerImpl::init(&config.logging).context("Failed to initialize logging")?;

    anyhow::ensure!(
        !config.home_assistant.token.trim().is_empty(),
        "home_assistant.token is not set; add it to rota.yaml or ROTA_HOME_ASSISTANT__TOKEN"
    );

    let chores = config.chores().context("Invalid task definitions")?;
    info!(
        tasks = chores.len(),
        instance = %config.home_assistant.base_url,
        "starting reminder daemon"
    );

    let todo = Arc::new(HassTodoClient::from_config(&config.home_assistant)?);
    let clock = Arc::new(SystemClock);
    let manager = Arc::new(Manager::new(todo, clock, config.scheduler.catch_up_grace_secs));

    let session = manager.replace(chores).await?;
    info!(session = %session, "reminder session started");

    let trigger = if config.trigger.enabled {
        let server = TriggerServer::new(Arc::clone(&manager), config.trigger.clone());
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = server.serve_with_shutdown(shutdown).await {
                error!(error = %e, "trigger server exited with error");
            }
        });
        Some((shutdown_tx, handle))
    } else {
        None
    };

    wait_for_signals(&manager, config_path).await?;

    manager.stop().await;
    if let Some((shutdown_tx, handle)) = trigger {
        let _ = shutdown_tx.send(());
        if handle.await.is_err() {
            error!("trigger server task panicked");
        }
    }
    info!("reminder daemon stopped");
    Ok(())
}

/// Block until shutdown is requested, handling reloads in between.
#[cfg(unix)]
async fn wait_for_signals(manager: &Arc<Manager>, config_path: Option<&Path>) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for ctrl-c")?;
                info!("shutdown signal received");
                return Ok(());
            }
            _ = terminate.recv() => {
                info!("termination signal received");
                return Ok(());
            }
            _ = hangup.recv() => {
                info!("reload signal received");
                reload(manager, config_path).await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signals(_manager: &Arc<Manager>, _config_path: Option<&Path>) -> Result<()> {
    tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
    info!("shutdown signal received");
    Ok(())
}

/// Re-read the config and swap the session to the new task set.
///
/// A reload that fails to load or validate leaves the current session
/// running untouched.
#[cfg(unix)]
async fn reload(manager: &Arc<Manager>, config_path: Option<&Path>) {
    let chores = match load_config(config_path).and_then(|config| config.chores().map_err(Into::into)) {
        Ok(chores) => chores,
        Err(e) => {
            warn!(error = %e, "reload skipped, configuration did not validate");
            return;
        }
    };

    match manager.replace(chores).await {
        Ok(session) => info!(session = %session, "reminder session replaced"),
        Err(e) => error!(error = %e, "failed to replace session"),
    }
}
