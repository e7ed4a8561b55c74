//! Rota CLI entry point.

use clap::Parser;

use rota::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => rota::cli::commands::init::execute(args, cli.json).await,
        Commands::Run => rota::cli::commands::run::execute(cli.config.as_deref()).await,
        Commands::Check => {
            rota::cli::commands::check::execute(cli.json, cli.config.as_deref()).await
        }
        Commands::Tasks(args) => {
            rota::cli::commands::tasks::execute(args, cli.json, cli.config.as_deref()).await
        }
    };

    if let Err(err) = result {
        rota::cli::handle_error(&err, cli.json);
    }
}
