mod cli;
mod commands;
mod config;
mod logging;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use crate::cli::{Cli, Command};
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level).context("failed to initialize logging")?;

    let output = match &cli.command {
        Command::Serve(args) => {
            let config = ServerConfig::from(args);
            return server::serve(config, shutdown_signal()).await;
        }
        Command::ToDate(args) => commands::to_date(args)?,
        Command::ToTimestamp(args) => commands::to_timestamp(args)?,
        Command::Batch(args) => commands::batch(args)?,
    };
    println!("{output}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
}
