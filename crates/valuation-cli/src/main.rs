//! valuation-cli: value an NSE-listed company from its published figures.
//!
//! Computes the valuation metrics, scores them against sector-aware bands and
//! prints a verdict. Named analyses are kept in a small JSON store.
//!
//! Usage:
//!   cargo run -p valuation-cli -- accept-disclaimer
//!   cargo run -p valuation-cli -- analyze --sample
//!   cargo run -p valuation-cli -- analyze ncba.json --save "NCBA FY2024" --export
//!   cargo run -p valuation-cli -- list

mod commands;
mod config;

use std::sync::Arc;

use analysis_store::JsonFileStore;
use commands::{Command, Shell};
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valuation_cli=info,analysis_store=warn,valuation_orchestrator=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n", e);
            eprintln!("{}", commands::usage());
            std::process::exit(1);
        }
    };

    let config = AppConfig::from_env();
    tracing::debug!("Using data directory {}", config.data_dir.display());

    let store = Arc::new(JsonFileStore::new(config.data_dir.clone()));
    let mut shell = Shell::open(store, config.max_saved).await;

    let output = shell.run(command).await?;
    println!("{}", output);
    Ok(())
}
