//! `pharmastock` command-line front end.

mod args;
mod commands;
mod exit;
mod output;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use pharmastock_infra::{Config, Store, StoreOptions};

use crate::args::Cli;
use crate::commands::App;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit::report(&err),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(path) = cli.db.clone() {
        config.database_path = path;
    }
    pharmastock_observability::init(&config.log);

    let store = Store::open(&config.database_path, &StoreOptions::from(&config))
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    let app = App::new(store, config, &cli);
    let result = commands::dispatch(&app, cli.command).await;
    app.store.close().await;
    result
}
