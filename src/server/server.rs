mod error;
mod routes;
mod server_config;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, warn};

use bankledger::Ledger;
use routes::AppState;
use server_config::AppConfig;

const SERVER_CONFIG: &str = "resources/server.toml";

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Path to the server configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>
}

fn read_config(args: &Args) -> anyhow::Result<AppConfig> {
    match &args.config {
        Some(path) => AppConfig::read(path),
        None if Path::new(SERVER_CONFIG).exists() => AppConfig::read(SERVER_CONFIG),
        None => {
            info!("no configuration at {}, using defaults", SERVER_CONFIG);
            Ok(AppConfig::default())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = read_config(&args)?;

    let store = config.ledger.format.open(&config.ledger.name);
    let ledger = Ledger::with_store(&config.ledger.name, store);
    let state = AppState::new(ledger, config.ledger.autosave);
    let app = routes::build_router(state.clone(), config.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let ledger = state.ledger().map_err(|err| anyhow!("{:?}", err))?;
    ledger.save_to_file().with_context(|| "failed to save ledger on shutdown")?;
    Ok(())
}
