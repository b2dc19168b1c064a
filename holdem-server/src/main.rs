//! Entry point for holdem-server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use holdem_server::broadcast::BroadcastBus;
use holdem_server::cli::ServerCli;
use holdem_server::config::Config;
use holdem_server::ledger::{HttpLedgerClient, InProcessLedger, LedgerClient};
use holdem_server::orchestrator::Orchestrator;
use holdem_server::server;
use holdem_server::store::TableStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = ServerCli::parse();
    let config_path: PathBuf = cli.config.clone();

    let mut cfg = Config::load_or_create(&config_path)
        .with_context(|| format!("loading or creating config '{}'", config_path.display()))?;

    if let Some(bind_addr) = cli.bind_addr.clone() {
        cfg.bind_addr = bind_addr;
    }
    if let Some(ledger_base_url) = cli.ledger_base_url.clone() {
        cfg.ledger_base_url = Some(ledger_base_url);
    }
    if cli.debug {
        cfg.log_level = "debug".to_string();
    }

    if cli.persist {
        cfg.save(&config_path)
            .with_context(|| format!("saving updated config '{}'", config_path.display()))?;
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cfg.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = TableStore::new();
    let bus = BroadcastBus::new();
    let ledger: Arc<dyn LedgerClient> = match &cfg.ledger_base_url {
        Some(base_url) => {
            tracing::info!(base_url, "using HTTP ledger client");
            Arc::new(HttpLedgerClient::new(base_url.clone()))
        }
        None => {
            tracing::info!("no ledger_base_url configured, using in-process fake ledger");
            Arc::new(InProcessLedger)
        }
    };

    let bind_addr = cfg.bind_addr.clone();
    let orchestrator = Orchestrator::new(store, bus, ledger, cfg);

    tracing::info!(config = %config_path.display(), "starting holdem-server");
    server::run_server(orchestrator, &bind_addr).await
}
