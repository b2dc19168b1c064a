use clap::Parser;
use std::path::PathBuf;

/// Server CLI for holdem-server.
#[derive(Parser, Debug, Clone)]
#[command(name = "holdem-server", version, about = "Self-hosted Texas Hold'em game service")]
pub struct ServerCli {
    /// Path to config file
    #[arg(long, default_value = "holdem-server.toml")]
    pub config: PathBuf,

    /// Address to bind the HTTP/WS listener to (overrides config.bind_addr)
    #[arg(long)]
    pub bind_addr: Option<String>,

    /// Base URL of the ledger service (overrides config.ledger_base_url)
    #[arg(long)]
    pub ledger_base_url: Option<String>,

    /// Persist CLI overrides back to the config file
    #[arg(long, default_value_t = false)]
    pub persist: bool,

    /// Enable verbose debug logging
    #[arg(long, short, default_value_t = false)]
    pub debug: bool,
}
