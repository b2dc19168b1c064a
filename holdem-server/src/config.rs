use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Service configuration persisted as TOML.
///
/// Fields:
/// - bind_addr: address the HTTP/WS listener binds to
/// - ledger_base_url: base URL of the external ledger service (`None` runs
///   against the in-process fake ledger instead)
/// - turn_timer_secs: default `turnTimerSeconds` used when a `createTable`
///   request omits it (rake parameters are per-table, see `TableConfig`)
/// - next_hand_delay_ms: pause between a hand ending and the next one dealing
/// - log_level: default `RUST_LOG`-style filter when the env var is unset
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub ledger_base_url: Option<String>,
    pub turn_timer_secs: u64,
    pub next_hand_delay_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "127.0.0.1:3000".to_string(),
            ledger_base_url: None,
            turn_timer_secs: 30,
            next_hand_delay_ms: 3000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`. If the file does not exist, create it
    /// with reasonable defaults and return the default config.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parsing TOML config '{}'", path.display()))?;
            Ok(cfg)
        } else {
            // Create directories if needed
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("creating config directory '{}'", parent.display())
                    })?;
                }
            }

            let cfg = Config::default();
            let toml_text = toml::to_string_pretty(&cfg)
                .with_context(|| "serializing default config to TOML")?;
            fs::write(path, toml_text)
                .with_context(|| format!("writing default config to '{}'", path.display()))?;
            Ok(cfg)
        }
    }

    /// Save the current config state back to the provided path (overwrites).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating config directory '{}'", parent.display()))?;
            }
        }
        let toml_text =
            toml::to_string_pretty(&self).with_context(|| "serializing config to TOML")?;
        fs::write(path, toml_text)
            .with_context(|| format!("writing config to '{}'", path.display()))?;
        Ok(())
    }

}
