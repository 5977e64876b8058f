use std::{fs, net::SocketAddr, path::{Path, PathBuf}};
use serde::{Serialize, Deserialize};
use toml;
use anyhow::{self, Context};

use bankledger::backend::StoreFormat;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ledger name, also the path of its backing file
    pub name: String,
    pub format: StoreFormat,
    /// Save after every successful mutation
    pub autosave: bool
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig { name: "bank.csv".to_owned(), format: StoreFormat::Csv, autosave: false }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub ledger: LedgerConfig
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            static_dir: None,
            ledger: LedgerConfig::default()
        }
    }
}

impl AppConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(filepath)
            .with_context(|| "failed to read config file")?;
        let config = toml::from_str(&file_content)
            .with_context(|| "failed to parse config file")?;
        return Ok(config);
    }
}
