mod csv_store;
mod json_store;
mod interface;

use std::path::Path;

use clap::ValueEnum;
use serde::{Serialize, Deserialize};

pub use interface::{AccountStore, Result, RejectedRecord, StoredAccounts};
pub use csv_store::CsvStore;
pub use json_store::JsonStore;

/// On-disk layout of a ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Csv,
    Json
}

impl StoreFormat {
    pub fn open(self, path: impl AsRef<Path>) -> Box<dyn AccountStore> {
        match self {
            StoreFormat::Csv => Box::new(CsvStore::new(path)),
            StoreFormat::Json => Box::new(JsonStore::new(path))
        }
    }
}
