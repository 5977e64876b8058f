use std::path::Path;

use crate::core::{Account, LedgerError};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A stored line that could not be turned into an account.
#[derive(Debug)]
pub struct RejectedRecord {
    pub line: u64,
    pub error: LedgerError
}

/// Accounts read from a store, in stored order, plus whatever was skipped.
#[derive(Debug, Default)]
pub struct StoredAccounts {
    pub accounts: Vec<Account>,
    pub rejected: Vec<RejectedRecord>
}

pub trait AccountStore: Send {
    fn location(&self) -> &Path;

    /// Reads every account in the store.
    /// Returns `Ok(None)` when the store does not exist yet.
    fn read(&self) -> Result<Option<StoredAccounts>>;

    /// Replaces the store content with `accounts`, in the given order.
    fn save(&self, accounts: &[Account]) -> Result<()>;
}
