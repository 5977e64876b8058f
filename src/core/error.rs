use std::io;

use thiserror::Error;

use crate::core::{AccountNumber, Amount};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Occurs when a negative amount or interest rate is passed
    /// to an operation that changes a balance, or when the
    /// resulting balance would not fit in an `Amount`.
    #[error("invalid amount: {0}")]
    InvalidAmount(Amount),
    /// Occurs when a withdrawal exceeds the current balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Amount,
        available: Amount
    },
    /// Occurs when referencing an account number which
    /// does not exist on the ledger.
    #[error("no such account: {0}")]
    AccountNotFound(AccountNumber),
    /// Occurs when a persisted record does not describe a valid account.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    /// Occurs when the backing store cannot be opened, read or written.
    #[error("storage unavailable at {location}: {source}")]
    StorageUnavailable {
        location: String,
        #[source]
        source: io::Error
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub(crate) fn storage(location: impl Into<String>, source: impl Into<io::Error>) -> Self {
        LedgerError::StorageUnavailable { location: location.into(), source: source.into() }
    }
}
