mod core;
pub mod backend;

pub use crate::core::{Account, AccountNumber, Amount, Ledger, LedgerError, LedgerResult};
pub use crate::core::{account, ledger, error};
