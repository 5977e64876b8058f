pub mod account;
pub mod ledger;
pub mod error;

pub use account::{Account, AccountNumber, Amount};
pub use ledger::{Ledger, InterestApplied, LoadSummary};
pub use error::{LedgerError, LedgerResult};
