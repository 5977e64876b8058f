use std::collections::HashSet;
use std::io;

use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::backend::{AccountStore, CsvStore};
use crate::core::account::{Account, AccountNumber, Amount};
use crate::core::error::{LedgerError, LedgerResult};

/// Outcome of crediting interest to one account.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InterestApplied {
    #[serde(rename = "accountNumber")]
    pub id: AccountNumber,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest: Amount,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Amount
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub rejected: usize
}

pub struct Ledger {
    name: String,
    accounts: Vec<Account>,
    next_sequence: u64,
    store: Box<dyn AccountStore>,
    /// Set once the store has been read (or found missing). Until then
    /// saving would replace stored accounts the ledger never saw.
    loaded: bool
}

impl Ledger {
    const FIRST_SEQUENCE: u64 = 1001;

    /// Opens the ledger stored in the delimited file called `name`.
    pub fn new(name: &str) -> Ledger {
        Ledger::with_store(name, Box::new(CsvStore::new(name)))
    }

    /// Opens a ledger over an arbitrary store. Load failures are logged and
    /// leave the ledger empty, so it stays usable in memory, but it will not
    /// save until a later load succeeds.
    pub fn with_store(name: &str, store: Box<dyn AccountStore>) -> Ledger {
        let mut ledger = Ledger {
            name: name.to_owned(),
            accounts: Vec::new(),
            next_sequence: Self::FIRST_SEQUENCE,
            store,
            loaded: false
        };

        if let Err(err) = ledger.load_from_file() {
            warn!("ledger {} starts empty: {}", ledger.name, err);
        }
        return ledger;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_account(&mut self, holder_name: &str, initial_balance: Amount) -> LedgerResult<Account> {
        if initial_balance < Decimal::ZERO {
            warn!("refusing to open an account for {} with balance {}", holder_name, initial_balance);
            return Err(LedgerError::InvalidAmount(initial_balance));
        }

        let id = AccountNumber::from_sequence(self.next_sequence);
        self.next_sequence += 1;

        let account = Account::new(id, holder_name, initial_balance);
        info!("created account {} for {}", account.id(), account.holder_name());
        self.accounts.push(account.clone());
        return Ok(account);
    }

    pub fn find_account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter()
            .find(|account| account.id().as_str() == id)
    }

    fn find_account_mut(&mut self, id: &str) -> LedgerResult<&mut Account> {
        self.accounts.iter_mut()
            .find(|account| account.id().as_str() == id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.into()))
    }

    /// Returns the new balance.
    pub fn deposit(&mut self, id: &str, amount: Amount) -> LedgerResult<Amount> {
        let result = self.find_account_mut(id)
            .and_then(|account| account.deposit(amount));
        match &result {
            Ok(balance) => info!("deposited {} into {}, new balance {}", amount, id, balance),
            Err(err) => warn!("deposit into {} failed: {}", id, err)
        }
        return result;
    }

    /// Returns the new balance.
    pub fn withdraw(&mut self, id: &str, amount: Amount) -> LedgerResult<Amount> {
        let result = self.find_account_mut(id)
            .and_then(|account| account.withdraw(amount));
        match &result {
            Ok(balance) => info!("withdrew {} from {}, new balance {}", amount, id, balance),
            Err(err) => warn!("withdrawal from {} failed: {}", id, err)
        }
        return result;
    }

    /// Returns the renamed account.
    pub fn rename_account(&mut self, id: &str, holder_name: &str) -> LedgerResult<Account> {
        let account = self.find_account_mut(id)?;
        account.rename(holder_name);
        info!("renamed account {} to {}", id, account.holder_name());
        return Ok(account.clone());
    }

    pub fn check_balance(&self, id: &str) -> LedgerResult<Amount> {
        self.find_account(id)
            .map(Account::balance)
            .ok_or_else(|| LedgerError::AccountNotFound(id.into()))
    }

    /// Credits `rate` percent to every account, in insertion order.
    /// Either every account is credited or none is.
    pub fn apply_interest_to_all(&mut self, rate: Amount) -> LedgerResult<Vec<InterestApplied>> {
        if rate < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(rate));
        }

        let mut staged = self.accounts.clone();
        let mut applied = Vec::with_capacity(staged.len());
        for account in staged.iter_mut() {
            let interest = account.apply_interest(rate)?;
            debug!("{}: interest earned {}, new balance {}", account.id(), interest, account.balance());
            applied.push(InterestApplied { id: account.id().clone(), interest, balance: account.balance() });
        }

        self.accounts = staged;
        info!("applied {}% interest to {} accounts", rate, applied.len());
        return Ok(applied);
    }

    pub fn list_accounts(&self) -> Vec<Account> {
        self.accounts.clone()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Refuses to write until the store has been loaded successfully.
    pub fn save_to_file(&self) -> LedgerResult<()> {
        if !self.loaded {
            let location = self.store.location().display().to_string();
            warn!("not saving ledger {}: {} was never loaded", self.name, location);
            return Err(LedgerError::storage(location, io::Error::new(
                io::ErrorKind::Other, "stored accounts were never loaded, refusing to overwrite them")));
        }
        match self.store.save(&self.accounts) {
            Ok(()) => {
                info!("saved {} accounts to {}", self.accounts.len(), self.store.location().display());
                Ok(())
            },
            Err(err) => {
                warn!("failed to save ledger {}: {}", self.name, err);
                Err(err)
            }
        }
    }

    /// Replaces the in-memory accounts with the stored ones.
    /// A missing store is not an error and leaves the ledger as it is.
    pub fn load_from_file(&mut self) -> LedgerResult<LoadSummary> {
        let location = self.store.location().display().to_string();
        let stored = match self.store.read()? {
            Some(stored) => stored,
            None => {
                info!("no account file at {}, starting with an empty ledger", location);
                self.loaded = true;
                return Ok(LoadSummary::default());
            }
        };

        for record in &stored.rejected {
            warn!("skipping record {} of {}: {}", record.line, location, record.error);
        }

        let mut summary = LoadSummary { loaded: 0, rejected: stored.rejected.len() };
        let mut seen = HashSet::new();
        let mut accounts = Vec::with_capacity(stored.accounts.len());
        for account in stored.accounts {
            if !seen.insert(account.id().clone()) {
                warn!("skipping duplicate account {} in {}", account.id(), location);
                summary.rejected += 1;
                continue;
            }
            if let Some(suffix) = account.id().sequence() {
                self.next_sequence = self.next_sequence.max(suffix.saturating_add(1));
            }
            accounts.push(account);
        }

        summary.loaded = accounts.len();
        self.accounts = accounts;
        self.loaded = true;
        info!("loaded {} accounts from {}", summary.loaded, location);
        return Ok(summary);
    }
}
