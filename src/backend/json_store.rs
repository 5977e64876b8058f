use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::backend::interface::{AccountStore, RejectedRecord, Result, StoredAccounts};
use crate::core::{Account, LedgerError};

/// Structured snapshot store: a JSON array of accounts.
/// Holder names need no escaping here, unlike in the delimited format.
pub struct JsonStore {
    path: PathBuf
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> JsonStore {
        JsonStore { path: path.as_ref().to_owned() }
    }

    fn storage_error(&self, err: impl Into<io::Error>) -> LedgerError {
        LedgerError::storage(self.path.display().to_string(), err)
    }
}

impl AccountStore for JsonStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<StoredAccounts>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.storage_error(err))
        };

        let entries: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| self.storage_error(err))?;

        let mut stored = StoredAccounts::default();
        for (index, entry) in entries.into_iter().enumerate() {
            let parsed = serde_json::from_value::<Account>(entry)
                .map_err(|err| LedgerError::MalformedRecord(err.to_string()))
                .and_then(Account::validated);
            match parsed {
                Ok(account) => stored.accounts.push(account),
                // entries are numbered from 1, like lines
                Err(error) => stored.rejected.push(RejectedRecord { line: index as u64 + 1, error })
            }
        }
        return Ok(Some(stored));
    }

    fn save(&self, accounts: &[Account]) -> Result<()> {
        let file = File::create(&self.path).map_err(|err| self.storage_error(err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, accounts)
            .map_err(|err| self.storage_error(err))?;
        writer.flush().map_err(|err| self.storage_error(err))
    }
}


#[cfg(test)]
mod tests {
    use std::fs;

    use crate::backend::{AccountStore, JsonStore};
    use crate::core::{Account, AccountNumber, LedgerError};

    use rstest::{fixture, rstest};
    use rust_decimal::dec;
    use serde_json::json;
    use tempfile::TempDir;

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[fixture]
    fn accounts() -> Vec<Account> {
        vec![
            Account::new(AccountNumber::from_sequence(1001), "Baggins, Bilbo", dec!(32.0)),
            Account::new(AccountNumber::from_sequence(1002), "Frodo", dec!(12.5))
        ]
    }

    #[fixture]
    fn accounts_json() -> serde_json::Value {
        json!([
            {"accountNumber": "ACC1001", "name": "Baggins, Bilbo", "balance": 32.0},
            {"accountNumber": "ACC1002", "name": "Frodo", "balance": 12.5}
        ])
    }

    #[rstest]
    fn accounts_serialize(dir: TempDir, accounts: Vec<Account>, accounts_json: serde_json::Value) {
        let path = dir.path().join("bank.json");
        JsonStore::new(&path).save(&accounts).unwrap();

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, accounts_json);
    }

    #[rstest]
    fn accounts_deserialize(dir: TempDir, accounts: Vec<Account>, accounts_json: serde_json::Value) {
        let path = dir.path().join("bank.json");
        fs::write(&path, accounts_json.to_string()).unwrap();

        let stored = JsonStore::new(&path).read().unwrap().unwrap();
        assert_eq!(stored.accounts, accounts);
        assert!(stored.rejected.is_empty());
    }

    #[rstest]
    fn skips_bad_entries(dir: TempDir) {
        let path = dir.path().join("bank.json");
        fs::write(&path, json!([
            {"accountNumber": "ACC1001", "name": "Gimli", "balance": 10.0},
            {"accountNumber": "ACC1002", "name": "Legolas"},
            {"accountNumber": "ACC1003", "name": "Sauron", "balance": -1.0},
            {"accountNumber": "ACC1004", "name": "Sam", "balance": 4.0}
        ]).to_string()).unwrap();

        let stored = JsonStore::new(&path).read().unwrap().unwrap();
        let names: Vec<_> = stored.accounts.iter().map(|a| a.holder_name()).collect();
        assert_eq!(names, vec!["Gimli", "Sam"]);
        assert_eq!(stored.rejected.iter().map(|r| r.line).collect::<Vec<_>>(), vec![2, 3]);
        assert!(stored.rejected.iter().all(|r| matches!(r.error, LedgerError::MalformedRecord(..))));
    }

    #[rstest]
    fn unreadable_document(dir: TempDir) {
        let path = dir.path().join("bank.json");
        fs::write(&path, "not json").unwrap();
        let res = JsonStore::new(&path).read();
        assert!(matches!(res, Err(LedgerError::StorageUnavailable { .. })));
    }

    #[rstest]
    fn missing_file_reads_as_none(dir: TempDir) {
        assert!(JsonStore::new(dir.path().join("bank.json")).read().unwrap().is_none());
    }
}
