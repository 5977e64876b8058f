use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use csv::{Terminator, WriterBuilder};

use crate::backend::interface::{AccountStore, RejectedRecord, Result, StoredAccounts};
use crate::core::{Account, LedgerError};
use crate::core::account::RECORD_HEADER;

/// Flat delimited-text store, one account per line under a fixed header.
pub struct CsvStore {
    path: PathBuf
}

impl CsvStore {
    pub fn new(path: impl AsRef<Path>) -> CsvStore {
        CsvStore { path: path.as_ref().to_owned() }
    }

    fn storage_error(&self, err: impl Into<io::Error>) -> LedgerError {
        LedgerError::storage(self.path.display().to_string(), err)
    }
}

impl AccountStore for CsvStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<StoredAccounts>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.storage_error(err))
        };
        read_accounts(file)
            .map(Some)
            .map_err(|err| self.storage_error(err))
    }

    fn save(&self, accounts: &[Account]) -> Result<()> {
        let file = File::create(&self.path).map_err(|err| self.storage_error(err))?;
        write_accounts(file, accounts).map_err(|err| self.storage_error(err))
    }
}

/// Every physical line is parsed on its own, so a broken line
/// (an unclosed quote, a bad balance) cannot swallow the lines after it.
/// The first line is the header and is skipped whatever it holds.
fn read_accounts(source: impl io::Read) -> io::Result<StoredAccounts> {
    let mut stored = StoredAccounts::default();
    for (index, line) in BufReader::new(source).split(b'\n').enumerate().skip(1) {
        let line_number = index as u64 + 1;
        let bytes = line?;
        let parsed = String::from_utf8(bytes)
            .map_err(|err| LedgerError::MalformedRecord(err.to_string()))
            .and_then(|text| {
                let text = text.trim_end_matches('\r');
                if text.trim().is_empty() {
                    return Ok(None);
                }
                text.parse::<Account>().map(Some)
            });

        match parsed {
            Ok(Some(account)) => stored.accounts.push(account),
            Ok(None) => continue,
            Err(error) => stored.rejected.push(RejectedRecord { line: line_number, error })
        }
    }
    return Ok(stored);
}

fn write_accounts(sink: impl io::Write, accounts: &[Account]) -> io::Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink);

    writer.write_record(&RECORD_HEADER)?;
    for account in accounts {
        writer.write_record(&account.to_record())?;
    }
    writer.flush()
}
