use std::fmt;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Serialize, Deserialize};

use crate::core::error::{LedgerError, LedgerResult};

pub type Amount = Decimal;

/// Header of the persisted account table. Always written, never validated.
pub const RECORD_HEADER: [&str; 3] = ["AccountNumber", "Name", "Balance"];

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    const PREFIX: &'static str = "ACC";

    pub fn from_sequence(sequence: u64) -> AccountNumber {
        AccountNumber(format!("{}{:04}", Self::PREFIX, sequence))
    }

    /// Numeric suffix of an `ACC<digits>` number, `None` for any other shape.
    pub fn sequence(&self) -> Option<u64> {
        let digits = self.0.strip_prefix(Self::PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountNumber {
    fn from(number: &str) -> Self {
        AccountNumber(number.to_owned())
    }
}

impl From<String> for AccountNumber {
    fn from(number: String) -> Self {
        AccountNumber(number)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Debug for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountNumber {}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "accountNumber")]
    id: AccountNumber,
    #[serde(rename = "name")]
    holder_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    balance: Amount
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.id, self.holder_name, format_amount(self.balance))
    }
}

impl Account {
    const RECORD_FIELDS: usize = RECORD_HEADER.len();

    pub(crate) fn new(id: AccountNumber, holder_name: &str, balance: Amount) -> Account {
        Account { id, holder_name: single_line(holder_name), balance }
    }

    pub fn id(&self) -> &AccountNumber {
        &self.id
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn rename(&mut self, holder_name: &str) {
        self.holder_name = single_line(holder_name);
    }

    /// Adds `amount` to the balance and returns the new balance.
    pub fn deposit(&mut self, amount: Amount) -> LedgerResult<Amount> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.balance = self.balance.checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(amount))?;
        return Ok(self.balance);
    }

    /// Takes `amount` off the balance and returns the new balance.
    /// Withdrawing the whole balance is allowed.
    pub fn withdraw(&mut self, amount: Amount) -> LedgerResult<Amount> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientBalance { requested: amount, available: self.balance });
        }
        self.balance -= amount;
        return Ok(self.balance);
    }

    /// Interest earned at `rate` percent, without touching the balance.
    pub fn calculate_interest(&self, rate: Amount) -> LedgerResult<Amount> {
        if rate < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(rate));
        }
        self.balance.checked_mul(rate)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(LedgerError::InvalidAmount(rate))
    }

    /// Credits the interest earned at `rate` percent and returns it.
    pub fn apply_interest(&mut self, rate: Amount) -> LedgerResult<Amount> {
        let interest = self.calculate_interest(rate)?;
        self.balance = self.balance.checked_add(interest)
            .ok_or(LedgerError::InvalidAmount(rate))?;
        return Ok(interest);
    }

    pub fn to_record(&self) -> StringRecord {
        let balance = format_amount(self.balance);
        StringRecord::from(vec![self.id.as_str(), self.holder_name.as_str(), balance.as_str()])
    }

    pub fn from_record(record: &StringRecord) -> LedgerResult<Account> {
        if record.len() != Self::RECORD_FIELDS {
            return Err(LedgerError::MalformedRecord(
                format!("expected {} fields, found {}", Self::RECORD_FIELDS, record.len())));
        }

        let balance_field = record[2].trim();
        let balance = parse_amount(balance_field)
            .ok_or_else(|| LedgerError::MalformedRecord(format!("invalid balance {:?}", balance_field)))?;

        Account::new(record[0].trim().into(), record[1].trim(), balance).validated()
    }

    /// Checks the invariants a freshly constructed account guarantees,
    /// for accounts restored from storage.
    pub(crate) fn validated(mut self) -> LedgerResult<Account> {
        self.holder_name = single_line(&self.holder_name);
        if self.id.as_str().is_empty() {
            return Err(LedgerError::MalformedRecord("empty account number".to_owned()));
        }
        if self.balance < Decimal::ZERO {
            return Err(LedgerError::MalformedRecord(
                format!("negative balance {} for {}", self.balance, self.id)));
        }
        return Ok(self);
    }
}

/// Parses a single delimited line, e.g. `ACC1001,Alice,500.0`.
impl FromStr for Account {
    type Err = LedgerError;

    fn from_str(line: &str) -> LedgerResult<Account> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(line.as_bytes());

        let mut record = StringRecord::new();
        match reader.read_record(&mut record) {
            Ok(true) => Account::from_record(&record),
            Ok(false) => Err(LedgerError::MalformedRecord("empty record".to_owned())),
            Err(err) => Err(LedgerError::MalformedRecord(err.to_string()))
        }
    }
}

/// Records are one line each, so line breaks in names become spaces.
fn single_line(name: &str) -> String {
    name.replace(['\r', '\n'], " ")
}

/// Plain decimal notation with at least one fractional digit.
pub fn format_amount(amount: Amount) -> String {
    let normal = amount.normalize();
    if normal.scale() == 0 {
        format!("{}.0", normal)
    } else {
        normal.to_string()
    }
}

pub fn parse_amount(text: &str) -> Option<Amount> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
