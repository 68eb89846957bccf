//! # Raw Balance Input
//!
//! Shape detection for the three accepted input layouts. Nothing here
//! validates accounts or amounts; that happens in [`crate::normalize`].
//! This module only decides which layout a document is and rejects
//! documents that fit none of them.

use serde::Deserialize;
use serde_json::Value;

use mdist_core::DistributorError;

/// A balance as it appears in a map-shaped input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAmount {
    /// A JSON number, kept as its exact source text.
    Number(String),
    /// A string of hex digits. The `0x` prefix is optional.
    Hex(String),
}

impl RawAmount {
    /// The amount as a string the amount parser understands.
    ///
    /// Numbers stay decimal. Map strings are always hex, so `"100"` is 256.
    pub fn into_text(self) -> String {
        match self {
            Self::Number(n) => n,
            Self::Hex(s) => {
                let digits = s.trim();
                if digits.starts_with("0x") || digits.starts_with("0X") {
                    digits.to_string()
                } else {
                    format!("0x{digits}")
                }
            }
        }
    }
}

impl From<u64> for RawAmount {
    fn from(value: u64) -> Self {
        Self::Number(value.to_string())
    }
}

/// One record of the record-list layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceRecord {
    /// Account string, any case, optional `0x`.
    pub address: String,
    /// Amount string, hex or decimal.
    pub earnings: String,
    /// Free-text reasons, used to derive flags.
    #[serde(default)]
    pub reasons: String,
}

/// Raw balances in one of the accepted layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBalances {
    /// Account string to balance.
    Map(Vec<(String, RawAmount)>),
    /// Records with free-text reasons.
    Records(Vec<BalanceRecord>),
    /// Two-column rows of account and amount.
    Table(Vec<(String, String)>),
}

impl RawBalances {
    /// Number of raw entries, before validation.
    pub fn len(&self) -> usize {
        match self {
            Self::Map(m) => m.len(),
            Self::Records(r) => r.len(),
            Self::Table(t) => t.len(),
        }
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert any layout into the uniform record list.
    pub fn into_records(self) -> Vec<BalanceRecord> {
        match self {
            Self::Records(records) => records,
            Self::Map(entries) => entries
                .into_iter()
                .map(|(address, amount)| BalanceRecord {
                    address,
                    earnings: amount.into_text(),
                    reasons: String::new(),
                })
                .collect(),
            Self::Table(rows) => rows
                .into_iter()
                .map(|(address, amount)| BalanceRecord {
                    address,
                    earnings: amount,
                    reasons: String::new(),
                })
                .collect(),
        }
    }

    /// Detect the layout of a parsed JSON document.
    ///
    /// An object is a map. An array whose first element is itself an array
    /// is a table; any other array is a record list.
    pub fn from_json_value(value: Value) -> Result<Self, DistributorError> {
        match value {
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (account, balance) in map {
                    let amount = match balance {
                        Value::Number(n) => RawAmount::Number(n.to_string()),
                        Value::String(s) => RawAmount::Hex(s),
                        other => {
                            return Err(DistributorError::MalformedInput(format!(
                                "balance for {account} must be a number or string, got {other}"
                            )))
                        }
                    };
                    entries.push((account, amount));
                }
                Ok(Self::Map(entries))
            }
            Value::Array(items) if items.first().is_some_and(Value::is_array) => {
                let mut rows = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    rows.push(table_row_from_json(i, item)?);
                }
                Ok(Self::Table(rows))
            }
            Value::Array(items) => {
                let records: Vec<BalanceRecord> =
                    serde_json::from_value(Value::Array(items)).map_err(|e| {
                        DistributorError::MalformedInput(format!(
                            "expected a list of {{address, earnings, reasons}} records: {e}"
                        ))
                    })?;
                Ok(Self::Records(records))
            }
            other => Err(DistributorError::MalformedInput(format!(
                "expected a JSON object or array of balances, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse and detect a JSON document.
    pub fn from_json_str(input: &str) -> Result<Self, DistributorError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| DistributorError::MalformedInput(format!("invalid JSON: {e}")))?;
        Self::from_json_value(value)
    }

    /// Parse and detect a JSON document from a reader.
    pub fn from_json_reader(reader: impl std::io::Read) -> Result<Self, DistributorError> {
        let value: Value = serde_json::from_reader(reader)
            .map_err(|e| DistributorError::MalformedInput(format!("invalid JSON: {e}")))?;
        Self::from_json_value(value)
    }

    /// Parse two-column CSV text into a table.
    ///
    /// There is no header row. Blank lines and a leading byte-order mark are
    /// skipped, fields may be double-quoted (including embedded newlines),
    /// and every row must have exactly two fields.
    pub fn from_csv_str(input: &str) -> Result<Self, DistributorError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(input.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| DistributorError::MalformedInput(format!("invalid CSV: {e}")))?;
            match (record.len(), record.get(0), record.get(1)) {
                (2, Some(account), Some(amount)) => {
                    rows.push((account.to_string(), amount.to_string()))
                }
                (columns, ..) => {
                    let line = record.position().map_or(0, |p| p.line());
                    return Err(DistributorError::MalformedInput(format!(
                        "CSV line {line}: expected 2 columns (address, balance), got {columns}"
                    )));
                }
            }
        }
        if rows.is_empty() {
            return Err(DistributorError::MalformedInput(
                "CSV input contains no rows".to_string(),
            ));
        }
        Ok(Self::Table(rows))
    }
}

fn table_row_from_json(i: usize, item: Value) -> Result<(String, String), DistributorError> {
    let malformed = |reason: &str| {
        DistributorError::MalformedInput(format!("row {i}: {reason}"))
    };
    let Value::Array(cells) = item else {
        return Err(malformed("expected a two-element array"));
    };
    let [account, amount]: [Value; 2] = cells
        .try_into()
        .map_err(|_| malformed("expected exactly two columns"))?;
    let account = match account {
        Value::String(s) => s,
        _ => return Err(malformed("account must be a string")),
    };
    let amount = match amount {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return Err(malformed("amount must be a string or number")),
    };
    Ok((account, amount))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
