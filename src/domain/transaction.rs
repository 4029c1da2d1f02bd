use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, format_money};

pub type TransactionId = Uuid;

/// Date format used on the command line and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether a transaction brings money in or takes it out.
/// Derived from the sign of the amount, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    /// Zero-amount entries (notes, placeholders)
    Neutral,
}

impl TransactionKind {
    pub fn of(amount_cents: Cents) -> Self {
        match amount_cents {
            a if a > 0 => TransactionKind::Income,
            a if a < 0 => TransactionKind::Expense,
            _ => TransactionKind::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Neutral => "neutral",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in a user's ledger.
/// Transactions are immutable and append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Monotonically increasing sequence number for insertion order
    pub sequence: i64,
    /// Name of the user owning this transaction
    pub user: String,
    /// Signed amount: positive is income, negative is expense
    pub amount_cents: Cents,
    /// Calendar date the transaction happened on
    pub date: NaiveDate,
    pub description: String,
    /// When we recorded this transaction in the system
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction. Sequence number must be assigned by the repository.
    pub fn new(
        user: impl Into<String>,
        amount_cents: Cents,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0, // Will be set by repository
            user: user.into(),
            amount_cents,
            date,
            description: description.into(),
            recorded_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        TransactionKind::of(self.amount_cents)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}: {}",
            self.date.format(DATE_FORMAT),
            self.description,
            format_money(self.amount_cents)
        )
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseDateError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| ParseDateError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDateError {
    InvalidFormat,
}

impl fmt::Display for ParseDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDateError::InvalidFormat => write!(f, "date must be in YYYY-MM-DD format"),
        }
    }
}

impl std::error::Error for ParseDateError {}
