use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionKind};

/// Compute the balance of a ledger.
/// Balance = sum of all signed amounts; an empty ledger has balance 0.
/// Returns `None` if the sum does not fit in `Cents`.
pub fn compute_balance(transactions: &[Transaction]) -> Option<Cents> {
    transactions
        .iter()
        .try_fold(0 as Cents, |balance, t| balance.checked_add(t.amount_cents))
}

/// Income and expense totals of a ledger.
/// Both totals are non-negative; `balance` is their difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub income: Cents,
    pub expense: Cents,
    pub balance: Cents,
}

/// Returns `None` if any of the totals does not fit in `Cents`.
pub fn compute_totals(transactions: &[Transaction]) -> Option<LedgerTotals> {
    transactions
        .iter()
        .try_fold(LedgerTotals::default(), |mut totals, t| {
            match t.kind() {
                TransactionKind::Income => {
                    totals.income = totals.income.checked_add(t.amount_cents)?
                }
                TransactionKind::Expense => {
                    totals.expense = totals.expense.checked_sub(t.amount_cents)?
                }
                TransactionKind::Neutral => {}
            }
            totals.balance = totals.balance.checked_add(t.amount_cents)?;
            Some(totals)
        })
}

/// Order in which a report lists transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOrder {
    /// Order in which the transactions were added
    #[default]
    Inserted,
    /// By calendar date; same-day entries keep insertion order
    Date,
}

/// Sort a ledger in place. Expects the slice to be in insertion order.
pub fn sort_transactions(transactions: &mut [Transaction], order: ReportOrder) {
    match order {
        ReportOrder::Inserted => transactions.sort_by_key(|t| t.sequence),
        ReportOrder::Date => transactions.sort_by_key(|t| (t.date, t.sequence)),
    }
}
