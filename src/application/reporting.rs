use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppError;
use crate::domain::{
    Cents, ReportOrder, Transaction, compute_totals, format_money, sort_transactions,
};

/// Full listing of one user's ledger with its totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReport {
    pub user: String,
    pub generated_at: DateTime<Utc>,
    pub order: ReportOrder,
    pub transactions: Vec<Transaction>,
    pub total_income: Cents,
    pub total_expense: Cents,
    pub balance: Cents,
}

impl UserReport {
    /// Build a report from a ledger in insertion order.
    pub fn build(
        user: impl Into<String>,
        mut transactions: Vec<Transaction>,
        order: ReportOrder,
    ) -> Result<Self, AppError> {
        let user = user.into();
        sort_transactions(&mut transactions, order);
        let totals = compute_totals(&transactions)
            .ok_or_else(|| AppError::BalanceOutOfRange(user.clone()))?;

        Ok(Self {
            user,
            generated_at: Utc::now(),
            order,
            transactions,
            total_income: totals.income,
            total_expense: totals.expense,
            balance: totals.balance,
        })
    }
}

impl fmt::Display for UserReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report for {}:", self.user)?;
        writeln!(f, "Transactions:")?;
        for transaction in &self.transactions {
            writeln!(f, "{}", transaction)?;
        }
        writeln!(f, "Total Income: {}", format_money(self.total_income))?;
        writeln!(f, "Total Expenses: {}", format_money(self.total_expense))?;
        write!(f, "Current Balance: {}", format_money(self.balance))
    }
}

/// Balance of one user's ledger.
#[derive(Debug, Clone)]
pub struct BalanceEntry {
    pub user: String,
    pub balance: Cents,
    pub transaction_count: usize,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn make_transaction(
        sequence: i64,
        amount: Cents,
        date: &str,
        description: &str,
    ) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let mut tx = Transaction::new("John Doe", amount, date, description);
        tx.sequence = sequence;
        tx
    }

    #[test]
    fn test_report_text_layout() {
        let report = UserReport::build(
            "John Doe",
            vec![
                make_transaction(1, 100000, "2024-08-01", "Salary"),
                make_transaction(2, -20000, "2024-08-05", "Utilities"),
            ],
            ReportOrder::Inserted,
        )
        .unwrap();

        let expected = "Report for John Doe:\n\
                        Transactions:\n\
                        2024-08-01 - Salary: $1000.00\n\
                        2024-08-05 - Utilities: -$200.00\n\
                        Total Income: $1000.00\n\
                        Total Expenses: $200.00\n\
                        Current Balance: $800.00";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_empty_report() {
        let report = UserReport::build("nobody", Vec::new(), ReportOrder::Inserted).unwrap();

        assert_eq!(report.balance, 0);
        assert!(report.to_string().ends_with("Current Balance: $0.00"));
    }

    #[test]
    fn test_report_out_of_range() {
        let result = UserReport::build(
            "eve",
            vec![
                make_transaction(1, Cents::MAX, "2024-01-01", "windfall"),
                make_transaction(2, 1, "2024-01-02", "one more cent"),
            ],
            ReportOrder::Inserted,
        );

        assert!(matches!(result, Err(AppError::BalanceOutOfRange(name)) if name == "eve"));
    }

    #[test]
    fn test_report_by_date() {
        let report = UserReport::build(
            "John Doe",
            vec![
                make_transaction(1, 500, "2024-03-10", "late"),
                make_transaction(2, 700, "2024-03-01", "early"),
            ],
            ReportOrder::Date,
        )
        .unwrap();

        let descriptions: Vec<&str> = report
            .transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["early", "late"]);
        assert_eq!(report.balance, 1200);
    }
}
