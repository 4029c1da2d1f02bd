use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{Cents, ReportOrder, Transaction, compute_balance};
use crate::storage::Repository;

use super::{AppError, BalanceEntry, UserReport};

/// Application service providing high-level operations on user ledgers.
/// This is the primary interface for any client (CLI, import/export, tests).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the ledger file at the given path, creating it on first use.
    pub async fn open(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        debug!(database = %database_path, "opening ledger");
        let repo = Repository::open(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Ledger store
    // ========================

    /// Append a transaction to a user's ledger, creating the ledger if absent.
    pub async fn add_transaction(
        &self,
        name: &str,
        amount_cents: Cents,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<Transaction, AppError> {
        let mut transaction = Transaction::new(name, amount_cents, date, description);
        self.repo.save_transaction(&mut transaction).await?;

        info!(
            user = %name,
            sequence = transaction.sequence,
            amount_cents,
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// Append many transactions in the given order as one unit.
    /// If any insert fails nothing is recorded.
    pub async fn add_transactions(
        &self,
        mut transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, AppError> {
        self.repo.save_transactions(&mut transactions).await?;

        info!(count = transactions.len(), "recorded transaction batch");
        Ok(transactions)
    }

    /// Delete a user's whole ledger.
    /// Returns the number of transactions that were removed.
    pub async fn remove_user(&self, name: &str) -> Result<u64, AppError> {
        let removed = self
            .repo
            .delete_user(name)
            .await?
            .ok_or_else(|| AppError::UserNotFound(name.to_string()))?;

        info!(user = %name, removed, "removed user");
        Ok(removed)
    }

    /// Get a user's transactions in insertion order.
    pub async fn get_ledger(&self, name: &str) -> Result<Vec<Transaction>, AppError> {
        if !self.repo.user_exists(name).await? {
            return Err(AppError::UserNotFound(name.to_string()));
        }
        Ok(self.repo.list_transactions_for_user(name).await?)
    }

    /// List the names of all users with a ledger.
    pub async fn list_users(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.list_users().await?)
    }

    /// List every transaction across all users in insertion order.
    pub async fn list_all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    // ========================
    // Reports
    // ========================

    /// Get the balance of a user's ledger.
    pub async fn get_balance(&self, name: &str) -> Result<BalanceEntry, AppError> {
        let transactions = self.get_ledger(name).await?;
        let balance = compute_balance(&transactions)
            .ok_or_else(|| AppError::BalanceOutOfRange(name.to_string()))?;
        debug!(user = %name, balance, "computed balance");

        Ok(BalanceEntry {
            user: name.to_string(),
            balance,
            transaction_count: transactions.len(),
        })
    }

    /// Build the full report for a user.
    pub async fn generate_report(
        &self,
        name: &str,
        order: ReportOrder,
    ) -> Result<UserReport, AppError> {
        let transactions = self.get_ledger(name).await?;
        UserReport::build(name, transactions, order)
    }
}
