use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{DATE_FORMAT, Transaction};

use super::MIGRATION_001_INITIAL;

const TRANSACTION_COLUMNS: &str =
    "id, sequence, user_name, amount_cents, date, description, recorded_at";

/// Repository for persisting and querying user ledgers.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Open a database, creating and migrating it if needed.
    pub async fn open(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // User operations
    // ========================

    /// Returns true if the user has a ledger.
    pub async fn user_exists(&self, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up user")?;
        Ok(row.is_some())
    }

    /// List the names of all users, sorted.
    pub async fn list_users(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    /// Delete a user and their whole ledger.
    /// Returns the number of transactions removed, or `None` if the user did not exist.
    pub async fn delete_user(&self, name: &str) -> Result<Option<u64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let removed = sqlx::query("DELETE FROM transactions WHERE user_name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .context("Failed to delete user transactions")?
            .rows_affected();

        let users = sqlx::query("DELETE FROM users WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .context("Failed to delete user")?
            .rows_affected();

        tx.commit().await.context("Failed to commit user removal")?;

        Ok((users > 0).then_some(removed))
    }

    // ========================
    // Transaction operations
    // ========================

    /// Append a transaction to its user's ledger, creating the ledger if absent.
    /// Assigns the next sequence number.
    pub async fn save_transaction(&self, transaction: &mut Transaction) -> Result<()> {
        self.save_transactions(std::slice::from_mut(transaction)).await
    }

    /// Append a batch of transactions in order, all or nothing.
    /// Sequence numbers are only assigned once the batch has committed.
    pub async fn save_transactions(&self, transactions: &mut [Transaction]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let mut sequences = Vec::with_capacity(transactions.len());
        for transaction in transactions.iter() {
            sqlx::query("INSERT OR IGNORE INTO users (name, created_at) VALUES (?, ?)")
                .bind(&transaction.user)
                .bind(transaction.recorded_at.to_rfc3339())
                .execute(&mut *tx)
                .await
                .context("Failed to create user")?;

            let row = sqlx::query(
                r#"
                UPDATE sequence_counter
                SET value = value + 1
                WHERE name = 'transaction_sequence'
                RETURNING value
                "#,
            )
            .fetch_one(&mut *tx)
            .await
            .context("Failed to get next sequence number")?;
            let sequence: i64 = row.get("value");

            sqlx::query(
                r#"
                INSERT INTO transactions (id, sequence, user_name, amount_cents, date, description, recorded_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(transaction.id.to_string())
            .bind(sequence)
            .bind(&transaction.user)
            .bind(transaction.amount_cents)
            .bind(transaction.date.format(DATE_FORMAT).to_string())
            .bind(&transaction.description)
            .bind(transaction.recorded_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .context("Failed to save transaction")?;

            sequences.push(sequence);
        }

        tx.commit().await.context("Failed to commit transaction")?;

        for (transaction, sequence) in transactions.iter_mut().zip(sequences) {
            transaction.sequence = sequence;
        }
        Ok(())
    }

    /// List a user's transactions in insertion order.
    pub async fn list_transactions_for_user(&self, name: &str) -> Result<Vec<Transaction>> {
        let query = format!(
            "SELECT {} FROM transactions WHERE user_name = ? ORDER BY sequence",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions for user")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List every transaction in insertion order.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let query = format!(
            "SELECT {} FROM transactions ORDER BY sequence",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let date_str: String = row.get("date");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            sequence: row.get("sequence"),
            user: row.get("user_name"),
            amount_cents: row.get("amount_cents"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid transaction date: {}", date_str))?,
            description: row.get("description"),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
