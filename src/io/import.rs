use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

use crate::application::LedgerService;
use crate::domain::{Cents, Transaction, parse_cents, parse_date};
use crate::io::export::LedgerSnapshot;

/// Result of an import operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub users: usize,
    pub transactions: usize,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Whether a profile entry adds to or takes from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProfileEntryType {
    Income,
    Expense,
}

/// One entry of a `profiles.json` document.
/// `amount` is unsigned there; the sign lives in `type`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEntry {
    pub amount: f64,
    pub date: String,
    pub description: String,
    #[serde(rename = "type")]
    pub entry_type: ProfileEntryType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub transactions: Vec<ProfileEntry>,
}

impl ProfileEntry {
    /// Signed amount in cents.
    pub fn amount_cents(&self) -> Result<Cents> {
        if !self.amount.is_finite() {
            anyhow::bail!("amount {} is not a number", self.amount);
        }
        let cents = parse_cents(&format!("{:.2}", self.amount))
            .with_context(|| format!("amount {} is out of range", self.amount))?;
        Ok(match self.entry_type {
            ProfileEntryType::Income => cents,
            ProfileEntryType::Expense => -cents,
        })
    }
}

/// Importer for loading snapshots into the ledger.
///
/// Every import validates the whole document first and then writes it as a
/// single batch, so a failure never leaves a partially imported ledger.
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import a JSON snapshot, appending every transaction to its user's ledger
    /// in the order it appears in the snapshot.
    pub async fn import_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: LedgerSnapshot =
            serde_json::from_reader(reader).context("Invalid ledger snapshot")?;

        let mut transactions = Vec::new();
        for user in &snapshot.users {
            for entry in &user.transactions {
                transactions.push(Transaction::new(
                    &user.name,
                    entry.amount_cents,
                    entry.date,
                    entry.description.clone(),
                ));
            }
        }

        self.commit(snapshot.users.len(), transactions, options).await
    }

    /// Import a `profiles.json` document: an object mapping each user name to
    /// `{ "transactions": [{ "amount", "date", "description", "type" }] }`.
    /// Users and their transactions are appended in file order.
    pub async fn import_profiles<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let document: serde_json::Map<String, serde_json::Value> =
            serde_json::from_reader(reader).context("Invalid profiles document")?;

        let mut transactions = Vec::new();
        for (name, value) in &document {
            let profile = Profile::deserialize(value)
                .with_context(|| format!("Invalid profile for {}", name))?;

            for (index, entry) in profile.transactions.iter().enumerate() {
                let amount_cents = entry
                    .amount_cents()
                    .with_context(|| format!("{} transaction #{}", name, index + 1))?;
                let date = parse_date(&entry.date).with_context(|| {
                    format!("{} transaction #{}: '{}'", name, index + 1, entry.date)
                })?;
                transactions.push(Transaction::new(
                    name,
                    amount_cents,
                    date,
                    entry.description.clone(),
                ));
            }
        }

        self.commit(document.len(), transactions, options).await
    }

    async fn commit(
        &self,
        users: usize,
        transactions: Vec<Transaction>,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let result = ImportResult {
            users,
            transactions: transactions.len(),
        };

        if options.dry_run {
            debug!(users, transactions = result.transactions, "dry run, nothing written");
            return Ok(result);
        }

        self.service
            .add_transactions(transactions)
            .await
            .context("Failed to import transactions")?;
        Ok(result)
    }
}
