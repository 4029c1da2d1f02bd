use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Cents, DATE_FORMAT, format_cents};

/// Snapshot of every user ledger, used for JSON export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub users: Vec<UserSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub name: String,
    /// In insertion order
    pub transactions: Vec<TransactionSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub amount_cents: Cents,
    pub date: NaiveDate,
    pub description: String,
}

/// Exporter for writing ledger data to JSON or CSV
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Collect every ledger into a snapshot
    pub async fn snapshot(&self) -> Result<LedgerSnapshot> {
        let names = self.service.list_users().await?;
        let transactions = self.service.list_all_transactions().await?;

        let users = names
            .into_iter()
            .map(|name| {
                let transactions = transactions
                    .iter()
                    .filter(|t| t.user == name)
                    .map(|t| TransactionSnapshot {
                        amount_cents: t.amount_cents,
                        date: t.date,
                        description: t.description.clone(),
                    })
                    .collect();
                UserSnapshot { name, transactions }
            })
            .collect();

        Ok(LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            users,
        })
    }

    /// Export every ledger as a pretty-printed JSON snapshot
    pub async fn export_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = self.snapshot().await?;

        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        writer.flush()?;

        Ok(snapshot)
    }

    /// Export one user's ledger to CSV format
    pub async fn export_user_csv<W: Write>(&self, name: &str, writer: W) -> Result<usize> {
        let transactions = self.service.get_ledger(name).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["sequence", "date", "amount", "description"])?;

        for transaction in &transactions {
            csv_writer.write_record([
                transaction.sequence.to_string(),
                transaction.date.format(DATE_FORMAT).to_string(),
                format_cents(transaction.amount_cents),
                transaction.description.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }
}
