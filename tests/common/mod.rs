// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use moneybook::application::LedgerService;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::open(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Record alice's salary and groceries
pub async fn add_alice_basics(service: &LedgerService) -> Result<()> {
    service
        .add_transaction("alice", 10000, parse_date("2024-01-01"), "salary")
        .await?;
    service
        .add_transaction("alice", -3000, parse_date("2024-01-02"), "groceries")
        .await?;
    Ok(())
}
