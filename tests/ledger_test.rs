mod common;

use anyhow::Result;
use common::{add_alice_basics, parse_date, test_service};
use moneybook::application::{AppError, LedgerService};
use moneybook::domain::Cents;
use tempfile::TempDir;

#[tokio::test]
async fn test_add_then_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;

    add_alice_basics(&service).await?;

    let entry = service.get_balance("alice").await?;
    assert_eq!(entry.balance, 7000);
    assert_eq!(entry.transaction_count, 2);

    Ok(())
}

#[tokio::test]
async fn test_balance_equals_sum_of_added_amounts() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let amounts: [Cents; 8] = [1, -1, 250075, -99999, 0, 12, -40000, 3];
    for (i, amount) in amounts.iter().enumerate() {
        service
            .add_transaction("carol", *amount, parse_date("2024-05-01"), format!("#{}", i))
            .await?;
    }

    let entry = service.get_balance("carol").await?;
    assert_eq!(entry.balance, amounts.iter().sum::<Cents>());
    assert_eq!(entry.transaction_count, amounts.len());

    Ok(())
}

#[tokio::test]
async fn test_unknown_user_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert!(matches!(
        service.get_balance("bob").await,
        Err(AppError::UserNotFound(name)) if name == "bob"
    ));
    assert!(matches!(
        service.get_ledger("bob").await,
        Err(AppError::UserNotFound(_))
    ));
    assert!(matches!(
        service.remove_user("bob").await,
        Err(AppError::UserNotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_remove_user_behaves_as_if_never_existed() -> Result<()> {
    let (service, _temp) = test_service().await?;

    add_alice_basics(&service).await?;
    let removed = service.remove_user("alice").await?;
    assert_eq!(removed, 2);

    assert!(matches!(
        service.get_balance("alice").await,
        Err(AppError::UserNotFound(_))
    ));
    assert!(matches!(
        service
            .generate_report("alice", Default::default())
            .await,
        Err(AppError::UserNotFound(_))
    ));
    assert!(service.list_users().await?.is_empty());

    // A fresh ledger starts from zero
    service
        .add_transaction("alice", 500, parse_date("2024-02-01"), "refund")
        .await?;
    assert_eq!(service.get_balance("alice").await?.balance, 500);
    assert_eq!(service.get_ledger("alice").await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_ledgers_are_isolated() -> Result<()> {
    let (service, _temp) = test_service().await?;

    add_alice_basics(&service).await?;
    service
        .add_transaction("bob", -1250, parse_date("2024-01-03"), "coffee")
        .await?;

    assert_eq!(service.get_balance("alice").await?.balance, 7000);
    assert_eq!(service.get_balance("bob").await?.balance, -1250);

    service.remove_user("bob").await?;
    assert_eq!(service.get_balance("alice").await?.balance, 7000);
    assert_eq!(service.list_users().await?, vec!["alice".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_get_ledger_keeps_insertion_order() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Dates deliberately out of order
    for (date, description) in [
        ("2024-03-01", "third"),
        ("2024-01-01", "first"),
        ("2024-02-01", "second"),
    ] {
        service
            .add_transaction("alice", 100, parse_date(date), description)
            .await?;
    }

    let ledger = service.get_ledger("alice").await?;
    let descriptions: Vec<&str> = ledger.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, vec!["third", "first", "second"]);
    assert!(ledger.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert!(ledger.iter().all(|t| t.user == "alice"));

    Ok(())
}

#[tokio::test]
async fn test_state_persists_across_invocations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("persist.db");
    let db_path = db_path.to_str().unwrap();

    {
        let service = LedgerService::open(db_path).await?;
        add_alice_basics(&service).await?;
    }

    let service = LedgerService::open(db_path).await?;
    assert_eq!(service.get_balance("alice").await?.balance, 7000);

    service
        .add_transaction("alice", -7000, parse_date("2024-01-31"), "rent")
        .await?;
    let ledger = service.get_ledger("alice").await?;
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger[2].sequence, 3);
    assert_eq!(service.get_balance("alice").await?.balance, 0);

    Ok(())
}

#[tokio::test]
async fn test_balance_out_of_range_is_reported() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let max = moneybook::domain::parse_cents("92233720368547758.07")?;
    for _ in 0..2 {
        service
            .add_transaction("eve", max, parse_date("2024-01-01"), "max")
            .await?;
    }

    assert!(matches!(
        service.get_balance("eve").await,
        Err(AppError::BalanceOutOfRange(name)) if name == "eve"
    ));
    assert!(matches!(
        service.generate_report("eve", Default::default()).await,
        Err(AppError::BalanceOutOfRange(_))
    ));

    // Bringing the sum back in range makes the ledger readable again
    service
        .add_transaction("eve", -max, parse_date("2024-01-02"), "correction")
        .await?;
    assert_eq!(service.get_balance("eve").await?.balance, max);

    Ok(())
}
