use sea_orm::{ConnectionTrait, Database, Statement};

use engine::{
    AppealCategory, AppealNew, AppealStatus, Engine, EngineError, LedgerKind, TransferBy,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [
        ("admin1", "admin"),
        ("shura1", "shura"),
        ("rafia", "recipient"),
        ("zainab", "recipient"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), role.into()],
        ))
        .await
        .unwrap();
    }
    Engine::builder().database(db).build().await.unwrap()
}

async fn approved_appeal(
    engine: &Engine,
    beneficiary: &str,
    category: AppealCategory,
    amount_minor: i64,
) -> uuid::Uuid {
    let appeal = engine
        .create_appeal(
            AppealNew::new("Support", category, amount_minor, beneficiary, beneficiary),
            beneficiary,
        )
        .await
        .unwrap();
    engine.approve_appeal(appeal.id, "shura1").await.unwrap();
    appeal.id
}

#[tokio::test]
async fn pays_in_creation_order_and_skips_what_it_cannot_cover() {
    let engine = engine_with_db().await;

    engine.fund_system_wallet(1000_00, None, None).await.unwrap();
    let first = approved_appeal(&engine, "rafia", AppealCategory::HouseRent, 700_00).await;
    let second = approved_appeal(&engine, "zainab", AppealCategory::Medical, 500_00).await;

    let report = engine.fulfill_approved_appeals().await.unwrap();
    assert_eq!(report.fulfilled, vec![first]);
    assert_eq!(report.skipped, vec![second]);
    assert_eq!(report.remaining_balance_minor, 300_00);
    assert_eq!(engine.system_wallet_balance().await.unwrap(), 300_00);

    let paid = engine.appeal(first, "shura1").await.unwrap();
    assert_eq!(paid.status, AppealStatus::Fulfilled);
    assert!(paid.fulfilled_at.is_some());

    let waiting = engine.appeal(second, "shura1").await.unwrap();
    assert_eq!(waiting.status, AppealStatus::Approved);
    assert!(waiting.fulfilled_at.is_none());

    // One system-ledger debit, attributed to the system.
    let entries = engine.list_system_transactions(10).await.unwrap();
    let debits: Vec<_> = entries
        .iter()
        .filter(|e| e.kind == LedgerKind::Debit)
        .collect();
    assert_eq!(debits.len(), 1);
    assert_eq!(debits[0].amount_minor, 700_00);
    assert_eq!(debits[0].transfer_by, TransferBy::System);
    assert!(debits[0].description.starts_with("Funds disbursed"));
}

#[tokio::test]
async fn second_pass_never_double_debits() {
    let engine = engine_with_db().await;

    engine.fund_system_wallet(1000_00, None, None).await.unwrap();
    let first = approved_appeal(&engine, "rafia", AppealCategory::HouseRent, 700_00).await;
    let second = approved_appeal(&engine, "zainab", AppealCategory::Medical, 500_00).await;

    engine.fulfill_approved_appeals().await.unwrap();
    let report = engine.fulfill_approved_appeals().await.unwrap();

    assert!(report.fulfilled.is_empty());
    assert_eq!(report.skipped, vec![second]);
    assert_eq!(report.remaining_balance_minor, 300_00);
    assert_eq!(engine.system_wallet_balance().await.unwrap(), 300_00);

    let debit_count = engine
        .list_system_transactions(10)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == LedgerKind::Debit)
        .count();
    assert_eq!(debit_count, 1);

    assert_eq!(
        engine.appeal(first, "shura1").await.unwrap().status,
        AppealStatus::Fulfilled
    );
}

#[tokio::test]
async fn insufficient_balance_leaves_the_appeal_untouched() {
    let engine = engine_with_db().await;

    engine.fund_system_wallet(100_00, None, None).await.unwrap();
    let appeal = approved_appeal(&engine, "rafia", AppealCategory::HouseRent, 700_00).await;

    let report = engine.fulfill_approved_appeals().await.unwrap();
    assert!(report.fulfilled.is_empty());
    assert_eq!(report.skipped, vec![appeal]);
    assert_eq!(report.remaining_balance_minor, 100_00);

    assert_eq!(
        engine.appeal(appeal, "shura1").await.unwrap().status,
        AppealStatus::Approved
    );
    let debit_count = engine
        .list_system_transactions(10)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == LedgerKind::Debit)
        .count();
    assert_eq!(debit_count, 0);
}

#[tokio::test]
async fn fulfillment_becomes_possible_once_funds_arrive() {
    let engine = engine_with_db().await;

    let appeal = approved_appeal(&engine, "rafia", AppealCategory::HouseRent, 700_00).await;

    let report = engine.fulfill_approved_appeals().await.unwrap();
    assert_eq!(report.skipped, vec![appeal]);

    engine.fund_system_wallet(700_00, None, None).await.unwrap();
    let report = engine.fulfill_approved_appeals().await.unwrap();
    assert_eq!(report.fulfilled, vec![appeal]);
    assert_eq!(report.remaining_balance_minor, 0);
}

#[tokio::test]
async fn fulfillment_does_not_credit_the_recipient_wallet() {
    let engine = engine_with_db().await;

    engine.fund_system_wallet(1000_00, None, None).await.unwrap();
    approved_appeal(&engine, "rafia", AppealCategory::HouseRent, 700_00).await;
    engine.fulfill_approved_appeals().await.unwrap();

    // Paying out an appeal only moves the pooled balance; crediting the
    // recipient wallet is a separate explicit operation.
    let wallet = engine.wallet("rafia", "rafia").await.unwrap();
    assert_eq!(wallet.balance, 0);
    let (entries, _) = engine
        .list_wallet_transactions("rafia", "rafia", 10, None)
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn funding_with_an_actor_requires_admin() {
    let engine = engine_with_db().await;

    let err = engine
        .fund_system_wallet(100_00, Some("rafia"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .fund_system_wallet(100_00, Some("admin1"), None)
        .await
        .unwrap();

    let entries = engine.list_system_transactions(10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, LedgerKind::Credit);
    assert_eq!(entries[0].transfer_by, TransferBy::Admin);
    assert!(entries[0].description.starts_with("Manual credit"));
}
