use sea_orm::{ConnectionTrait, Database, Statement};

use engine::{
    AppealCategory, AppealNew, CreditCmd, Engine, EngineError, LedgerAction, LedgerKind,
    TransferBy,
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
        ("donor1", "donor"),
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

#[tokio::test]
async fn credit_then_debit_yields_balance_and_ordered_ledger() {
    let engine = engine_with_db().await;

    let wallet = engine
        .credit_wallet(
            CreditCmd::new("rafia", 200_00, LedgerAction::Donation).donor("donor1"),
        )
        .await
        .unwrap();
    assert_eq!(wallet.balance, 200_00);

    let wallet = engine
        .debit_wallet("rafia", 50_00, None, Some("admin1"))
        .await
        .unwrap();
    assert_eq!(wallet.balance, 150_00);

    let (entries, next_cursor) = engine
        .list_wallet_transactions("rafia", "rafia", 10, None)
        .await
        .unwrap();
    assert!(next_cursor.is_none());
    assert_eq!(entries.len(), 2);

    // Newest first: the debit precedes the credit.
    assert_eq!(entries[0].kind, LedgerKind::Debit);
    assert_eq!(entries[0].amount_minor, 50_00);
    assert_eq!(entries[1].kind, LedgerKind::Credit);
    assert_eq!(entries[1].amount_minor, 200_00);
}

#[tokio::test]
async fn balance_always_equals_ledger_sum() {
    let engine = engine_with_db().await;

    engine
        .credit_wallet(CreditCmd::new("rafia", 500_00, LedgerAction::Donation).donor("donor1"))
        .await
        .unwrap();
    engine
        .debit_wallet("rafia", 120_00, None, Some("admin1"))
        .await
        .unwrap();
    engine
        .adjust_balance("rafia", -40_00, "correction", "admin1")
        .await
        .unwrap();
    engine
        .issue_refund("rafia", 15_00, None, Some("admin1"))
        .await
        .unwrap();
    let wallet = engine
        .manual_credit("rafia", 10_00, "admin1")
        .await
        .unwrap();

    let (entries, _) = engine
        .list_wallet_transactions("rafia", "rafia", 100, None)
        .await
        .unwrap();
    let ledger_sum: i64 = entries.iter().map(|e| e.signed_amount()).sum();

    assert_eq!(wallet.balance, ledger_sum);
    assert_eq!(wallet.balance, 500_00 - 120_00 - 40_00 + 15_00 + 10_00);
}

#[tokio::test]
async fn debit_does_not_check_sufficiency() {
    let engine = engine_with_db().await;

    // The generic debit path intentionally performs no balance check; the
    // resulting negative balance is representable.
    let wallet = engine
        .debit_wallet("zainab", 500_00, None, Some("admin1"))
        .await
        .unwrap();
    assert_eq!(wallet.balance, -500_00);
}

#[tokio::test]
async fn attribution_follows_actor_role() {
    let engine = engine_with_db().await;

    engine
        .credit_wallet(CreditCmd::new("rafia", 10_00, LedgerAction::Donation).actor("donor1"))
        .await
        .unwrap();
    engine.manual_credit("rafia", 10_00, "admin1").await.unwrap();
    engine
        .credit_wallet(CreditCmd::new("rafia", 10_00, LedgerAction::Donation).actor("shura1"))
        .await
        .unwrap();
    // No actor, but a donor reference: attributed to the donor.
    engine
        .credit_wallet(CreditCmd::new("rafia", 10_00, LedgerAction::Donation).donor("donor1"))
        .await
        .unwrap();
    // No actor at all: the system.
    engine
        .credit_wallet(CreditCmd::new("rafia", 10_00, LedgerAction::Donation))
        .await
        .unwrap();

    let (entries, _) = engine
        .list_wallet_transactions("rafia", "rafia", 10, None)
        .await
        .unwrap();
    let attributions: Vec<TransferBy> =
        entries.iter().rev().map(|e| e.transfer_by).collect();
    assert_eq!(
        attributions,
        vec![
            TransferBy::Donor,
            TransferBy::Admin,
            TransferBy::System,
            TransferBy::Donor,
            TransferBy::System,
        ]
    );
}

#[tokio::test]
async fn reject_withdrawal_logs_zero_amount_audit_entry() {
    let engine = engine_with_db().await;

    let appeal = engine
        .create_appeal(
            AppealNew::new("Rent", AppealCategory::HouseRent, 70_000_00, "rafia", "rafia"),
            "rafia",
        )
        .await
        .unwrap();
    engine
        .credit_wallet(CreditCmd::new("rafia", 100_00, LedgerAction::Donation))
        .await
        .unwrap();

    let wallet = engine.reject_withdrawal(appeal.id, "admin1").await.unwrap();
    assert_eq!(wallet.balance, 100_00);

    let (entries, _) = engine
        .list_wallet_transactions("rafia", "rafia", 10, None)
        .await
        .unwrap();
    let audit = &entries[0];
    assert_eq!(audit.kind, LedgerKind::Debit);
    assert_eq!(audit.amount_minor, 0);
    assert_eq!(audit.transfer_by, TransferBy::Admin);
    assert_eq!(audit.appeal_id, Some(appeal.id));
    assert!(audit.description.starts_with("Withdrawal rejected"));
}

#[tokio::test]
async fn adjustment_kind_follows_sign() {
    let engine = engine_with_db().await;

    engine
        .adjust_balance("rafia", 100_00, "opening correction", "admin1")
        .await
        .unwrap();
    let wallet = engine
        .adjust_balance("rafia", -40_00, "overpayment", "admin1")
        .await
        .unwrap();
    assert_eq!(wallet.balance, 60_00);

    let (entries, _) = engine
        .list_wallet_transactions("rafia", "rafia", 10, None)
        .await
        .unwrap();
    assert_eq!(entries[0].kind, LedgerKind::Debit);
    assert_eq!(entries[0].amount_minor, 40_00);
    assert!(entries[0].description.contains("overpayment"));
    assert_eq!(entries[1].kind, LedgerKind::Credit);
    assert_eq!(entries[1].amount_minor, 100_00);
}

#[tokio::test]
async fn refund_is_credited_with_refund_description() {
    let engine = engine_with_db().await;

    let appeal = engine
        .create_appeal(
            AppealNew::new("Fees", AppealCategory::SchoolFee, 20_000_00, "rafia", "rafia"),
            "rafia",
        )
        .await
        .unwrap();

    let wallet = engine
        .issue_refund("rafia", 25_00, Some(appeal.id), Some("admin1"))
        .await
        .unwrap();
    assert_eq!(wallet.balance, 25_00);

    let (entries, _) = engine
        .list_wallet_transactions("rafia", "rafia", 10, None)
        .await
        .unwrap();
    assert_eq!(entries[0].kind, LedgerKind::Credit);
    assert!(entries[0].description.starts_with("Refund issued"));
}

#[tokio::test]
async fn wallet_operations_gate_on_admin_role() {
    let engine = engine_with_db().await;

    let err = engine.manual_credit("rafia", 10_00, "zainab").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .adjust_balance("rafia", 10_00, "nope", "donor1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Recipients cannot read someone else's wallet either.
    let err = engine.wallet("rafia", "zainab").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn ledger_pagination_walks_newest_to_oldest() {
    let engine = engine_with_db().await;

    for i in 1..=5 {
        engine
            .credit_wallet(CreditCmd::new("rafia", i * 10_00, LedgerAction::Donation))
            .await
            .unwrap();
    }

    let (page1, cursor1) = engine
        .list_wallet_transactions("rafia", "rafia", 2, None)
        .await
        .unwrap();
    assert_eq!(page1.len(), 2);
    let cursor1 = cursor1.expect("expected a second page");

    let (page2, cursor2) = engine
        .list_wallet_transactions("rafia", "rafia", 2, Some(&cursor1))
        .await
        .unwrap();
    assert_eq!(page2.len(), 2);
    let cursor2 = cursor2.expect("expected a third page");

    let (page3, cursor3) = engine
        .list_wallet_transactions("rafia", "rafia", 2, Some(&cursor2))
        .await
        .unwrap();
    assert_eq!(page3.len(), 1);
    assert!(cursor3.is_none());

    let amounts: Vec<i64> = page1
        .iter()
        .chain(page2.iter())
        .chain(page3.iter())
        .map(|e| e.amount_minor)
        .collect();
    assert_eq!(amounts, vec![50_00, 40_00, 30_00, 20_00, 10_00]);
}
