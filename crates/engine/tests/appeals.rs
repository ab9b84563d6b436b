use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, Statement};

use engine::{AppealCategory, AppealNew, AppealStatus, Engine, EngineError};
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

fn rent_appeal(beneficiary: &str) -> AppealNew {
    AppealNew::new(
        "Rent support",
        AppealCategory::HouseRent,
        70_000_00,
        beneficiary,
        beneficiary,
    )
}

#[tokio::test]
async fn create_appeal_starts_pending() {
    let engine = engine_with_db().await;

    let appeal = engine.create_appeal(rent_appeal("rafia"), "rafia").await.unwrap();

    assert_eq!(appeal.status, AppealStatus::Pending);
    assert_eq!(appeal.beneficiary, "rafia");
    assert_eq!(appeal.created_by, "rafia");
    assert!(appeal.approved_by.is_none());

    let fetched = engine.appeal(appeal.id, "rafia").await.unwrap();
    assert_eq!(fetched.id, appeal.id);
    assert_eq!(fetched.status, AppealStatus::Pending);
    assert_eq!(fetched.amount_minor, 70_000_00);
}

#[tokio::test]
async fn monthly_months_out_of_range_is_rejected() {
    let engine = engine_with_db().await;

    let err = engine
        .create_appeal(rent_appeal("rafia").monthly(7), "rafia")
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("months_required"));

    let appeal = engine
        .create_appeal(rent_appeal("rafia").monthly(3), "rafia")
        .await
        .unwrap();
    assert_eq!(appeal.months_required, Some(3));
}

#[tokio::test]
async fn duplicate_active_appeal_blocked_until_first_resolves() {
    let engine = engine_with_db().await;

    let first = engine.create_appeal(rent_appeal("rafia"), "rafia").await.unwrap();

    let err = engine
        .create_appeal(rent_appeal("rafia"), "rafia")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // A different category or beneficiary is fine within the same month.
    engine
        .create_appeal(
            AppealNew::new("Medicines", AppealCategory::Medical, 10_000_00, "rafia", "rafia"),
            "rafia",
        )
        .await
        .unwrap();
    engine.create_appeal(rent_appeal("zainab"), "zainab").await.unwrap();

    // Once the first appeal leaves an active status, resubmission succeeds.
    engine
        .reject_appeal(first.id, "shura1", "insufficient documentation")
        .await
        .unwrap();
    engine.create_appeal(rent_appeal("rafia"), "rafia").await.unwrap();
}

#[tokio::test]
async fn reject_requires_a_reason() {
    let engine = engine_with_db().await;
    let appeal = engine.create_appeal(rent_appeal("rafia"), "rafia").await.unwrap();

    let err = engine.reject_appeal(appeal.id, "shura1", "").await.unwrap_err();
    assert_eq!(err.field(), Some("rejection_reason"));
    let err = engine.reject_appeal(appeal.id, "shura1", "   ").await.unwrap_err();
    assert_eq!(err.field(), Some("rejection_reason"));

    let rejected = engine
        .reject_appeal(appeal.id, "shura1", "duplicate request")
        .await
        .unwrap();
    assert_eq!(rejected.status, AppealStatus::Rejected);
    assert_eq!(rejected.rejected_by.as_deref(), Some("shura1"));
    assert!(rejected.rejected_at.is_some());
    assert_eq!(rejected.rejection_reason.as_deref(), Some("duplicate request"));
}

#[tokio::test]
async fn approve_stamps_actor_and_gates_on_role() {
    let engine = engine_with_db().await;
    let appeal = engine.create_appeal(rent_appeal("rafia"), "rafia").await.unwrap();

    let err = engine.approve_appeal(appeal.id, "donor1").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let approved = engine.approve_appeal(appeal.id, "shura1").await.unwrap();
    assert_eq!(approved.status, AppealStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some("shura1"));
    assert!(approved.approved_at.is_some());

    // Approved is not a legal source for approve again.
    let err = engine.approve_appeal(appeal.id, "shura1").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}

#[tokio::test]
async fn cancel_works_from_pending_and_approved_only() {
    let engine = engine_with_db().await;

    let pending = engine.create_appeal(rent_appeal("rafia"), "rafia").await.unwrap();
    let cancelled = engine.cancel_appeal(pending.id, "rafia").await.unwrap();
    assert_eq!(cancelled.status, AppealStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by.as_deref(), Some("rafia"));

    let approved = engine
        .create_appeal(
            AppealNew::new("Fees", AppealCategory::SchoolFee, 20_000_00, "rafia", "rafia"),
            "rafia",
        )
        .await
        .unwrap();
    engine.approve_appeal(approved.id, "shura1").await.unwrap();
    engine.cancel_appeal(approved.id, "shura1").await.unwrap();

    // Cancelled is terminal.
    let err = engine.cancel_appeal(approved.id, "shura1").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    // A donor unrelated to the appeal may not cancel.
    let other = engine.create_appeal(rent_appeal("zainab"), "zainab").await.unwrap();
    let err = engine.cancel_appeal(other.id, "donor1").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn reviewers_may_submit_on_behalf_of_a_beneficiary() {
    let engine = engine_with_db().await;

    let appeal = engine
        .create_appeal(
            AppealNew::new(
                "Utility arrears",
                AppealCategory::UtilityBills,
                15_000_00,
                "rafia",
                "shura1",
            ),
            "shura1",
        )
        .await
        .unwrap();
    assert_eq!(appeal.beneficiary, "rafia");
    assert_eq!(appeal.created_by, "shura1");

    let err = engine
        .create_appeal(
            AppealNew::new("Not yours", AppealCategory::Debt, 5_000_00, "rafia", "donor1"),
            "donor1",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn expiry_sweep_moves_past_due_approved_appeals() {
    let engine = engine_with_db().await;

    let due = engine
        .create_appeal(
            rent_appeal("rafia").expiry(Utc::now() - Duration::days(1)),
            "rafia",
        )
        .await
        .unwrap();
    engine.approve_appeal(due.id, "shura1").await.unwrap();

    let open = engine
        .create_appeal(
            AppealNew::new("Medicines", AppealCategory::Medical, 10_000_00, "rafia", "rafia")
                .expiry(Utc::now() + Duration::days(30)),
            "rafia",
        )
        .await
        .unwrap();
    engine.approve_appeal(open.id, "shura1").await.unwrap();

    let expired = engine.expire_due_appeals(Utc::now()).await.unwrap();
    assert_eq!(expired, vec![due.id]);

    assert_eq!(
        engine.appeal(due.id, "shura1").await.unwrap().status,
        AppealStatus::Expired
    );
    assert_eq!(
        engine.appeal(open.id, "shura1").await.unwrap().status,
        AppealStatus::Approved
    );

    // A second sweep finds nothing new.
    assert!(engine.expire_due_appeals(Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn recipients_only_see_their_own_appeals() {
    let engine = engine_with_db().await;

    let own = engine.create_appeal(rent_appeal("rafia"), "rafia").await.unwrap();
    let other = engine.create_appeal(rent_appeal("zainab"), "zainab").await.unwrap();

    let visible = engine
        .list_appeals(Default::default(), "rafia")
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, own.id);

    let err = engine.appeal(other.id, "rafia").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let all = engine
        .list_appeals(Default::default(), "shura1")
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}
