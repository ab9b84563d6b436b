use sea_orm::{ConnectionTrait, Database, Statement};

use engine::{
    AppealCategory, AppealNew, DonationNew, DonationType, Engine, EngineError, PaymentMethod,
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
        ("donor1", "donor"),
        ("donor2", "donor"),
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
async fn only_donors_may_create_donations() {
    let engine = engine_with_db().await;

    let err = engine
        .record_donation(DonationNew::new("rafia", 100_00), "rafia")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .record_donation(DonationNew::new("donor2", 100_00), "donor1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let donation = engine
        .record_donation(
            DonationNew::new("donor1", 100_00)
                .payment_method(PaymentMethod::Jazzcash)
                .transaction_ref("JC-1881"),
            "donor1",
        )
        .await
        .unwrap();
    assert_eq!(donation.donation_type, DonationType::MawalatAlQurba);
    assert_eq!(donation.payment_method, Some(PaymentMethod::Jazzcash));
}

#[tokio::test]
async fn targeted_appeal_must_be_approved_at_submission() {
    let engine = engine_with_db().await;

    let appeal = engine
        .create_appeal(
            AppealNew::new("Rent", AppealCategory::HouseRent, 700_00, "rafia", "rafia"),
            "rafia",
        )
        .await
        .unwrap();

    let err = engine
        .record_donation(DonationNew::new("donor1", 100_00).appeal(appeal.id), "donor1")
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("appeal"));

    engine.approve_appeal(appeal.id, "shura1").await.unwrap();

    let donation = engine
        .record_donation(DonationNew::new("donor1", 100_00).appeal(appeal.id), "donor1")
        .await
        .unwrap();
    assert_eq!(donation.appeal_id, Some(appeal.id));
    assert_eq!(donation.donation_type, DonationType::AppealSpecific);
}

#[tokio::test]
async fn donations_never_touch_wallets() {
    let engine = engine_with_db().await;

    engine
        .record_donation(DonationNew::new("donor1", 500_00), "donor1")
        .await
        .unwrap();

    assert_eq!(engine.system_wallet_balance().await.unwrap(), 0);
    let wallet = engine.wallet("rafia", "rafia").await.unwrap();
    assert_eq!(wallet.balance, 0);
}

#[tokio::test]
async fn donors_see_only_their_own_donations() {
    let engine = engine_with_db().await;

    engine
        .record_donation(DonationNew::new("donor1", 100_00), "donor1")
        .await
        .unwrap();
    engine
        .record_donation(DonationNew::new("donor1", 200_00), "donor1")
        .await
        .unwrap();
    let foreign = engine
        .record_donation(DonationNew::new("donor2", 300_00), "donor2")
        .await
        .unwrap();

    assert_eq!(
        engine.list_donations(None, "donor1").await.unwrap().len(),
        2
    );
    assert_eq!(
        engine.list_donations(None, "donor2").await.unwrap().len(),
        1
    );
    assert_eq!(
        engine.list_donations(None, "admin1").await.unwrap().len(),
        3
    );

    let err = engine.list_donations(None, "rafia").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine.donation(foreign.id, "donor1").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(
        engine.donation(foreign.id, "admin1").await.unwrap().id,
        foreign.id
    );
}
