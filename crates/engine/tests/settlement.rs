use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Credentials, Engine, EngineError, EventStatus, IdentityResolver, NewPayment, SettlementStore,
    TransferStatus, calculate_split,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob", "carol"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Event owned by alice with bob and carol as members.
async fn trip(engine: &Engine) -> String {
    let event = engine.new_event("Trip", "alice").await.unwrap();
    let event_id = event.id.to_string();
    engine.add_event_member(&event_id, "bob", "alice").await.unwrap();
    engine
        .add_event_member(&event_id, "carol", "alice")
        .await
        .unwrap();
    event_id
}

fn paid(payer: &str, amount: f64, participants: &[&str]) -> NewPayment {
    NewPayment {
        payer: payer.to_string(),
        amount,
        participants: participants.iter().map(ToString::to_string).collect(),
        note: None,
    }
}

fn pairs(transfers: &[engine::Transfer]) -> Vec<(String, String, f64)> {
    transfers
        .iter()
        .map(|t| (t.from.clone(), t.to.clone(), t.amount))
        .collect()
}

#[tokio::test]
async fn new_event_makes_owner_first_member() {
    let (engine, _db) = engine_with_db().await;

    let event = engine.new_event("  Weekend   trip ", "alice").await.unwrap();
    assert_eq!(event.name, "Weekend trip");
    assert_eq!(event.status, EventStatus::Open);

    let snapshot = engine
        .event_snapshot(&event.id.to_string(), "alice")
        .await
        .unwrap();
    assert_eq!(snapshot.members.len(), 1);
    assert_eq!(snapshot.members[0].id, "alice");

    let events = engine.list_events("alice").await.unwrap();
    assert_eq!(events.len(), 1);
    assert!(engine.list_events("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn only_owner_adds_members_and_strangers_see_nothing() {
    let (engine, _db) = engine_with_db().await;
    let event = engine.new_event("Trip", "alice").await.unwrap();
    let event_id = event.id.to_string();

    let err = engine
        .event_snapshot(&event_id, "bob")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("event not exists".to_string()));

    engine.add_event_member(&event_id, "bob", "alice").await.unwrap();
    let err = engine
        .add_event_member(&event_id, "carol", "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .add_event_member(&event_id, "bob", "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("bob".to_string()));

    let err = engine
        .add_event_member(&event_id, "dave", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn add_payment_validates_input() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;

    let err = engine
        .add_payment(&event_id, paid("alice", -1.0, &[]), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .add_payment(&event_id, paid("dave", 10.0, &[]), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMember(_)));

    let err = engine
        .add_payment(&event_id, paid("alice", 10.0, &["bob", "dave"]), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMember(_)));

    assert!(
        engine
            .list_payments(&event_id, "alice")
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn payments_are_listed_and_deleted() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;

    let first = engine
        .add_payment(&event_id, paid("alice", 30.0, &[]), "alice")
        .await
        .unwrap();
    engine
        .add_payment(&event_id, paid("bob", 12.0, &["bob", "carol"]), "bob")
        .await
        .unwrap();

    let listed = engine.list_payments(&event_id, "carol").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].participants, vec!["bob", "carol"]);

    engine
        .delete_payment(&event_id, &first.id.to_string(), "carol")
        .await
        .unwrap();
    assert_eq!(engine.list_payments(&event_id, "alice").await.unwrap().len(), 1);

    let err = engine
        .delete_payment(&event_id, &first.id.to_string(), "carol")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("payment not exists".to_string()));
}

#[tokio::test]
async fn confirm_settlement_persists_plan() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;
    engine
        .add_payment(&event_id, paid("alice", 90.0, &[]), "alice")
        .await
        .unwrap();
    engine
        .add_payment(&event_id, paid("bob", 30.0, &[]), "bob")
        .await
        .unwrap();

    let preview = engine.preview_split(&event_id, "carol").await.unwrap();
    assert!(engine.list_transfers(&event_id, "carol").await.unwrap().is_empty());

    let result = engine.confirm_settlement(&event_id, "carol").await.unwrap();
    assert_eq!(result, preview);
    assert_eq!(
        pairs(&result.transactions),
        vec![
            ("carol".to_string(), "alice".to_string(), 40.0),
            ("bob".to_string(), "alice".to_string(), 10.0),
        ]
    );

    let stored = engine.list_transfers(&event_id, "alice").await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|t| t.status == TransferStatus::Pending));

    let snapshot = engine.event_snapshot(&event_id, "alice").await.unwrap();
    assert_eq!(snapshot.event.status, EventStatus::Confirmed);
}

#[tokio::test]
async fn confirmed_event_locks_payments_and_members() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;
    let payment = engine
        .add_payment(&event_id, paid("alice", 30.0, &[]), "alice")
        .await
        .unwrap();
    engine.confirm_settlement(&event_id, "alice").await.unwrap();

    let err = engine
        .add_payment(&event_id, paid("bob", 5.0, &[]), "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
    let err = engine
        .delete_payment(&event_id, &payment.id.to_string(), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    engine.new_user("dave", "password", None).await.unwrap();
    let err = engine
        .add_event_member(&event_id, "dave", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    engine.cancel_settlement(&event_id, "bob").await.unwrap();
    assert!(engine.list_transfers(&event_id, "alice").await.unwrap().is_empty());
    engine
        .add_payment(&event_id, paid("bob", 5.0, &[]), "bob")
        .await
        .unwrap();

    let err = engine.cancel_settlement(&event_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn calculate_split_is_idempotent_and_keeps_status() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;
    engine
        .add_payment(&event_id, paid("alice", 300.0, &[]), "alice")
        .await
        .unwrap();
    engine.confirm_settlement(&event_id, "alice").await.unwrap();
    engine
        .update_transfer_status(&event_id, "bob", "alice", TransferStatus::Checking, "bob")
        .await
        .unwrap();

    let first = calculate_split(&engine, &event_id).await.unwrap();
    let second = calculate_split(&engine, &event_id).await.unwrap();
    assert_eq!(first, second);

    let stored = engine.list_transfers(&event_id, "alice").await.unwrap();
    assert_eq!(stored.len(), 2);
    let bob = stored.iter().find(|t| t.from == "bob").unwrap();
    assert_eq!(bob.status, TransferStatus::Checking);
    assert!((bob.amount - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn upsert_prunes_pairs_missing_from_new_plan() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;
    engine
        .add_payment(&event_id, paid("alice", 300.0, &[]), "alice")
        .await
        .unwrap();
    calculate_split(&engine, &event_id).await.unwrap();
    assert_eq!(engine.list_transfers(&event_id, "alice").await.unwrap().len(), 2);

    // carol covers 100 of alice's costs, which settles her debt.
    engine
        .add_payment(&event_id, paid("carol", 100.0, &["alice"]), "carol")
        .await
        .unwrap();
    let result = calculate_split(&engine, &event_id).await.unwrap();
    assert_eq!(
        pairs(&result.transactions),
        vec![("bob".to_string(), "alice".to_string(), 100.0)]
    );
    let stored = engine.list_transfers(&event_id, "alice").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].from, "bob");
}

#[tokio::test]
async fn transfer_status_follows_roles() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;
    engine
        .add_payment(&event_id, paid("alice", 300.0, &[]), "alice")
        .await
        .unwrap();

    let err = engine
        .update_transfer_status(&event_id, "bob", "alice", TransferStatus::Checking, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    engine.confirm_settlement(&event_id, "alice").await.unwrap();

    let err = engine
        .update_transfer_status(&event_id, "bob", "alice", TransferStatus::Checking, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine
        .update_transfer_status(&event_id, "bob", "alice", TransferStatus::Checking, "carol")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine
        .update_transfer_status(&event_id, "bob", "alice", TransferStatus::Completed, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let checking = engine
        .update_transfer_status(&event_id, "bob", "alice", TransferStatus::Checking, "bob")
        .await
        .unwrap();
    assert_eq!(checking.status, TransferStatus::Checking);
    let completed = engine
        .update_transfer_status(&event_id, "bob", "alice", TransferStatus::Completed, "alice")
        .await
        .unwrap();
    assert_eq!(completed.status, TransferStatus::Completed);

    let err = engine
        .update_transfer_status(&event_id, "carol", "bob", TransferStatus::Checking, "carol")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("transfer not exists".to_string()));
}

#[tokio::test]
async fn failed_confirmation_keeps_event_open_and_transfers_untouched() {
    let (engine, db) = engine_with_db().await;
    let event_id = trip(&engine).await;
    let payment = engine
        .add_payment(&event_id, paid("alice", 300.0, &[]), "alice")
        .await
        .unwrap();
    calculate_split(&engine, &event_id).await.unwrap();
    let before = engine.list_transfers(&event_id, "alice").await.unwrap();
    assert_eq!(before.len(), 2);

    // dave is a user but not a member of the event.
    engine.new_user("dave", "password", None).await.unwrap();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE payments SET payer_id = ? WHERE id = ?",
        vec!["dave".into(), payment.id.to_string().into()],
    ))
    .await
    .unwrap();

    let err = engine
        .confirm_settlement(&event_id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Consistency(_)), "{err:?}");

    assert_eq!(engine.list_transfers(&event_id, "alice").await.unwrap(), before);
    let snapshot = engine.event_snapshot(&event_id, "alice").await.unwrap();
    assert_eq!(snapshot.event.status, EventStatus::Open);
}

#[tokio::test]
async fn store_deletes_transfers_of_one_event_only() {
    let (engine, _db) = engine_with_db().await;
    let first_id = trip(&engine).await;
    let second_id = trip(&engine).await;
    for event_id in [&first_id, &second_id] {
        engine
            .add_payment(event_id, paid("alice", 300.0, &[]), "alice")
            .await
            .unwrap();
        engine.confirm_settlement(event_id, "alice").await.unwrap();
    }

    engine.delete_transfers(&first_id).await.unwrap();

    assert!(engine.list_transfers(&first_id, "alice").await.unwrap().is_empty());
    assert_eq!(engine.list_transfers(&second_id, "alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn owner_deletes_event_with_its_data() {
    let (engine, _db) = engine_with_db().await;
    let event_id = trip(&engine).await;
    engine
        .add_payment(&event_id, paid("bob", 60.0, &[]), "bob")
        .await
        .unwrap();
    engine.confirm_settlement(&event_id, "bob").await.unwrap();

    let err = engine.delete_event(&event_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.delete_event(&event_id, "alice").await.unwrap();

    let err = engine.event_snapshot(&event_id, "alice").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("event not exists".to_string()));
    assert!(engine.list_events("bob").await.unwrap().is_empty());
    let err = engine.delete_event(&event_id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn store_rejects_unknown_events() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .event_members("00000000-0000-0000-0000-000000000000")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = calculate_split(&engine, "not-a-uuid").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidId(_)));
}

#[tokio::test]
async fn users_resolve_with_password() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_user("dave", "secret", Some(" Dave  D. "))
        .await
        .unwrap();
    assert_eq!(
        engine.new_user("dave", "other", None).await.unwrap_err(),
        EngineError::ExistingKey("dave".to_string())
    );

    let ok = Credentials {
        username: "dave".to_string(),
        password: "secret".to_string(),
    };
    assert_eq!(engine.resolve_member_id(&ok).await.unwrap(), "dave");

    let wrong = Credentials {
        username: "dave".to_string(),
        password: "nope".to_string(),
    };
    assert!(matches!(
        engine.resolve_member_id(&wrong).await,
        Err(EngineError::Unauthorized(_))
    ));

    let event = engine.new_event("Dinner", "dave").await.unwrap();
    let members = engine
        .list_event_members(&event.id.to_string(), "dave")
        .await
        .unwrap();
    assert_eq!(members[0].name, "Dave D.");
}
