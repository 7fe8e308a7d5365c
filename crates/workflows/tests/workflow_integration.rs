//! End-to-end workflow tests: lifecycle awards, redemption atomicity, and
//! wallet behavior under concurrency.

use std::path::PathBuf;

use futures::future::join_all;

use database::models::{NewReward, NewUser, ReportCategory, ReportStatus, Role, RewardKind};
use database::{transaction, user, Database};
use workflows::{
    CreateReport, Ledger, Lifecycle, Redemptions, UpdateStatus, WorkflowError, SUBMISSION_AWARD,
    VERIFICATION_BONUS,
};

#[tokio::test]
async fn full_lifecycle_pays_both_awards() {
    let db = memory_db().await;
    let citizen = seed_user(&db, "citizen@example.com", Role::Citizen).await;
    let dept = seed_user(&db, "roads@example.com", Role::Department).await;

    let lifecycle = Lifecycle::new(db.clone());
    let ledger = Ledger::new(db.clone());

    let report = lifecycle
        .create_report(sample_report(&citizen))
        .await
        .unwrap();
    assert_eq!(report.status, ReportStatus::Submitted);
    assert_eq!(ledger.balance(&citizen).await.unwrap(), SUBMISSION_AWARD);

    for status in [
        ReportStatus::Accepted,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
    ] {
        lifecycle
            .update_status(step(&report.id, &dept, status))
            .await
            .unwrap();
    }

    let verified = lifecycle
        .update_status(step(&report.id, &citizen, ReportStatus::Verified))
        .await
        .unwrap();
    assert_eq!(verified.status, ReportStatus::Verified);
    assert!(verified.bonus_paid);

    // Submission award plus verification bonus, all logged.
    assert_eq!(
        ledger.balance(&citizen).await.unwrap(),
        SUBMISSION_AWARD + VERIFICATION_BONUS
    );
    let audit = ledger.audit(&citizen).await.unwrap();
    assert!(audit.consistent);

    let history = ledger.transactions(&citizen).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history
        .iter()
        .any(|t| t.description == "Report Verified: Pothole on 5th Avenue"));

    // Each step left one audit-trail entry.
    let (_, updates) = lifecycle.report_detail(&report.id).await.unwrap();
    assert_eq!(updates.len(), 4);
    assert_eq!(updates[0].status, ReportStatus::Verified);
}

#[tokio::test]
async fn replayed_verification_cannot_double_pay_bonus() {
    let db = memory_db().await;
    let citizen = seed_user(&db, "citizen@example.com", Role::Citizen).await;
    let dept = seed_user(&db, "roads@example.com", Role::Department).await;

    let lifecycle = Lifecycle::new(db.clone());
    let ledger = Ledger::new(db.clone());

    let report = lifecycle
        .create_report(sample_report(&citizen))
        .await
        .unwrap();
    for status in [
        ReportStatus::Accepted,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
    ] {
        lifecycle
            .update_status(step(&report.id, &dept, status))
            .await
            .unwrap();
    }
    lifecycle
        .update_status(step(&report.id, &citizen, ReportStatus::Verified))
        .await
        .unwrap();
    assert_eq!(
        ledger.balance(&citizen).await.unwrap(),
        SUBMISSION_AWARD + VERIFICATION_BONUS
    );

    // A verified report accepts no further steps, so a plain replay fails.
    let result = lifecycle
        .update_status(step(&report.id, &citizen, ReportStatus::Verified))
        .await;
    assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));

    // Even resetting the status behind the engine's back and verifying
    // again pays nothing: the bonus flag is already claimed.
    sqlx::query("UPDATE reports SET status = 'RESOLVED' WHERE id = ?")
        .bind(&report.id)
        .execute(db.pool())
        .await
        .unwrap();
    let replayed = lifecycle
        .update_status(step(&report.id, &citizen, ReportStatus::Verified))
        .await
        .unwrap();
    assert_eq!(replayed.status, ReportStatus::Verified);
    assert!(replayed.bonus_paid);

    assert_eq!(
        ledger.balance(&citizen).await.unwrap(),
        SUBMISSION_AWARD + VERIFICATION_BONUS
    );
    assert!(ledger.audit(&citizen).await.unwrap().consistent);
}

#[tokio::test]
async fn redeem_rejected_when_balance_short() {
    let db = memory_db().await;
    let citizen = seed_user(&db, "citizen@example.com", Role::Citizen).await;
    let reward = seed_reward(&db, "Metro Pass", 50).await;

    let ledger = Ledger::new(db.clone());
    let redemptions = Redemptions::new(db.clone());

    ledger.credit(&citizen, 40, "Welcome Bonus").await.unwrap();

    let result = redemptions.redeem(&citizen, &reward).await;
    assert!(matches!(
        result,
        Err(WorkflowError::InsufficientBalance {
            required: 50,
            available: 40,
        })
    ));

    // All-or-nothing: no redemption, no spend transaction, full balance.
    assert_eq!(ledger.balance(&citizen).await.unwrap(), 40);
    assert!(redemptions.history_for(&citizen).await.unwrap().is_empty());
    assert_eq!(ledger.transactions(&citizen).await.unwrap().len(), 1);
    assert!(ledger.audit(&citizen).await.unwrap().consistent);
}

#[tokio::test]
async fn redeem_writes_all_three_records() {
    let db = memory_db().await;
    let citizen = seed_user(&db, "citizen@example.com", Role::Citizen).await;
    let reward = seed_reward(&db, "Coffee Voucher", 30).await;

    let ledger = Ledger::new(db.clone());
    let redemptions = Redemptions::new(db.clone());

    ledger.credit(&citizen, 100, "Welcome Bonus").await.unwrap();

    let receipt = redemptions.redeem(&citizen, &reward).await.unwrap();
    assert_eq!(receipt.balance, 70);
    assert!(receipt.code.starts_with("VOUCHER-"));

    assert_eq!(ledger.balance(&citizen).await.unwrap(), 70);
    let history = redemptions.history_for(&citizen).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].code, receipt.code);

    let spent: i64 = transaction::list_for_user(db.pool(), &citizen)
        .await
        .unwrap()
        .iter()
        .filter(|t| t.amount < 0)
        .map(|t| t.amount)
        .sum();
    assert_eq!(spent, -30);
    assert!(ledger.audit(&citizen).await.unwrap().consistent);
}

#[tokio::test]
async fn concurrent_redemptions_pick_one_winner() {
    let db = memory_db().await;
    let citizen = seed_user(&db, "citizen@example.com", Role::Citizen).await;
    let reward = seed_reward(&db, "Coffee Voucher", 30).await;

    let ledger = Ledger::new(db.clone());
    ledger.credit(&citizen, 50, "Welcome Bonus").await.unwrap();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let redemptions = Redemptions::new(db.clone());
            let citizen = citizen.clone();
            let reward = reward.clone();
            tokio::spawn(async move { redemptions.redeem(&citizen, &reward).await })
        })
        .collect();

    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);

    // 50 - 30 leaves 20: only one debit landed.
    assert_eq!(ledger.balance(&citizen).await.unwrap(), 20);
    let redemptions = Redemptions::new(db.clone());
    assert_eq!(redemptions.history_for(&citizen).await.unwrap().len(), 1);
    assert!(ledger.audit(&citizen).await.unwrap().consistent);
}

#[tokio::test]
async fn concurrent_debits_never_overdraw() {
    let db = memory_db().await;
    let citizen = seed_user(&db, "citizen@example.com", Role::Citizen).await;

    let ledger = Ledger::new(db.clone());
    ledger.credit(&citizen, 35, "Welcome Bonus").await.unwrap();

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let ledger = Ledger::new(db.clone());
            let citizen = citizen.clone();
            tokio::spawn(async move {
                ledger.debit(&citizen, 10, &format!("spend {i}")).await
            })
        })
        .collect();

    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 3);
    assert_eq!(ledger.balance(&citizen).await.unwrap(), 5);
    assert!(ledger.audit(&citizen).await.unwrap().consistent);
}

#[tokio::test]
async fn parallel_connections_respect_wallet_floor() {
    let (url, path) = temp_db_url("wallet_floor");
    let db = Database::connect_with_pool_size(&url, 5).await.unwrap();
    db.migrate().await.unwrap();

    let citizen = seed_user(&db, "citizen@example.com", Role::Citizen).await;
    let ledger = Ledger::new(db.clone());
    ledger.credit(&citizen, 50, "Welcome Bonus").await.unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let ledger = Ledger::new(db.clone());
            let citizen = citizen.clone();
            tokio::spawn(async move {
                ledger.debit(&citizen, 20, &format!("spend {i}")).await
            })
        })
        .collect();

    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    // 50 covers exactly two debits of 20; the floor blocks the rest.
    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 2);
    assert_eq!(ledger.balance(&citizen).await.unwrap(), 10);
    assert!(ledger.audit(&citizen).await.unwrap().consistent);

    db.close().await;
    cleanup_db_files(&path);
}

async fn memory_db() -> Database {
    // A single connection so every task sees the same in-memory database.
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

async fn seed_user(db: &Database, email: &str, role: Role) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    user::create_user(
        db.pool(),
        &NewUser {
            id: id.clone(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            role,
            department: (role == Role::Department).then(|| "Roads".to_string()),
        },
    )
    .await
    .unwrap();
    id
}

async fn seed_reward(db: &Database, name: &str, cost: i64) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    database::reward::create_reward(
        db.pool(),
        &NewReward {
            id: id.clone(),
            name: name.to_string(),
            cost,
            kind: RewardKind::Voucher,
            description: format!("{name} for loyal reporters"),
        },
    )
    .await
    .unwrap();
    id
}

fn sample_report(author: &str) -> CreateReport {
    CreateReport {
        title: "Pothole on 5th Avenue".to_string(),
        description: "Deep pothole near the bus stop".to_string(),
        category: ReportCategory::Pothole,
        address: Some("5th Avenue, Bhubaneswar".to_string()),
        latitude: 20.2961,
        longitude: 85.8245,
        author_id: author.to_string(),
    }
}

fn step(report_id: &str, actor: &str, to: ReportStatus) -> UpdateStatus {
    UpdateStatus {
        report_id: report_id.to_string(),
        actor_id: actor.to_string(),
        new_status: to,
        note: Some(format!("moving to {to}")),
        caption: None,
        image_url: None,
        video_url: None,
        latitude: None,
        longitude: None,
    }
}

fn temp_db_url(tag: &str) -> (String, PathBuf) {
    let name = format!("civicpulse_test_{}_{}.db", tag, uuid::Uuid::new_v4().simple());
    let path = std::env::temp_dir().join(name);
    (format!("sqlite:{}?mode=rwc", path.display()), path)
}

fn cleanup_db_files(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}
