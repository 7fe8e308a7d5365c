//! Demo-data seeder for CivicPulse.
//!
//! Provisions a citizen, a department user, and the reward catalog, then
//! drives a batch of sample reports through the real lifecycle so balances,
//! transaction logs, and audit trails come out consistent.

use clap::Parser;
use tracing::info;
use uuid::Uuid;

use database::models::{NewReward, NewUser, ReportCategory, ReportStatus, Role, RewardKind, User};
use database::{reward, user, Database, DatabaseError};
use workflows::{CreateReport, Ledger, Lifecycle, UpdateStatus};

const REWARD_CATALOG: [(&str, i64, RewardKind, &str); 5] = [
    (
        "UPI Cashout \u{20b9}50",
        50,
        RewardKind::Cash,
        "Direct transfer to your UPI account",
    ),
    (
        "CivicPulse Hoodie",
        500,
        RewardKind::Merch,
        "Premium cotton hoodie with the CivicPulse logo",
    ),
    (
        "Coffee Voucher",
        30,
        RewardKind::Voucher,
        "Free coffee at partner cafes",
    ),
    (
        "Metro Pass",
        100,
        RewardKind::Voucher,
        "One week of unlimited metro rides",
    ),
    (
        "Tree Planting",
        20,
        RewardKind::Other,
        "We plant a tree in your name",
    ),
];

const SAMPLE_REPORTS: [(&str, &str, ReportCategory, &str); 4] = [
    (
        "Pothole near bus stop",
        "Deep pothole damaging two-wheelers every morning",
        ReportCategory::Pothole,
        "Janpath Road, Bhubaneswar",
    ),
    (
        "Garbage pile on the corner",
        "Uncollected garbage for three days, stray dogs gathering",
        ReportCategory::Garbage,
        "Sachivalaya Marg, Bhubaneswar",
    ),
    (
        "Streetlight out",
        "Lamp post dark all night, stretch feels unsafe",
        ReportCategory::Lighting,
        "Cuttack Road, Bhubaneswar",
    ),
    (
        "Broken park bench",
        "Bench slats splintered and unsafe to sit on",
        ReportCategory::Other,
        "Nandankanan Road, Bhubaneswar",
    ),
];

#[derive(Debug, Parser)]
#[command(name = "seeder")]
#[command(about = "Seed the CivicPulse database with demo users, rewards, and reports")]
struct Args {
    /// SQLite database URL. Falls back to SQLITE_PATH env.
    #[arg(long)]
    database_url: Option<String>,

    /// Delete all existing rows before seeding
    #[arg(long)]
    fresh: bool,

    /// Number of sample reports to create
    #[arg(long, default_value_t = 12)]
    reports: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let url = args
        .database_url
        .clone()
        .or_else(|| std::env::var("SQLITE_PATH").ok())
        .unwrap_or_else(|| "sqlite:civicpulse.db?mode=rwc".to_string());

    let db = Database::connect(&url).await?;
    db.migrate().await?;

    if args.fresh {
        wipe(&db).await?;
        info!("Cleared existing data");
    }

    let ledger = Ledger::new(db.clone());
    let lifecycle = Lifecycle::new(db.clone());

    // Demo users. Re-running without --fresh reuses the existing accounts.
    let citizen = ensure_user(
        &db,
        &ledger,
        NewUser {
            id: Uuid::new_v4().to_string(),
            name: "John Doe".to_string(),
            email: "citizen@example.com".to_string(),
            role: Role::Citizen,
            department: None,
        },
    )
    .await?;

    let department = ensure_user(
        &db,
        &ledger,
        NewUser {
            id: Uuid::new_v4().to_string(),
            name: "Roads Department".to_string(),
            email: "roads@example.com".to_string(),
            role: Role::Department,
            department: Some("Roads".to_string()),
        },
    )
    .await?;

    seed_rewards(&db).await?;
    seed_reports(&lifecycle, &citizen.id, &department.id, args.reports).await?;

    let balance = ledger.balance(&citizen.id).await?;
    info!(citizen = %citizen.email, balance, "Seeding finished");
    Ok(())
}

/// Create a user, or fetch the existing account with the same email. New
/// citizens get a welcome bonus so the demo wallet has points to spend.
async fn ensure_user(db: &Database, ledger: &Ledger, new: NewUser) -> Result<User, Box<dyn std::error::Error>> {
    match user::create_user(db.pool(), &new).await {
        Ok(created) => {
            if created.role == Role::Citizen {
                ledger.credit(&created.id, 100, "Welcome Bonus").await?;
            }
            info!(email = %created.email, role = %created.role, "Created user");
            Ok(user::get_user(db.pool(), &created.id).await?)
        }
        Err(DatabaseError::AlreadyExists { .. }) => {
            info!(email = %new.email, "User already present, reusing");
            Ok(user::get_user_by_email(db.pool(), &new.email).await?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Populate the reward catalog, unless one is already in place.
async fn seed_rewards(db: &Database) -> Result<(), DatabaseError> {
    if !reward::list_rewards(db.pool()).await?.is_empty() {
        info!("Reward catalog already present, skipping");
        return Ok(());
    }

    for (name, cost, kind, description) in REWARD_CATALOG {
        reward::create_reward(
            db.pool(),
            &NewReward {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                cost,
                kind,
                description: description.to_string(),
            },
        )
        .await?;
    }

    info!(count = REWARD_CATALOG.len(), "Seeded reward catalog");
    Ok(())
}

/// Create sample reports and advance each a different distance along the
/// lifecycle, through the real workflow so every award is logged.
async fn seed_reports(
    lifecycle: &Lifecycle,
    citizen_id: &str,
    department_id: &str,
    count: usize,
) -> Result<(), workflows::WorkflowError> {
    for i in 0..count {
        let (title, description, category, address) = SAMPLE_REPORTS[i % SAMPLE_REPORTS.len()];

        let report = lifecycle
            .create_report(CreateReport {
                title: title.to_string(),
                description: description.to_string(),
                category,
                address: Some(address.to_string()),
                // Scatter the pins around central Bhubaneswar.
                latitude: 20.2961 + ((i * 37) % 100) as f64 / 1000.0 - 0.05,
                longitude: 85.8245 + ((i * 53) % 100) as f64 / 1000.0 - 0.05,
                author_id: citizen_id.to_string(),
            })
            .await?;

        let steps = [
            ReportStatus::Accepted,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
            ReportStatus::Verified,
        ];
        for status in steps.iter().take(i % 5) {
            let actor = if *status == ReportStatus::Verified {
                citizen_id
            } else {
                department_id
            };

            lifecycle
                .update_status(UpdateStatus {
                    report_id: report.id.clone(),
                    actor_id: actor.to_string(),
                    new_status: *status,
                    note: Some(note_for(*status).to_string()),
                    caption: None,
                    image_url: None,
                    video_url: None,
                    latitude: None,
                    longitude: None,
                })
                .await?;
        }
    }

    info!(count, "Seeded sample reports");
    Ok(())
}

fn note_for(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Submitted => "Report submitted",
        ReportStatus::Accepted => "Assigned to a field crew",
        ReportStatus::InProgress => "Work started on site",
        ReportStatus::Resolved => "Issue fixed, awaiting confirmation",
        ReportStatus::Verified => "Confirmed fixed by the reporter",
    }
}

/// Delete all rows, children before parents.
async fn wipe(db: &Database) -> Result<(), DatabaseError> {
    for table in [
        "transactions",
        "redemptions",
        "report_updates",
        "reports",
        "rewards",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(db.pool())
            .await?;
    }

    Ok(())
}
