//! SQLite persistence layer for CivicPulse.
//!
//! This crate provides async database operations for users, reports, the
//! reward catalog, and the karma transaction log using SQLx with SQLite.
//! Multi-step writes (report creation, status transitions, redemptions) run
//! as single database transactions and return the post-write rows.
//!
//! # Example
//!
//! ```no_run
//! use database::models::{NewUser, Role};
//! use database::{user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:civicpulse.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a citizen
//!     let citizen = user::create_user(db.pool(), &NewUser {
//!         id: "c27fb365-0c84-4cf2-8555-814bb065e448".to_string(),
//!         name: "Alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!         role: Role::Citizen,
//!         department: None,
//!     }).await?;
//!     println!("{} starts with {} karma", citizen.name, citizen.wallet_balance);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod redemption;
pub mod report;
pub mod report_update;
pub mod reward;
pub mod transaction;
pub mod user;
pub mod wallet;

pub use error::{DatabaseError, Result};
pub use models::{
    Redemption, RedemptionRecord, Report, ReportSummary, ReportUpdate, Reward, Transaction, User,
};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent report and redemption traffic.
    const DEFAULT_POOL_SIZE: u32 = 8;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/civicpulse.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
