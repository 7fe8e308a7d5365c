//! Core workflows for CivicPulse: the report lifecycle engine, the karma
//! points ledger, and the reward redemption workflow.
//!
//! Each service wraps an explicit [`Database`] handle, so applications and
//! tests choose the database and share one pool:
//!
//! ```no_run
//! use database::Database;
//! use workflows::{CreateReport, Lifecycle};
//! use database::models::ReportCategory;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:civicpulse.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let lifecycle = Lifecycle::new(db.clone());
//!     let report = lifecycle
//!         .create_report(CreateReport {
//!             title: "Pothole on 5th Avenue".to_string(),
//!             description: "Deep pothole near the bus stop".to_string(),
//!             category: ReportCategory::Pothole,
//!             address: None,
//!             latitude: 20.2961,
//!             longitude: 85.8245,
//!             author_id: "some-citizen-id".to_string(),
//!         })
//!         .await?;
//!     println!("submitted report {}", report.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! The services hold no state of their own. All multi-write operations
//! commit atomically in the persistence layer, so two services over the
//! same database never observe each other's partial writes.

mod error;
mod ledger;
mod lifecycle;
mod redemption;
mod requests;
pub mod validation;

// Public exports
pub use error::{Result, WorkflowError};
pub use ledger::{Ledger, LedgerAudit};
pub use lifecycle::{Lifecycle, ReportStats, SUBMISSION_AWARD, VERIFICATION_BONUS};
pub use redemption::{RedemptionReceipt, Redemptions};
pub use requests::{CreateReport, UpdateStatus};
pub use validation::ValidationError;

// Re-export the database handle applications construct services with
pub use database::Database;
