//! Application state shared across handlers.

use database::Database;
use workflows::{Ledger, Lifecycle, Redemptions};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Karma points ledger.
    pub ledger: Ledger,
    /// Report lifecycle engine.
    pub lifecycle: Lifecycle,
    /// Reward redemption workflow.
    pub redemptions: Redemptions,
}

impl AppState {
    /// Create new application state over a single database handle.
    pub fn new(db: Database) -> Self {
        Self {
            ledger: Ledger::new(db.clone()),
            lifecycle: Lifecycle::new(db.clone()),
            redemptions: Redemptions::new(db.clone()),
            db,
        }
    }
}
