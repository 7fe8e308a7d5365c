//! Route handlers for the CivicPulse API.

pub mod auth;
pub mod health;
pub mod reports;
pub mod rewards;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Session and users
        .route("/api/auth/login", post(auth::login))
        .route("/api/users", post(auth::register))
        .route("/api/users/:id", get(auth::get_user))
        .route("/api/users/:id/points", post(auth::add_points))
        .route("/api/users/:id/transactions", get(rewards::transactions))
        .route("/api/users/:id/redemptions", get(rewards::redemptions))
        // Reports
        .route("/api/reports", post(reports::create).get(reports::list))
        .route("/api/reports/:id", get(reports::detail))
        .route("/api/reports/:id/status", post(reports::update_status))
        .route("/api/history", get(reports::history))
        .route("/api/stats", get(reports::stats))
        // Rewards
        .route("/api/rewards", get(rewards::catalog))
        .route("/api/rewards/:id/redeem", post(rewards::redeem))
}
