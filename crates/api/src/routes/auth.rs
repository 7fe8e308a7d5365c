//! Session and user routes.
//!
//! Login is the demo deployment's role-pick flow: it returns the earliest
//! seeded user holding the requested role. There are no credentials and no
//! sessions; clients send the chosen user's ID with later requests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use database::models::{NewUser, Role, User};
use database::user;
use workflows::validation::{validate_email, validate_optional_text, validate_text, MAX_NAME_LENGTH};

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub role: Role,
}

/// Log in as the first seeded user with the given role.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = user::first_user_with_role(state.db.pool(), req.role).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
}

/// Register a new user. Wallets start at zero.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    validate_text("name", &req.name, MAX_NAME_LENGTH)?;
    validate_email(&req.email)?;
    validate_optional_text("department", req.department.as_deref(), MAX_NAME_LENGTH)?;

    let user = user::create_user(
        state.db.pool(),
        &NewUser {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            email: req.email,
            role: req.role,
            department: req.department,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let user = user::get_user(state.db.pool(), &id).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct AddPointsRequest {
    pub amount: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: i64,
}

/// Credit karma points to a user.
///
/// Routed through the ledger, so the credit lands in the transaction log
/// together with the balance change.
pub async fn add_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddPointsRequest>,
) -> Result<Json<BalanceResponse>> {
    let reason = req.reason.as_deref().unwrap_or("Karma adjustment");
    let balance = state.ledger.credit(&id, req.amount, reason).await?;
    Ok(Json(BalanceResponse { balance }))
}
