//! Reward catalog, redemption, and ledger history routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use database::models::{RedemptionRecord, Reward, Transaction};
use workflows::RedemptionReceipt;

use crate::error::Result;
use crate::state::AppState;

/// The reward catalog, cheapest first.
pub async fn catalog(State(state): State<AppState>) -> Result<Json<Vec<Reward>>> {
    let rewards = state.redemptions.rewards().await?;
    Ok(Json(rewards))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub user_id: String,
}

/// Redeem a reward for karma points. Returns the voucher and new balance.
pub async fn redeem(
    State(state): State<AppState>,
    Path(reward_id): Path<String>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<RedemptionReceipt>> {
    let receipt = state.redemptions.redeem(&req.user_id, &reward_id).await?;
    Ok(Json(receipt))
}

/// A user's transaction history, newest first.
pub async fn transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Transaction>>> {
    let entries = state.ledger.transactions(&id).await?;
    Ok(Json(entries))
}

/// A user's redemption history, newest first.
pub async fn redemptions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RedemptionRecord>>> {
    let records = state.redemptions.history_for(&id).await?;
    Ok(Json(records))
}
