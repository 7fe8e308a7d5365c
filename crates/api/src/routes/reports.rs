//! Report routes: submission, listing, detail, status transitions, history,
//! and stats.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use database::models::{Report, ReportStatus, ReportSummary, ReportUpdate, Role, User};
use database::user;
use workflows::{CreateReport, ReportStats, UpdateStatus};

use crate::error::Result;
use crate::state::AppState;

/// Submit a new report. Credits the author's submission award.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateReport>,
) -> Result<(StatusCode, Json<Report>)> {
    let report = state.lifecycle.create_report(req).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// List all reports with author and update counts, newest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ReportSummary>>> {
    let reports = state.lifecycle.list_reports().await?;
    Ok(Json(reports))
}

/// A report with its author and audit trail, newest update first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub author: User,
    pub updates: Vec<ReportUpdate>,
}

/// Get one report with its author and audit trail.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportDetail>> {
    let (report, updates) = state.lifecycle.report_detail(&id).await?;
    let author = user::get_user(state.db.pool(), &report.author_id).await?;
    Ok(Json(ReportDetail {
        report,
        author,
        updates,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub actor_id: String,
    pub new_status: ReportStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Advance a report one step along its lifecycle.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<Report>> {
    let report = state
        .lifecycle
        .update_status(UpdateStatus {
            report_id: id,
            actor_id: req.actor_id,
            new_status: req.new_status,
            note: req.note,
            caption: req.caption,
            image_url: req.image_url,
            video_url: req.video_url,
            latitude: req.latitude,
            longitude: req.longitude,
        })
        .await?;

    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: String,
    pub role: Role,
}

/// Role-dependent history: citizens see their own reports, department users
/// see the triage queue of everything accepted onward.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ReportSummary>>> {
    let reports = match query.role {
        Role::Citizen => state.lifecycle.reports_by_author(&query.user_id).await?,
        Role::Department => state.lifecycle.department_queue().await?,
    };

    Ok(Json(reports))
}

/// Total and per-status report counts.
pub async fn stats(State(state): State<AppState>) -> Result<Json<ReportStats>> {
    let stats = state.lifecycle.stats().await?;
    Ok(Json(stats))
}
