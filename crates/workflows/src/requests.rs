//! Request types accepted by the workflow services.

use database::models::{ReportCategory, ReportStatus};
use serde::{Deserialize, Serialize};

/// Input for submitting a new report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReport {
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    #[serde(default)]
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub author_id: String,
}

/// Input for advancing a report one step along its lifecycle.
///
/// The optional fields become the audit-trail entry for the step: a note
/// from the actor plus any media or location evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub report_id: String,
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
