//! Report lifecycle engine.
//!
//! Reports advance along SUBMITTED -> ACCEPTED -> IN_PROGRESS -> RESOLVED ->
//! VERIFIED, one step at a time, never backwards. Department users progress
//! the first three steps; only the report's author can verify the fix.
//! Submission and verification both credit the author's karma wallet.

use database::models::{
    BonusAward, NewReport, Report, ReportStatus, ReportSummary, ReportUpdate, Role, StatusChange,
};
use database::{report, report_update, user, Database, DatabaseError};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, WorkflowError};
use crate::requests::{CreateReport, UpdateStatus};
use crate::validation::{
    validate_coordinates, validate_geo_tag, validate_optional_text, validate_text,
    MAX_ADDRESS_LENGTH, MAX_CAPTION_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_NOTE_LENGTH,
    MAX_TITLE_LENGTH, MAX_URL_LENGTH,
};

/// Karma credited to the author when a report is submitted.
pub const SUBMISSION_AWARD: i64 = 10;

/// Karma credited to the author when their report reaches VERIFIED.
pub const VERIFICATION_BONUS: i64 = 50;

/// The report lifecycle engine.
#[derive(Clone)]
pub struct Lifecycle {
    db: Database,
}

/// Total and per-status report counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total: i64,
    pub submitted: i64,
    pub accepted: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub verified: i64,
}

impl Lifecycle {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Submit a new report.
    ///
    /// Only citizens can submit. The report row and the author's submission
    /// award commit atomically; the returned report is the stored row.
    pub async fn create_report(&self, input: CreateReport) -> Result<Report> {
        validate_text("title", &input.title, MAX_TITLE_LENGTH)?;
        validate_text("description", &input.description, MAX_DESCRIPTION_LENGTH)?;
        validate_optional_text("address", input.address.as_deref(), MAX_ADDRESS_LENGTH)?;
        validate_coordinates(input.latitude, input.longitude)?;

        let author = user::get_user(self.db.pool(), &input.author_id).await?;
        if author.role != Role::Citizen {
            return Err(WorkflowError::Forbidden(
                "only citizens can submit reports".to_string(),
            ));
        }

        let new = NewReport {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            category: input.category,
            address: input.address,
            latitude: input.latitude,
            longitude: input.longitude,
            author_id: input.author_id,
        };

        let report = report::create_report(
            self.db.pool(),
            &new,
            SUBMISSION_AWARD,
            "Report Submission Reward",
        )
        .await?;

        info!(report_id = %report.id, author_id = %report.author_id, "report submitted");
        Ok(report)
    }

    /// Advance a report one step along its lifecycle.
    ///
    /// The step must be the single legal successor of the report's current
    /// status. The transition, its audit-trail entry, and the verification
    /// bonus (when the step reaches VERIFIED for the first time) commit
    /// atomically; a concurrent transition leaves exactly one winner.
    pub async fn update_status(&self, input: UpdateStatus) -> Result<Report> {
        validate_optional_text("note", input.note.as_deref(), MAX_NOTE_LENGTH)?;
        validate_optional_text("caption", input.caption.as_deref(), MAX_CAPTION_LENGTH)?;
        validate_optional_text("image URL", input.image_url.as_deref(), MAX_URL_LENGTH)?;
        validate_optional_text("video URL", input.video_url.as_deref(), MAX_URL_LENGTH)?;
        validate_geo_tag(input.latitude, input.longitude)?;

        let actor = user::get_user(self.db.pool(), &input.actor_id).await?;
        let current = report::get_report(self.db.pool(), &input.report_id).await?;

        if current.status.next() != Some(input.new_status) {
            return Err(WorkflowError::InvalidTransition {
                from: current.status,
                to: input.new_status,
            });
        }

        if input.new_status == ReportStatus::Verified {
            if actor.id != current.author_id {
                return Err(WorkflowError::Forbidden(
                    "only the report author can verify the fix".to_string(),
                ));
            }
        } else if actor.role != Role::Department {
            return Err(WorkflowError::Forbidden(
                "only department users can progress reports".to_string(),
            ));
        }

        let bonus = if input.new_status == ReportStatus::Verified {
            Some(BonusAward {
                amount: VERIFICATION_BONUS,
                description: format!("Report Verified: {}", current.title),
            })
        } else {
            None
        };

        let change = StatusChange {
            report_id: input.report_id,
            expected: current.status,
            new_status: input.new_status,
            note: input.note,
            caption: input.caption,
            image_url: input.image_url,
            video_url: input.video_url,
            latitude: input.latitude,
            longitude: input.longitude,
        };

        let report = report::apply_transition(self.db.pool(), &change, bonus.as_ref())
            .await
            .map_err(|err| match err {
                // A racing writer moved the row first; report the fresh
                // status so the caller can refetch.
                DatabaseError::StaleStatus { actual, .. } => WorkflowError::InvalidTransition {
                    from: actual,
                    to: change.new_status,
                },
                other => other.into(),
            })?;

        info!(report_id = %report.id, status = %report.status, "report status updated");
        Ok(report)
    }

    /// Get a report with its audit trail, newest update first.
    pub async fn report_detail(&self, id: &str) -> Result<(Report, Vec<ReportUpdate>)> {
        let report = report::get_report(self.db.pool(), id).await?;
        let updates = report_update::list_for_report(self.db.pool(), id).await?;
        Ok((report, updates))
    }

    /// All reports with author and update counts, newest first.
    pub async fn list_reports(&self) -> Result<Vec<ReportSummary>> {
        Ok(report::list_reports(self.db.pool()).await?)
    }

    /// One citizen's reports, most recently active first.
    pub async fn reports_by_author(&self, author_id: &str) -> Result<Vec<ReportSummary>> {
        Ok(report::list_reports_by_author(self.db.pool(), author_id).await?)
    }

    /// The department triage queue: every report that has been accepted,
    /// including finished ones, most recently active first.
    pub async fn department_queue(&self) -> Result<Vec<ReportSummary>> {
        Ok(report::list_reports_in_statuses(
            self.db.pool(),
            &[
                ReportStatus::Accepted,
                ReportStatus::InProgress,
                ReportStatus::Resolved,
                ReportStatus::Verified,
            ],
        )
        .await?)
    }

    /// Total and per-status report counts.
    pub async fn stats(&self) -> Result<ReportStats> {
        let counts = report::count_by_status(self.db.pool()).await?;

        let mut stats = ReportStats::default();
        for (status, count) in counts {
            stats.total += count;
            match status {
                ReportStatus::Submitted => stats.submitted = count,
                ReportStatus::Accepted => stats.accepted = count,
                ReportStatus::InProgress => stats.in_progress = count,
                ReportStatus::Resolved => stats.resolved = count,
                ReportStatus::Verified => stats.verified = count,
            }
        }

        Ok(stats)
    }
}
