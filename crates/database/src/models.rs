//! Database models.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Citizen,
    Department,
}

impl Role {
    /// Stable string form, as stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "CITIZEN",
            Role::Department => "DEPARTMENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCategory {
    Pothole,
    Garbage,
    Lighting,
    Other,
}

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Submitted,
    Accepted,
    InProgress,
    Resolved,
    Verified,
}

impl ReportStatus {
    /// The only status this one may legally advance to, if any.
    pub fn next(&self) -> Option<ReportStatus> {
        match self {
            ReportStatus::Submitted => Some(ReportStatus::Accepted),
            ReportStatus::Accepted => Some(ReportStatus::InProgress),
            ReportStatus::InProgress => Some(ReportStatus::Resolved),
            ReportStatus::Resolved => Some(ReportStatus::Verified),
            ReportStatus::Verified => None,
        }
    }

    /// Stable string form, as stored in the `reports.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "SUBMITTED",
            ReportStatus::Accepted => "ACCEPTED",
            ReportStatus::InProgress => "IN_PROGRESS",
            ReportStatus::Resolved => "RESOLVED",
            ReportStatus::Verified => "VERIFIED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of reward in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardKind {
    Cash,
    Merch,
    Voucher,
    Other,
}

/// Direction of a karma transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Earned,
    Spent,
}

/// A registered user with their karma wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Entity UUID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email, unique per account.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Municipal department, for department accounts.
    pub department: Option<String>,
    /// Current karma points balance.
    pub wallet_balance: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for registering a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
}

/// A citizen-submitted issue report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Entity UUID.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Full description of the issue.
    pub description: String,
    /// Issue category.
    pub category: ReportCategory,
    /// Free-form street address, if provided.
    pub address: Option<String>,
    /// Latitude of the issue location.
    pub latitude: f64,
    /// Longitude of the issue location.
    pub longitude: f64,
    /// Current lifecycle status.
    pub status: ReportStatus,
    /// ID of the citizen who submitted the report.
    pub author_id: String,
    /// Whether the verification bonus has been paid out.
    pub bonus_paid: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Timestamp of the last status change.
    pub updated_at: String,
}

/// Data for creating a new report. Status starts at `SUBMITTED`.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub author_id: String,
}

/// A report joined with its author and update count, for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReportStatus,
    pub author_id: String,
    /// Display name of the author.
    pub author_name: String,
    /// Role of the author.
    pub author_role: Role,
    /// Number of status updates recorded so far.
    pub update_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// One entry in a report's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpdate {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Report this update belongs to.
    pub report_id: String,
    /// Status the report entered with this update.
    pub status: ReportStatus,
    /// Free-form note from the actor.
    pub note: Option<String>,
    /// Caption for attached media.
    pub caption: Option<String>,
    /// URL of an attached photo.
    pub image_url: Option<String>,
    /// URL of an attached video.
    pub video_url: Option<String>,
    /// Latitude where the update was recorded.
    pub latitude: Option<f64>,
    /// Longitude where the update was recorded.
    pub longitude: Option<f64>,
    /// Creation timestamp.
    pub created_at: String,
}

/// A requested status transition together with its audit-trail payload.
///
/// `expected` carries the status the caller last observed; the transition
/// only applies if the stored row still matches it.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub report_id: String,
    pub expected: ReportStatus,
    pub new_status: ReportStatus,
    pub note: Option<String>,
    pub caption: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A one-time karma credit granted when a transition claims the report's
/// bonus flag.
#[derive(Debug, Clone)]
pub struct BonusAward {
    pub amount: i64,
    pub description: String,
}

/// A redeemable reward in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    /// Entity UUID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price in karma points.
    pub cost: i64,
    /// Reward kind.
    pub kind: RewardKind,
    /// Catalog description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for adding a reward to the catalog.
#[derive(Debug, Clone)]
pub struct NewReward {
    pub id: String,
    pub name: String,
    pub cost: i64,
    pub kind: RewardKind,
    pub description: String,
}

/// A completed reward redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    /// Entity UUID.
    pub id: String,
    /// User who redeemed.
    pub user_id: String,
    /// Reward that was redeemed.
    pub reward_id: String,
    /// Unique voucher code issued for this redemption.
    pub code: String,
    /// Redemption status, `COMPLETED` on creation.
    pub status: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for recording a redemption. The debit, the redemption row, and the
/// spend transaction are written atomically.
#[derive(Debug, Clone)]
pub struct NewRedemption {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    pub code: String,
    /// Karma points to debit from the user.
    pub cost: i64,
    /// Description recorded on the spend transaction.
    pub description: String,
}

/// A redemption joined with its reward, for history views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    /// Display name of the redeemed reward.
    pub reward_name: String,
    /// Current catalog price of the reward.
    pub cost: i64,
    pub code: String,
    pub status: String,
    pub created_at: String,
}

/// One entry in the append-only karma transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Auto-incrementing ID.
    pub id: i64,
    /// User whose wallet changed.
    pub user_id: String,
    /// Signed amount: positive for credits, negative for debits.
    pub amount: i64,
    /// Whether the points were earned or spent.
    pub kind: TransactionKind,
    /// Human-readable reason for the change.
    pub description: String,
    /// Creation timestamp.
    pub created_at: String,
}
