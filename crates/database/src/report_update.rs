//! Report audit-trail operations.
//!
//! Rows are written by [`crate::report::apply_transition`] as part of each
//! status change; this module only reads them back.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::ReportUpdate;

/// List a report's updates, newest first.
pub async fn list_for_report(pool: &SqlitePool, report_id: &str) -> Result<Vec<ReportUpdate>> {
    let updates = sqlx::query_as::<_, ReportUpdate>(
        r#"
        SELECT id, report_id, status, note, caption, image_url, video_url,
               latitude, longitude, created_at
        FROM report_updates
        WHERE report_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(report_id)
    .fetch_all(pool)
    .await?;

    Ok(updates)
}
