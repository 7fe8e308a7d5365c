//! Report operations.
//!
//! Report writes compose several statements: creation pays the submission
//! award, and transitions append the audit-trail row and may claim the
//! one-time verification bonus. Each operation runs as a single database
//! transaction and returns the post-write row.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{
    BonusAward, NewReport, Report, ReportStatus, ReportSummary, StatusChange, TransactionKind,
};
use crate::{transaction, wallet};

const SUMMARY_SELECT: &str = r#"
    SELECT r.id, r.title, r.description, r.category, r.address,
           r.latitude, r.longitude, r.status, r.author_id,
           u.name AS author_name, u.role AS author_role,
           (SELECT COUNT(*) FROM report_updates ru WHERE ru.report_id = r.id) AS update_count,
           r.created_at, r.updated_at
    FROM reports r
    INNER JOIN users u ON u.id = r.author_id
"#;

/// Create a report and credit the author's submission award atomically.
///
/// Returns the stored report.
pub async fn create_report(
    pool: &SqlitePool,
    new: &NewReport,
    award: i64,
    award_description: &str,
) -> Result<Report> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO reports (id, title, description, category, address, latitude, longitude, author_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.category)
    .bind(&new.address)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.author_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::NotFound {
                    entity: "User",
                    id: new.author_id.clone(),
                };
            }
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Report",
                    id: new.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    wallet::credit_in_tx(&mut tx, &new.author_id, award).await?;
    transaction::insert_in_tx(
        &mut tx,
        &new.author_id,
        award,
        TransactionKind::Earned,
        award_description,
    )
    .await?;

    let report = get_report_in_tx(&mut tx, &new.id).await?;

    tx.commit().await?;
    Ok(report)
}

/// Apply a status transition, append the audit-trail row, and pay the bonus
/// if one is due, all in one database transaction.
///
/// The UPDATE only matches while the row still holds `change.expected`, so a
/// transition raced by another writer fails with
/// [`DatabaseError::StaleStatus`] instead of double-applying. The bonus is
/// guarded by the report's `bonus_paid` flag: the first transition to claim
/// the flag pays the author, any replay skips the credit.
pub async fn apply_transition(
    pool: &SqlitePool,
    change: &StatusChange,
    bonus: Option<&BonusAward>,
) -> Result<Report> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE reports
        SET status = ?, updated_at = datetime('now')
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(change.new_status)
    .bind(&change.report_id)
    .bind(change.expected)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        let actual = sqlx::query_scalar::<_, ReportStatus>(
            r#"
            SELECT status FROM reports WHERE id = ?
            "#,
        )
        .bind(&change.report_id)
        .fetch_optional(&mut *tx)
        .await?;

        return Err(match actual {
            Some(actual) => DatabaseError::StaleStatus {
                id: change.report_id.clone(),
                expected: change.expected,
                actual,
            },
            None => DatabaseError::NotFound {
                entity: "Report",
                id: change.report_id.clone(),
            },
        });
    }

    sqlx::query(
        r#"
        INSERT INTO report_updates (report_id, status, note, caption, image_url, video_url, latitude, longitude)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&change.report_id)
    .bind(change.new_status)
    .bind(&change.note)
    .bind(&change.caption)
    .bind(&change.image_url)
    .bind(&change.video_url)
    .bind(change.latitude)
    .bind(change.longitude)
    .execute(&mut *tx)
    .await?;

    if let Some(bonus) = bonus {
        let claimed = sqlx::query(
            r#"
            UPDATE reports
            SET bonus_paid = 1
            WHERE id = ? AND bonus_paid = 0
            "#,
        )
        .bind(&change.report_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 1 {
            let author_id = sqlx::query_scalar::<_, String>(
                r#"
                SELECT author_id FROM reports WHERE id = ?
                "#,
            )
            .bind(&change.report_id)
            .fetch_one(&mut *tx)
            .await?;

            wallet::credit_in_tx(&mut tx, &author_id, bonus.amount).await?;
            transaction::insert_in_tx(
                &mut tx,
                &author_id,
                bonus.amount,
                TransactionKind::Earned,
                &bonus.description,
            )
            .await?;
        }
    }

    let report = get_report_in_tx(&mut tx, &change.report_id).await?;

    tx.commit().await?;
    Ok(report)
}

/// Get a report by ID.
pub async fn get_report(pool: &SqlitePool, id: &str) -> Result<Report> {
    sqlx::query_as::<_, Report>(
        r#"
        SELECT id, title, description, category, address, latitude, longitude,
               status, author_id, bonus_paid, created_at, updated_at
        FROM reports
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Report",
        id: id.to_string(),
    })
}

/// List all reports with author and update counts, newest first.
pub async fn list_reports(pool: &SqlitePool) -> Result<Vec<ReportSummary>> {
    let sql = format!("{} ORDER BY r.created_at DESC", SUMMARY_SELECT);
    let reports = sqlx::query_as::<_, ReportSummary>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(reports)
}

/// List one author's reports, most recently active first.
pub async fn list_reports_by_author(pool: &SqlitePool, author_id: &str) -> Result<Vec<ReportSummary>> {
    let sql = format!(
        "{} WHERE r.author_id = ? ORDER BY r.updated_at DESC",
        SUMMARY_SELECT
    );
    let reports = sqlx::query_as::<_, ReportSummary>(&sql)
        .bind(author_id)
        .fetch_all(pool)
        .await?;

    Ok(reports)
}

/// List reports currently in any of the given statuses, most recently
/// active first.
pub async fn list_reports_in_statuses(
    pool: &SqlitePool,
    statuses: &[ReportStatus],
) -> Result<Vec<ReportSummary>> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; statuses.len()].join(", ");
    let sql = format!(
        "{} WHERE r.status IN ({}) ORDER BY r.updated_at DESC",
        SUMMARY_SELECT, placeholders
    );

    let mut query = sqlx::query_as::<_, ReportSummary>(&sql);
    for status in statuses {
        query = query.bind(*status);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Count reports grouped by status.
pub async fn count_by_status(pool: &SqlitePool) -> Result<Vec<(ReportStatus, i64)>> {
    let rows = sqlx::query_as::<_, (ReportStatus, i64)>(
        r#"
        SELECT status, COUNT(*) as count
        FROM reports
        GROUP BY status
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count total reports.
pub async fn count_reports(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reports
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

async fn get_report_in_tx(conn: &mut SqliteConnection, id: &str) -> Result<Report> {
    sqlx::query_as::<_, Report>(
        r#"
        SELECT id, title, description, category, address, latitude, longitude,
               status, author_id, bonus_paid, created_at, updated_at
        FROM reports
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Report",
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, ReportCategory, Role};
    use crate::{report_update, user, Database};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_citizen(db: &Database, id: &str) {
        user::create_user(
            db.pool(),
            &NewUser {
                id: id.to_string(),
                name: "Alice".to_string(),
                email: format!("{id}@example.com"),
                role: Role::Citizen,
                department: None,
            },
        )
        .await
        .unwrap();
    }

    fn pothole(id: &str, author: &str) -> NewReport {
        NewReport {
            id: id.to_string(),
            title: "Pothole on 5th Avenue".to_string(),
            description: "Deep pothole near the bus stop".to_string(),
            category: ReportCategory::Pothole,
            address: Some("5th Avenue, Bhubaneswar".to_string()),
            latitude: 20.2961,
            longitude: 85.8245,
            author_id: author.to_string(),
        }
    }

    fn step(report_id: &str, from: ReportStatus, to: ReportStatus) -> StatusChange {
        StatusChange {
            report_id: report_id.to_string(),
            expected: from,
            new_status: to,
            note: Some("update".to_string()),
            caption: None,
            image_url: None,
            video_url: None,
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn test_create_report_pays_award() {
        let db = test_db().await;
        seed_citizen(&db, "u1").await;

        let report = create_report(db.pool(), &pothole("rep1", "u1"), 10, "Report Submission Reward")
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Submitted);
        assert!(!report.bonus_paid);

        assert_eq!(wallet::balance(db.pool(), "u1").await.unwrap(), 10);
        let entries = transaction::list_for_user(db.pool(), "u1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "Report Submission Reward");
    }

    #[tokio::test]
    async fn test_create_report_unknown_author_rolls_back() {
        let db = test_db().await;

        let result = create_report(db.pool(), &pothole("rep1", "ghost"), 10, "Report Submission Reward").await;
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { entity: "User", .. })
        ));
        assert_eq!(count_reports(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transition_records_audit_row() {
        let db = test_db().await;
        seed_citizen(&db, "u1").await;
        create_report(db.pool(), &pothole("rep1", "u1"), 10, "Report Submission Reward")
            .await
            .unwrap();

        let report = apply_transition(
            db.pool(),
            &step("rep1", ReportStatus::Submitted, ReportStatus::Accepted),
            None,
        )
        .await
        .unwrap();
        assert_eq!(report.status, ReportStatus::Accepted);

        let updates = report_update::list_for_report(db.pool(), "rep1").await.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, ReportStatus::Accepted);
    }

    #[tokio::test]
    async fn test_stale_transition_rejected() {
        let db = test_db().await;
        seed_citizen(&db, "u1").await;
        create_report(db.pool(), &pothole("rep1", "u1"), 10, "Report Submission Reward")
            .await
            .unwrap();

        apply_transition(
            db.pool(),
            &step("rep1", ReportStatus::Submitted, ReportStatus::Accepted),
            None,
        )
        .await
        .unwrap();

        // Replaying the same step sees the row has moved on.
        let result = apply_transition(
            db.pool(),
            &step("rep1", ReportStatus::Submitted, ReportStatus::Accepted),
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(DatabaseError::StaleStatus {
                expected: ReportStatus::Submitted,
                actual: ReportStatus::Accepted,
                ..
            })
        ));

        // The rejected replay must not leave a second audit row.
        let updates = report_update::list_for_report(db.pool(), "rep1").await.unwrap();
        assert_eq!(updates.len(), 1);
    }

    #[tokio::test]
    async fn test_bonus_paid_once() {
        let db = test_db().await;
        seed_citizen(&db, "u1").await;
        create_report(db.pool(), &pothole("rep1", "u1"), 10, "Report Submission Reward")
            .await
            .unwrap();

        for (from, to) in [
            (ReportStatus::Submitted, ReportStatus::Accepted),
            (ReportStatus::Accepted, ReportStatus::InProgress),
            (ReportStatus::InProgress, ReportStatus::Resolved),
        ] {
            apply_transition(db.pool(), &step("rep1", from, to), None).await.unwrap();
        }

        let bonus = BonusAward {
            amount: 50,
            description: "Report Verified: Pothole on 5th Avenue".to_string(),
        };
        let report = apply_transition(
            db.pool(),
            &step("rep1", ReportStatus::Resolved, ReportStatus::Verified),
            Some(&bonus),
        )
        .await
        .unwrap();
        assert!(report.bonus_paid);
        assert_eq!(wallet::balance(db.pool(), "u1").await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_summary_queries() {
        let db = test_db().await;
        seed_citizen(&db, "u1").await;
        seed_citizen(&db, "u2").await;
        create_report(db.pool(), &pothole("rep1", "u1"), 10, "Report Submission Reward")
            .await
            .unwrap();
        create_report(db.pool(), &pothole("rep2", "u2"), 10, "Report Submission Reward")
            .await
            .unwrap();
        apply_transition(
            db.pool(),
            &step("rep2", ReportStatus::Submitted, ReportStatus::Accepted),
            None,
        )
        .await
        .unwrap();

        let all = list_reports(db.pool()).await.unwrap();
        assert_eq!(all.len(), 2);

        let mine = list_reports_by_author(db.pool(), "u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "rep1");
        assert_eq!(mine[0].author_name, "Alice");
        assert_eq!(mine[0].update_count, 0);

        let active = list_reports_in_statuses(db.pool(), &[ReportStatus::Accepted]).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "rep2");
        assert_eq!(active[0].update_count, 1);

        let none = list_reports_in_statuses(db.pool(), &[]).await.unwrap();
        assert!(none.is_empty());

        let counts = count_by_status(db.pool()).await.unwrap();
        assert!(counts.contains(&(ReportStatus::Submitted, 1)));
        assert!(counts.contains(&(ReportStatus::Accepted, 1)));
    }
}
