//! Redemption operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewRedemption, Redemption, RedemptionRecord, TransactionKind};
use crate::{transaction, wallet};

/// Record a redemption: debit the wallet, insert the redemption row, and
/// append the spend transaction, all in one database transaction.
///
/// Returns the redemption and the user's new balance. The debit carries the
/// floor check, so two racing redemptions can never spend the same points;
/// the loser gets [`DatabaseError::InsufficientBalance`] and writes nothing.
pub async fn create_redemption(
    pool: &SqlitePool,
    new: &NewRedemption,
) -> Result<(Redemption, i64)> {
    let mut tx = pool.begin().await?;

    wallet::debit_in_tx(&mut tx, &new.user_id, new.cost).await?;

    sqlx::query(
        r#"
        INSERT INTO redemptions (id, user_id, reward_id, code)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&new.id)
    .bind(&new.user_id)
    .bind(&new.reward_id)
    .bind(&new.code)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Redemption",
                    id: new.code.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    transaction::insert_in_tx(
        &mut tx,
        &new.user_id,
        -new.cost,
        TransactionKind::Spent,
        &new.description,
    )
    .await?;

    let redemption = sqlx::query_as::<_, Redemption>(
        r#"
        SELECT id, user_id, reward_id, code, status, created_at
        FROM redemptions
        WHERE id = ?
        "#,
    )
    .bind(&new.id)
    .fetch_one(&mut *tx)
    .await?;

    let balance = wallet::balance_in_tx(&mut tx, &new.user_id).await?;

    tx.commit().await?;
    Ok((redemption, balance))
}

/// List a user's redemptions with their rewards, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<RedemptionRecord>> {
    let records = sqlx::query_as::<_, RedemptionRecord>(
        r#"
        SELECT rd.id, rd.user_id, rd.reward_id, rw.name AS reward_name,
               rw.cost, rd.code, rd.status, rd.created_at
        FROM redemptions rd
        INNER JOIN rewards rw ON rw.id = rd.reward_id
        WHERE rd.user_id = ?
        ORDER BY rd.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
