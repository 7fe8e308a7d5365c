//! Reward catalog operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewReward, Reward};

/// Add a reward to the catalog.
pub async fn create_reward(pool: &SqlitePool, new: &NewReward) -> Result<Reward> {
    sqlx::query(
        r#"
        INSERT INTO rewards (id, name, cost, kind, description)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.id)
    .bind(&new.name)
    .bind(new.cost)
    .bind(new.kind)
    .bind(&new.description)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Reward",
                    id: new.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_reward(pool, &new.id).await
}

/// Get a reward by ID.
pub async fn get_reward(pool: &SqlitePool, id: &str) -> Result<Reward> {
    sqlx::query_as::<_, Reward>(
        r#"
        SELECT id, name, cost, kind, description, created_at
        FROM rewards
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Reward",
        id: id.to_string(),
    })
}

/// List the catalog, cheapest first.
pub async fn list_rewards(pool: &SqlitePool) -> Result<Vec<Reward>> {
    let rewards = sqlx::query_as::<_, Reward>(
        r#"
        SELECT id, name, cost, kind, description, created_at
        FROM rewards
        ORDER BY cost, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rewards)
}
