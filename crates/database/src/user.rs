//! User CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, Role, User};

/// Create a new user. Wallets start at zero.
pub async fn create_user(pool: &SqlitePool, new: &NewUser) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, role, department)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(new.role)
    .bind(&new.department)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: new.email.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_user(pool, &new.id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, role, department, wallet_balance, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by email.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, role, department, wallet_balance, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: email.to_string(),
    })
}

/// Get the earliest-registered user holding the given role.
pub async fn first_user_with_role(pool: &SqlitePool, role: Role) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, role, department, wallet_balance, created_at
        FROM users
        WHERE role = ?
        ORDER BY created_at, id
        LIMIT 1
        "#,
    )
    .bind(role)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: role.as_str().to_string(),
    })
}

/// List all users.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, role, department, wallet_balance, created_at
        FROM users
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
