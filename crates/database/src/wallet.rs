//! Karma wallet operations.
//!
//! Every balance mutation pairs the wallet update with an append-only row in
//! `transactions`, inside a single database transaction, so the balance and
//! the log cannot drift apart. Debits carry the floor check in the UPDATE
//! itself, which makes concurrent overdraw impossible.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::TransactionKind;
use crate::transaction;

/// Credit karma points to a user's wallet.
///
/// Returns the new balance.
pub async fn credit(pool: &SqlitePool, user_id: &str, amount: i64, description: &str) -> Result<i64> {
    let mut tx = pool.begin().await?;

    credit_in_tx(&mut tx, user_id, amount).await?;
    transaction::insert_in_tx(&mut tx, user_id, amount, TransactionKind::Earned, description).await?;
    let balance = balance_in_tx(&mut tx, user_id).await?;

    tx.commit().await?;
    Ok(balance)
}

/// Debit karma points from a user's wallet.
///
/// Returns the new balance, or [`DatabaseError::InsufficientBalance`] if the
/// wallet cannot cover the amount. No partial writes survive a failure.
pub async fn debit(pool: &SqlitePool, user_id: &str, amount: i64, description: &str) -> Result<i64> {
    let mut tx = pool.begin().await?;

    debit_in_tx(&mut tx, user_id, amount).await?;
    transaction::insert_in_tx(&mut tx, user_id, -amount, TransactionKind::Spent, description).await?;
    let balance = balance_in_tx(&mut tx, user_id).await?;

    tx.commit().await?;
    Ok(balance)
}

/// Get a user's current balance.
pub async fn balance(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT wallet_balance FROM users WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: user_id.to_string(),
    })
}

/// Increment a wallet inside an open transaction.
pub(crate) async fn credit_in_tx(conn: &mut SqliteConnection, user_id: &str, amount: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET wallet_balance = wallet_balance + ?
        WHERE id = ?
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    Ok(())
}

/// Decrement a wallet inside an open transaction.
///
/// The floor check lives in the UPDATE's WHERE clause: when the balance is
/// too low the statement matches no rows and the wallet is untouched.
pub(crate) async fn debit_in_tx(conn: &mut SqliteConnection, user_id: &str, amount: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET wallet_balance = wallet_balance - ?
        WHERE id = ? AND wallet_balance >= ?
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .bind(amount)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let available = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT wallet_balance FROM users WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        return Err(match available {
            Some(available) => DatabaseError::InsufficientBalance {
                user_id: user_id.to_string(),
                required: amount,
                available,
            },
            None => DatabaseError::NotFound {
                entity: "User",
                id: user_id.to_string(),
            },
        });
    }

    Ok(())
}

/// Read a wallet balance inside an open transaction.
pub(crate) async fn balance_in_tx(conn: &mut SqliteConnection, user_id: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT wallet_balance FROM users WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: user_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};
    use crate::{user, Database};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_user(db: &Database, id: &str) {
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

    #[tokio::test]
    async fn test_credit_and_debit() {
        let db = test_db().await;
        seed_user(&db, "u1").await;

        let balance = credit(db.pool(), "u1", 100, "Welcome Bonus").await.unwrap();
        assert_eq!(balance, 100);

        let balance = debit(db.pool(), "u1", 30, "Coffee Voucher").await.unwrap();
        assert_eq!(balance, 70);

        assert_eq!(balance, super::balance(db.pool(), "u1").await.unwrap());

        let sum = transaction::ledger_sum(db.pool(), "u1").await.unwrap();
        assert_eq!(sum, 70);
    }

    #[tokio::test]
    async fn test_debit_rejects_overdraw() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        credit(db.pool(), "u1", 40, "Welcome Bonus").await.unwrap();

        let result = debit(db.pool(), "u1", 50, "Metro Pass").await;
        assert!(matches!(
            result,
            Err(DatabaseError::InsufficientBalance {
                required: 50,
                available: 40,
                ..
            })
        ));

        // No partial writes: balance and log are untouched.
        assert_eq!(balance(db.pool(), "u1").await.unwrap(), 40);
        let entries = transaction::list_for_user(db.pool(), "u1").await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_credit_unknown_user() {
        let db = test_db().await;

        let result = credit(db.pool(), "nobody", 10, "Welcome Bonus").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
