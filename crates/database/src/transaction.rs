//! Karma transaction log operations.
//!
//! The log is append-only. Rows are only ever written alongside the wallet
//! update they describe (see [`crate::wallet`]), never on their own.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::Result;
use crate::models::{Transaction, TransactionKind};

/// List a user's transactions, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Transaction>> {
    let entries = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT id, user_id, amount, kind, description, created_at
        FROM transactions
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Sum of all logged amounts for a user.
///
/// Equals the wallet balance whenever every wallet write also logged its
/// transaction row.
pub async fn ledger_sum(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let sum = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM transactions
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(sum)
}

/// Append a log row inside an open transaction.
pub(crate) async fn insert_in_tx(
    conn: &mut SqliteConnection,
    user_id: &str,
    amount: i64,
    kind: TransactionKind,
    description: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (user_id, amount, kind, description)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(kind)
    .bind(description)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
