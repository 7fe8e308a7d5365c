//! Points ledger: karma credits, debits, and reconciliation.

use database::models::Transaction;
use database::{transaction, wallet, Database};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::validation::{validate_amount, validate_text, MAX_REASON_LENGTH};

/// The karma points ledger.
///
/// Thin boundary over [`database::wallet`]: validates inputs and logs, while
/// the storage layer guarantees that every balance change commits together
/// with its transaction row.
#[derive(Clone)]
pub struct Ledger {
    db: Database,
}

/// Result of reconciling a wallet against its transaction log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAudit {
    /// Stored wallet balance.
    pub balance: i64,
    /// Sum of all logged transaction amounts.
    pub ledger_sum: i64,
    /// True when the two agree.
    pub consistent: bool,
}

impl Ledger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Credit karma points, returning the new balance.
    pub async fn credit(&self, user_id: &str, amount: i64, reason: &str) -> Result<i64> {
        validate_amount("amount", amount)?;
        validate_text("reason", reason, MAX_REASON_LENGTH)?;

        let balance = wallet::credit(self.db.pool(), user_id, amount, reason).await?;
        info!(user_id, amount, balance, "karma credited");
        Ok(balance)
    }

    /// Debit karma points, returning the new balance.
    ///
    /// The floor check runs inside the storage layer's conditional UPDATE,
    /// so concurrent debits cannot overdraw the wallet.
    pub async fn debit(&self, user_id: &str, amount: i64, reason: &str) -> Result<i64> {
        validate_amount("amount", amount)?;
        validate_text("reason", reason, MAX_REASON_LENGTH)?;

        let balance = wallet::debit(self.db.pool(), user_id, amount, reason).await?;
        info!(user_id, amount, balance, "karma debited");
        Ok(balance)
    }

    /// Current wallet balance.
    pub async fn balance(&self, user_id: &str) -> Result<i64> {
        Ok(wallet::balance(self.db.pool(), user_id).await?)
    }

    /// A user's transaction history, newest first.
    pub async fn transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        Ok(transaction::list_for_user(self.db.pool(), user_id).await?)
    }

    /// Reconcile the wallet balance against the transaction log.
    pub async fn audit(&self, user_id: &str) -> Result<LedgerAudit> {
        let balance = wallet::balance(self.db.pool(), user_id).await?;
        let ledger_sum = transaction::ledger_sum(self.db.pool(), user_id).await?;

        Ok(LedgerAudit {
            balance,
            ledger_sum,
            consistent: balance == ledger_sum,
        })
    }
}
