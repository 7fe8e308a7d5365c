//! Reward redemption workflow.

use database::models::{NewRedemption, Redemption, RedemptionRecord, Reward};
use database::{redemption, reward, user, Database, DatabaseError};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, WorkflowError};

/// Attempts before giving up on a colliding voucher code.
const CODE_ATTEMPTS: u32 = 3;

/// The reward redemption workflow.
#[derive(Clone)]
pub struct Redemptions {
    db: Database,
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionReceipt {
    pub redemption: Redemption,
    /// The voucher code, repeated for convenience.
    pub code: String,
    /// The user's balance after the debit.
    pub balance: i64,
}

impl Redemptions {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Exchange karma points for a reward.
    ///
    /// The wallet debit, the redemption row, and the spend transaction
    /// commit as one unit; a failure anywhere leaves no partial writes.
    /// Under concurrent redemptions the storage-layer floor check picks a
    /// single winner, and the loser sees
    /// [`WorkflowError::InsufficientBalance`].
    pub async fn redeem(&self, user_id: &str, reward_id: &str) -> Result<RedemptionReceipt> {
        self.redeem_with(user_id, reward_id, voucher_code).await
    }

    async fn redeem_with(
        &self,
        user_id: &str,
        reward_id: &str,
        next_code: impl Fn() -> String,
    ) -> Result<RedemptionReceipt> {
        let user = user::get_user(self.db.pool(), user_id).await?;
        let reward = reward::get_reward(self.db.pool(), reward_id).await?;

        // Early answer for the common case; the conditional debit below is
        // what actually holds under concurrency.
        if user.wallet_balance < reward.cost {
            return Err(WorkflowError::InsufficientBalance {
                required: reward.cost,
                available: user.wallet_balance,
            });
        }

        let description = format!("Redeemed {}", reward.name);
        let mut attempt = 0;
        loop {
            attempt += 1;

            let new = NewRedemption {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                reward_id: reward_id.to_string(),
                code: next_code(),
                cost: reward.cost,
                description: description.clone(),
            };

            match redemption::create_redemption(self.db.pool(), &new).await {
                Ok((redemption, balance)) => {
                    info!(user_id, reward_id, code = %redemption.code, "reward redeemed");
                    return Ok(RedemptionReceipt {
                        code: redemption.code.clone(),
                        redemption,
                        balance,
                    });
                }
                Err(DatabaseError::AlreadyExists { .. }) if attempt < CODE_ATTEMPTS => {
                    warn!(user_id, reward_id, attempt, "voucher code collision, retrying");
                }
                Err(DatabaseError::AlreadyExists { .. }) => {
                    return Err(WorkflowError::VoucherCollision);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// The reward catalog, cheapest first.
    pub async fn rewards(&self) -> Result<Vec<Reward>> {
        Ok(reward::list_rewards(self.db.pool()).await?)
    }

    /// A user's redemption history, newest first.
    pub async fn history_for(&self, user_id: &str) -> Result<Vec<RedemptionRecord>> {
        Ok(redemption::list_for_user(self.db.pool(), user_id).await?)
    }
}

/// Generate a voucher code: `VOUCHER-` plus an uppercased UUID.
fn voucher_code() -> String {
    format!("VOUCHER-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}
