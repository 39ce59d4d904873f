use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use guardian_common::models::{RewardCredit, RewardReason};
use guardian_common::traits::UserStore;
use guardian_common::Error;

/// Credit-only coin ledger over a `UserStore`.
///
/// Atomicity comes from `UserStore::apply_credit`; the ledger never reads a
/// balance and writes it back. Credits for different users share nothing.
#[derive(Clone)]
pub struct RewardLedger {
    users: Arc<dyn UserStore>,
}

impl RewardLedger {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn credit(&self, user_id: Uuid, amount: i64, reason: RewardReason) -> Result<i64, Error> {
        self.apply(RewardCredit::new(user_id, amount, reason)).await
    }

    pub async fn apply(&self, credit: RewardCredit) -> Result<i64, Error> {
        if credit.amount < 0 {
            return Err(Error::validation(format!(
                "credit amount must be >= 0, got {} ({})",
                credit.amount, credit.reason
            )));
        }

        match self.users.apply_credit(credit.user_id, credit.amount).await {
            Ok(balance) => {
                info!(
                    "Credited {} coins to user {} for {}; balance={}",
                    credit.amount, credit.user_id, credit.reason, balance
                );
                Ok(balance)
            }
            Err(Error::NotFound(msg)) => Err(Error::NotFound(msg)),
            Err(e) => {
                error!(
                    "Failed to credit {} coins to user {} for {}: {}",
                    credit.amount, credit.user_id, credit.reason, e
                );
                Err(Error::Ledger(e.to_string()))
            }
        }
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<i64, Error> {
        self.users.get_balance(user_id).await
    }
}
