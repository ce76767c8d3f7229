//! Challenge delivery collaborator.
//!
//! The plaintext code only ever flows to a `ChallengeDelivery`; it never
//! appears in an HTTP response body.

use async_trait::async_trait;

use crate::error::BankError;

#[async_trait]
pub trait ChallengeDelivery: Send + Sync {
    async fn send_challenge(&self, user_id: i64, code: &str) -> Result<(), BankError>;
}

/// Development delivery: logs the code instead of sending an SMS.
pub struct TracingDelivery;

#[async_trait]
impl ChallengeDelivery for TracingDelivery {
    async fn send_challenge(&self, user_id: i64, code: &str) -> Result<(), BankError> {
        tracing::warn!(user_id, code, "OTP delivery stub; wire up an SMS provider");
        Ok(())
    }
}
