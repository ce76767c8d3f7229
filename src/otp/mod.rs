//! One-time-password challenges for transfer authorization.
//!
//! Codes are 6 digits, hashed with argon2 before storage, valid for a
//! configured window and consumed on first successful verification. A user
//! has at most one outstanding challenge; issuing replaces it.

pub mod delivery;
pub mod store;

pub use delivery::{ChallengeDelivery, TracingDelivery};
pub use store::{ChallengeStore, PgChallengeStore, StoredChallenge};

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::BankError;

pub struct OtpChallengeManager {
    store: Arc<dyn ChallengeStore>,
    expiry_minutes: i64,
}

impl OtpChallengeManager {
    pub fn new(store: Arc<dyn ChallengeStore>, expiry_minutes: i64) -> Self {
        Self {
            store,
            expiry_minutes,
        }
    }

    /// Issue a fresh challenge for the user, replacing any outstanding one.
    /// Returns the plaintext code for the delivery collaborator only.
    pub async fn issue(&self, user_id: i64) -> Result<String, BankError> {
        self.issue_at(user_id, Utc::now()).await
    }

    pub async fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, BankError> {
        let code = generate_code();
        let salt = SaltString::generate(&mut OsRng);
        let code_hash = Argon2::default()
            .hash_password(code.as_bytes(), &salt)
            .map_err(|_| BankError::InternalCalculationError)?
            .to_string();

        self.store
            .put(
                user_id,
                StoredChallenge {
                    code_hash,
                    expires_at: now + Duration::minutes(self.expiry_minutes),
                },
            )
            .await?;
        Ok(code)
    }

    /// Verify and consume the outstanding challenge.
    ///
    /// An expired challenge is cleared so the user must initiate again; a
    /// mismatched code leaves the challenge in place for another attempt.
    pub async fn verify(&self, user_id: i64, code: &str) -> Result<(), BankError> {
        self.verify_at(user_id, code, Utc::now()).await
    }

    pub async fn verify_at(
        &self,
        user_id: i64,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), BankError> {
        let challenge = self
            .store
            .get(user_id)
            .await?
            .ok_or(BankError::NoChallenge)?;

        if now > challenge.expires_at {
            self.store.clear(user_id).await?;
            return Err(BankError::ChallengeExpired);
        }

        let parsed = PasswordHash::new(&challenge.code_hash)
            .map_err(|_| BankError::InternalCalculationError)?;
        if Argon2::default()
            .verify_password(code.as_bytes(), &parsed)
            .is_err()
        {
            return Err(BankError::ChallengeMismatch);
        }

        // Single use: consumed on success.
        self.store.clear(user_id).await?;
        Ok(())
    }

    pub async fn has_contact_channel(&self, user_id: i64) -> Result<bool, BankError> {
        self.store.has_contact_channel(user_id).await
    }
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}
