//! Challenge persistence.
//!
//! One outstanding challenge per user, stored as an argon2 hash next to its
//! expiry. Issuing a new challenge overwrites the previous one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::error::BankError;

/// A stored, hashed challenge.
#[derive(Debug, Clone)]
pub struct StoredChallenge {
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Store a challenge, replacing any outstanding one.
    async fn put(&self, user_id: i64, challenge: StoredChallenge) -> Result<(), BankError>;

    async fn get(&self, user_id: i64) -> Result<Option<StoredChallenge>, BankError>;

    /// Remove the outstanding challenge, if any.
    async fn clear(&self, user_id: i64) -> Result<(), BankError>;

    /// Whether the user has a phone number a challenge can be delivered to.
    async fn has_contact_channel(&self, user_id: i64) -> Result<bool, BankError>;
}

pub struct PgChallengeStore {
    pool: PgPool,
}

impl PgChallengeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChallengeStore for PgChallengeStore {
    async fn put(&self, user_id: i64, challenge: StoredChallenge) -> Result<(), BankError> {
        let res = sqlx::query(
            "UPDATE users_tb SET otp_hash = $1, otp_expires_at = $2, updated_at = now() \
             WHERE user_id = $3",
        )
        .bind(&challenge.code_hash)
        .bind(challenge.expires_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(BankError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn get(&self, user_id: i64) -> Result<Option<StoredChallenge>, BankError> {
        let row = sqlx::query(
            "SELECT otp_hash, otp_expires_at FROM users_tb WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let code_hash: Option<String> = row.get("otp_hash");
        let expires_at: Option<DateTime<Utc>> = row.get("otp_expires_at");
        Ok(match (code_hash, expires_at) {
            (Some(code_hash), Some(expires_at)) => Some(StoredChallenge {
                code_hash,
                expires_at,
            }),
            _ => None,
        })
    }

    async fn clear(&self, user_id: i64) -> Result<(), BankError> {
        sqlx::query(
            "UPDATE users_tb SET otp_hash = NULL, otp_expires_at = NULL, updated_at = now() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has_contact_channel(&self, user_id: i64) -> Result<bool, BankError> {
        let row = sqlx::query("SELECT phone_number FROM users_tb WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(false);
        };
        let phone: Option<String> = row.get("phone_number");
        Ok(phone.is_some_and(|p| !p.trim().is_empty()))
    }
}
