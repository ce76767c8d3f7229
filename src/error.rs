//! Closed error taxonomy for the banking core.
//!
//! Every failure a core operation can produce is one of these variants. The
//! gateway maps each variant to a transport status and a stable numeric code;
//! nothing below the gateway knows about HTTP.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("Amount must be a positive decimal with at most 2 decimal places")]
    InvalidAmount,

    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Not-found and not-owned fold into one variant so callers cannot probe
    /// for the existence of other users' accounts.
    #[error("Account not found or access denied")]
    AccountNotFoundOrDenied,

    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    #[error("Recipient account not found")]
    RecipientNotFound,

    #[error("No registered phone number found for OTP verification")]
    NoContactChannel,

    #[error("No transfer challenge found; initiate the transfer first")]
    NoChallenge,

    #[error("OTP has expired; initiate the transfer again")]
    ChallengeExpired,

    #[error("Invalid OTP provided")]
    ChallengeMismatch,

    #[error("Account balance must be zero before deletion")]
    BalanceNotZero,

    #[error("Internal calculation error")]
    InternalCalculationError,

    #[error("This transfer method is deprecated; use the OTP flow")]
    DeprecatedEndpoint,

    /// Optimistic-concurrency miss: the account changed between read and
    /// write. The orchestrator retries; surfaced only when retries run out.
    #[error("Account was modified concurrently; please retry")]
    WriteConflict,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BankError {
    /// True for errors the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            BankError::InternalCalculationError | BankError::Database(_)
        )
    }
}
