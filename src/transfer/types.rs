//! Transfer request and lifecycle types.

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Who the money goes to.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransferRecipient {
    /// Another account owned by the same user, addressed by id.
    Internal { account_id: Uuid },
    /// Any account in the bank, addressed by its public number.
    External { account_number: String },
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub user_id: i64,
    pub source_account_id: Uuid,
    /// Raw client amount string; parsed and validated on initiation.
    pub amount: String,
    pub recipient: TransferRecipient,
    /// Free-text label prefixed onto both legs; "Transfer" when absent.
    pub description: Option<String>,
}

/// Lifecycle markers for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Requested,
    Validated,
    OtpIssued,
    OtpVerified,
    Committed,
    Rejected,
}

impl TransferState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Requested => "requested",
            TransferState::Validated => "validated",
            TransferState::OtpIssued => "otp-issued",
            TransferState::OtpVerified => "otp-verified",
            TransferState::Committed => "committed",
            TransferState::Rejected => "rejected",
        }
    }
}

/// Result of a successful initiation. The OTP itself goes to the delivery
/// collaborator, never to the caller.
#[derive(Debug, Clone)]
pub struct InitiatedTransfer {
    pub source_account_id: Uuid,
    pub recipient_number: String,
    pub amount: Decimal,
}
