use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::BankError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_FUNDS: i32 = 1002;
    pub const INVALID_AMOUNT: i32 = 1003;
    pub const SELF_TRANSFER: i32 = 1004;
    pub const BALANCE_NOT_ZERO: i32 = 1005;
    pub const NO_CONTACT_CHANNEL: i32 = 1006;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const ADMIN_VERIFICATION_FAILED: i32 = 2003;

    // OTP challenge errors (3xxx)
    pub const NO_CHALLENGE: i32 = 3001;
    pub const CHALLENGE_EXPIRED: i32 = 3002;
    pub const CHALLENGE_MISMATCH: i32 = 3003;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const RECIPIENT_NOT_FOUND: i32 = 4002;
    pub const WRITE_CONFLICT: i32 = 4091;
    pub const GONE: i32 = 4100;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}

/// Rejection type every handler returns on the error path.
pub type Rejection = (StatusCode, Json<ApiResponse<()>>);

/// Map a core error to its transport status and stable error code.
///
/// Server-side failures are logged here and leave the process as a generic
/// message; details never reach the client.
pub fn reject(err: BankError) -> Rejection {
    use error_codes::*;

    let (status, code) = match &err {
        BankError::InvalidAmount => (StatusCode::BAD_REQUEST, INVALID_AMOUNT),
        BankError::InsufficientFunds => (StatusCode::BAD_REQUEST, INSUFFICIENT_FUNDS),
        BankError::AccountNotFoundOrDenied => (StatusCode::NOT_FOUND, ACCOUNT_NOT_FOUND),
        BankError::SelfTransfer => (StatusCode::BAD_REQUEST, SELF_TRANSFER),
        BankError::RecipientNotFound => (StatusCode::NOT_FOUND, RECIPIENT_NOT_FOUND),
        BankError::NoContactChannel => (StatusCode::BAD_REQUEST, NO_CONTACT_CHANNEL),
        BankError::NoChallenge => (StatusCode::BAD_REQUEST, NO_CHALLENGE),
        BankError::ChallengeExpired => (StatusCode::BAD_REQUEST, CHALLENGE_EXPIRED),
        BankError::ChallengeMismatch => (StatusCode::UNAUTHORIZED, CHALLENGE_MISMATCH),
        BankError::BalanceNotZero => (StatusCode::CONFLICT, BALANCE_NOT_ZERO),
        BankError::DeprecatedEndpoint => (StatusCode::GONE, GONE),
        BankError::WriteConflict => (StatusCode::CONFLICT, WRITE_CONFLICT),
        BankError::InternalCalculationError | BankError::Database(_) => {
            tracing::error!(error = %err, "internal error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(INTERNAL_ERROR, "Internal server error")),
            );
        }
    };

    (status, Json(ApiResponse::<()>::error(code, err.to_string())))
}
