//! OTP-authorized transfer endpoints.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, Rejection, reject};
use crate::ledger::TransactionView;
use crate::money;
use crate::transfer::{TransferRecipient, TransferRequest};
use crate::user_auth::Claims;
use crate::user_auth::handlers::user_id_from;

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiateTransferRequest {
    pub source_account_id: Uuid,
    #[schema(example = "40.00")]
    pub amount: String,
    pub recipient: TransferRecipient,
    #[schema(example = "Rent")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExecuteTransferRequest {
    pub source_account_id: Uuid,
    #[schema(example = "40.00")]
    pub amount: String,
    pub recipient: TransferRecipient,
    #[schema(example = "Rent")]
    pub description: Option<String>,
    #[schema(example = "123456")]
    pub otp: String,
}

/// Initiation acknowledgment; the OTP itself travels out of band.
#[derive(Debug, Serialize, ToSchema)]
pub struct InitiateTransferResponse {
    pub source_account_id: Uuid,
    pub recipient_account_number: String,
    #[schema(example = "40.00")]
    pub amount: String,
    pub message: String,
}

/// Initiate a transfer and send the OTP challenge
///
/// POST /api/v1/transfers/initiate
#[utoipa::path(
    post,
    path = "/api/v1/transfers/initiate",
    request_body = InitiateTransferRequest,
    responses(
        (status = 200, description = "Challenge issued", body = ApiResponse<InitiateTransferResponse>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Account or recipient not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn initiate_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<InitiateTransferRequest>,
) -> Result<Json<ApiResponse<InitiateTransferResponse>>, Rejection> {
    let request = TransferRequest {
        user_id: user_id_from(&claims),
        source_account_id: req.source_account_id,
        amount: req.amount,
        recipient: req.recipient,
        description: req.description,
    };
    let initiated = state
        .orchestrator
        .initiate(&request)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(InitiateTransferResponse {
        source_account_id: initiated.source_account_id,
        recipient_account_number: initiated.recipient_number,
        amount: money::format_amount(initiated.amount),
        message: "OTP sent for transfer verification".to_string(),
    })))
}

/// Execute a transfer with the delivered OTP
///
/// POST /api/v1/transfers/execute
#[utoipa::path(
    post,
    path = "/api/v1/transfers/execute",
    request_body = ExecuteTransferRequest,
    responses(
        (status = 200, description = "Transfer committed; source leg returned", body = ApiResponse<TransactionView>),
        (status = 400, description = "Invalid request or missing challenge"),
        (status = 401, description = "OTP mismatch"),
        (status = 409, description = "Concurrent modification, retry")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn execute_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ExecuteTransferRequest>,
) -> Result<Json<ApiResponse<TransactionView>>, Rejection> {
    let request = TransferRequest {
        user_id: user_id_from(&claims),
        source_account_id: req.source_account_id,
        amount: req.amount,
        recipient: req.recipient,
        description: req.description,
    };
    let record = state
        .orchestrator
        .execute(&request, &req.otp)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(TransactionView::from(&record))))
}

/// Legacy single-step transfer between own accounts; permanently gone
///
/// POST /api/v1/transfers/direct
#[utoipa::path(
    post,
    path = "/api/v1/transfers/direct",
    responses(
        (status = 410, description = "Use the initiate/execute OTP flow")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn direct_transfer(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
) -> Result<StatusCode, Rejection> {
    state.orchestrator.direct_transfer().map_err(reject)?;
    Ok(StatusCode::OK)
}

/// Legacy single-step transfer to another user; permanently gone
///
/// POST /api/v1/transfers/external-direct
#[utoipa::path(
    post,
    path = "/api/v1/transfers/external-direct",
    responses(
        (status = 410, description = "Use the initiate/execute OTP flow")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn external_direct_transfer(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
) -> Result<StatusCode, Rejection> {
    state.orchestrator.direct_transfer().map_err(reject)?;
    Ok(StatusCode::OK)
}
