//! Deposits, withdrawals and transaction history.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::account::BalanceWrite;
use crate::error::BankError;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, Rejection, reject};
use crate::ledger::{NewTransaction, TransactionKind, TransactionView};
use crate::money;
use crate::user_auth::Claims;
use crate::user_auth::handlers::user_id_from;

/// Attempts per cash operation before a version race is surfaced.
const WRITE_RETRIES: u32 = 3;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    #[schema(example = "25.00")]
    pub amount: String,
    pub description: Option<String>,
    /// Optional value date override
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawalRequest {
    #[schema(example = "25.00")]
    pub amount: String,
    pub description: Option<String>,
    #[schema(example = "ATM")]
    pub withdrawal_method: Option<String>,
    /// Optional value date override
    pub transaction_date: Option<DateTime<Utc>>,
}

struct CashOperation {
    kind: TransactionKind,
    amount: String,
    description: String,
    withdrawal_method: Option<String>,
    transaction_date: Option<DateTime<Utc>>,
}

/// Apply a single-account balance change and log it.
///
/// The CAS write and the ledger append are separate statements; a lost
/// version race re-reads the account and recomputes before retrying.
async fn apply_cash_operation(
    state: &AppState,
    user_id: i64,
    account_id: Uuid,
    op: CashOperation,
) -> Result<TransactionView, BankError> {
    let amount = money::parse_amount(&op.amount)?;

    let mut attempt = 0;
    loop {
        attempt += 1;
        let account = state.accounts.fetch_owned(account_id, user_id).await?;
        let new_balance = money::compute_new_balance(account.balance, amount, op.kind)?;

        let write = BalanceWrite {
            account_id,
            new_balance,
            expected_version: account.version,
        };
        match state.accounts.write_balance(&write).await {
            Ok(()) => {
                let record = state
                    .ledger
                    .append(NewTransaction {
                        account_id,
                        user_id,
                        kind: op.kind,
                        amount,
                        description: op.description,
                        related_account: None,
                        withdrawal_method: op.withdrawal_method,
                        balance_after: new_balance,
                        transaction_date: op.transaction_date,
                    })
                    .await?;
                return Ok(TransactionView::from(&record));
            }
            Err(BankError::WriteConflict) if attempt < WRITE_RETRIES => {
                tracing::debug!(%account_id, attempt, "balance write lost a version race, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

/// Deposit into an account
///
/// POST /api/v1/accounts/{account_id}/deposits
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{account_id}/deposits",
    params(("account_id" = Uuid, Path, description = "Account id")),
    request_body = DepositRequest,
    responses(
        (status = 201, description = "Deposit recorded", body = ApiResponse<TransactionView>),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Account not found or access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<Uuid>,
    Json(req): Json<DepositRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), Rejection> {
    let view = apply_cash_operation(
        &state,
        user_id_from(&claims),
        account_id,
        CashOperation {
            kind: TransactionKind::Deposit,
            amount: req.amount,
            description: req.description.unwrap_or_else(|| "Deposit".to_string()),
            withdrawal_method: None,
            transaction_date: req.transaction_date,
        },
    )
    .await
    .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

/// Withdraw from an account
///
/// POST /api/v1/accounts/{account_id}/withdrawals
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{account_id}/withdrawals",
    params(("account_id" = Uuid, Path, description = "Account id")),
    request_body = WithdrawalRequest,
    responses(
        (status = 201, description = "Withdrawal recorded", body = ApiResponse<TransactionView>),
        (status = 400, description = "Invalid amount or insufficient funds"),
        (status = 404, description = "Account not found or access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<Uuid>,
    Json(req): Json<WithdrawalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), Rejection> {
    let view = apply_cash_operation(
        &state,
        user_id_from(&claims),
        account_id,
        CashOperation {
            kind: TransactionKind::Withdrawal,
            amount: req.amount,
            description: req.description.unwrap_or_else(|| "Withdrawal".to_string()),
            withdrawal_method: req.withdrawal_method,
            transaction_date: req.transaction_date,
        },
    )
    .await
    .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

/// Transaction history for one account
///
/// GET /api/v1/accounts/{account_id}/transactions
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/transactions",
    params(("account_id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Transactions, newest first", body = ApiResponse<Vec<TransactionView>>),
        (status = 404, description = "Account not found or access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn account_history(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, Rejection> {
    // Ownership check first so histories of foreign accounts stay invisible.
    state
        .accounts
        .fetch_owned(account_id, user_id_from(&claims))
        .await
        .map_err(reject)?;
    let records = state.ledger.for_account(account_id).await.map_err(reject)?;
    let views: Vec<TransactionView> = records.iter().map(TransactionView::from).collect();
    Ok(Json(ApiResponse::success(views)))
}

/// Transaction history across all of the caller's accounts
///
/// GET /api/v1/transactions
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    responses(
        (status = 200, description = "Transactions, newest first", body = ApiResponse<Vec<TransactionView>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn user_history(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, Rejection> {
    let records = state
        .ledger
        .for_user(user_id_from(&claims))
        .await
        .map_err(reject)?;
    let views: Vec<TransactionView> = records.iter().map(TransactionView::from).collect();
    Ok(Json(ApiResponse::success(views)))
}
