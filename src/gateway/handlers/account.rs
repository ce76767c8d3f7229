//! Account management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::account::models::NICKNAME_MAX_LEN;
use crate::account::{AccountType, AccountView};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, Rejection, error_codes, reject};
use crate::user_auth::Claims;
use crate::user_auth::handlers::user_id_from;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    pub account_type: AccountType,
    #[schema(example = "Rent")]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameAccountRequest {
    /// New nickname; null clears it
    pub nickname: Option<String>,
}

fn validate_nickname(nickname: &Option<String>) -> Result<(), Rejection> {
    if let Some(nick) = nickname {
        if nick.trim().is_empty() || nick.len() > NICKNAME_MAX_LEN {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    error_codes::INVALID_PARAMETER,
                    format!("Nickname must be 1-{NICKNAME_MAX_LEN} characters"),
                )),
            ));
        }
    }
    Ok(())
}

/// Open a new account
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AccountView>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountView>>), Rejection> {
    validate_nickname(&req.nickname)?;
    let account = state
        .accounts
        .create(user_id_from(&claims), req.account_type, req.nickname)
        .await
        .map_err(reject)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AccountView::from(&account))),
    ))
}

/// List the caller's accounts
///
/// GET /api/v1/accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Accounts", body = ApiResponse<Vec<AccountView>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<AccountView>>>, Rejection> {
    let accounts = state
        .accounts
        .list_for_user(user_id_from(&claims))
        .await
        .map_err(reject)?;
    let views: Vec<AccountView> = accounts.iter().map(AccountView::from).collect();
    Ok(Json(ApiResponse::success(views)))
}

/// Fetch one of the caller's accounts
///
/// GET /api/v1/accounts/{account_id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    params(("account_id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = ApiResponse<AccountView>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found or access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccountView>>, Rejection> {
    let account = state
        .accounts
        .fetch_owned(account_id, user_id_from(&claims))
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(AccountView::from(&account))))
}

/// Rename an account
///
/// PUT /api/v1/accounts/{account_id}/rename
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{account_id}/rename",
    params(("account_id" = Uuid, Path, description = "Account id")),
    request_body = RenameAccountRequest,
    responses(
        (status = 200, description = "Renamed account", body = ApiResponse<AccountView>),
        (status = 400, description = "Invalid nickname"),
        (status = 404, description = "Account not found or access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn rename_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<Uuid>,
    Json(req): Json<RenameAccountRequest>,
) -> Result<Json<ApiResponse<AccountView>>, Rejection> {
    validate_nickname(&req.nickname)?;
    let account = state
        .accounts
        .rename(account_id, user_id_from(&claims), req.nickname)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(AccountView::from(&account))))
}

/// Close an account
///
/// DELETE /api/v1/accounts/{account_id}
///
/// Only zero-balance accounts can be closed; the transaction history goes
/// with the account.
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{account_id}",
    params(("account_id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 404, description = "Account not found or access denied"),
        (status = 409, description = "Balance is not zero")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, Rejection> {
    state
        .accounts
        .delete_with_cascade(account_id, user_id_from(&claims))
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(())))
}
