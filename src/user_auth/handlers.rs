use axum::{Extension, Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::service::{
    AuthError, AuthResponse, Claims, LoginRequest, RegisterRequest, UpdateProfileRequest,
    UserProfile,
};
use crate::gateway::types::error_codes;
use crate::gateway::{state::AppState, types::ApiResponse};

type Rejection = (StatusCode, Json<ApiResponse<()>>);

fn auth_error_to_rejection(err: AuthError) -> Rejection {
    let (status, code) = match &err {
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
        AuthError::AdminVerificationFailed => (
            StatusCode::FORBIDDEN,
            error_codes::ADMIN_VERIFICATION_FAILED,
        ),
        AuthError::AlreadyRegistered => (StatusCode::CONFLICT, error_codes::INVALID_PARAMETER),
        AuthError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
        AuthError::Internal(e) => {
            tracing::error!("auth service error: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "Internal server error",
                )),
            );
        }
    };
    (status, Json(ApiResponse::<()>::error(code, err.to_string())))
}

pub(crate) fn user_id_from(claims: &Claims) -> i64 {
    claims.sub.parse::<i64>().unwrap_or_default()
}

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<i64>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin verification failed"),
        (status = 409, description = "Email or phone already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<i64>>), Rejection> {
    match state.user_auth.register(req).await {
        Ok(user_id) => Ok((StatusCode::CREATED, Json(ApiResponse::success(user_id)))),
        Err(e) => Err(auth_error_to_rejection(e)),
    }
}

/// Login user
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, Rejection> {
    match state.user_auth.login(req).await {
        Ok(resp) => Ok(Json(ApiResponse::success(resp))),
        Err(e @ AuthError::Internal(_)) => Err(auth_error_to_rejection(e)),
        Err(e) => {
            tracing::warn!("login failed: {}", e);
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error(
                    error_codes::AUTH_FAILED,
                    "Invalid email or password",
                )),
            ))
        }
    }
}

#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct VerifyAdminRequest {
    pub admin_password: String,
}

/// Check the operator credential without registering
///
/// POST /api/v1/auth/verify-admin
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-admin",
    request_body = VerifyAdminRequest,
    responses(
        (status = 200, description = "Credential accepted"),
        (status = 403, description = "Credential rejected")
    ),
    tag = "Auth"
)]
pub async fn verify_admin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyAdminRequest>,
) -> Result<Json<ApiResponse<()>>, Rejection> {
    if state.user_auth.verify_admin(&req.admin_password) {
        Ok(Json(ApiResponse::success(())))
    } else {
        Err(auth_error_to_rejection(AuthError::AdminVerificationFailed))
    }
}

/// Fetch the caller's profile
///
/// GET /api/v1/user/profile
#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    responses(
        (status = 200, description = "Profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserProfile>>, Rejection> {
    let user_id = user_id_from(&claims);
    match state.user_auth.get_profile(user_id).await {
        Ok(Some(profile)) => Ok(Json(ApiResponse::success(profile))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "User not found",
            )),
        )),
        Err(e) => Err(auth_error_to_rejection(AuthError::Internal(e))),
    }
}

/// Update the caller's profile
///
/// PUT /api/v1/user/profile
#[utoipa::path(
    put,
    path = "/api/v1/user/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Phone number already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, Rejection> {
    let user_id = user_id_from(&claims);
    match state.user_auth.update_profile(user_id, req).await {
        Ok(Some(profile)) => Ok(Json(ApiResponse::success(profile))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "User not found",
            )),
        )),
        Err(e) => Err(auth_error_to_rejection(e)),
    }
}
