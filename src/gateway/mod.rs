//! HTTP gateway: routing, auth middleware and the server loop.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::user_auth::middleware::jwt_auth_middleware;
use state::AppState;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(crate::user_auth::handlers::register))
        .route("/login", post(crate::user_auth::handlers::login))
        .route(
            "/verify-admin",
            post(crate::user_auth::handlers::verify_admin),
        );

    let user_routes = Router::new()
        .route("/profile", get(crate::user_auth::handlers::get_profile))
        .route("/profile", put(crate::user_auth::handlers::update_profile))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let account_routes = Router::new()
        .route("/", post(handlers::account::create_account))
        .route("/", get(handlers::account::list_accounts))
        .route("/{account_id}", get(handlers::account::get_account))
        .route(
            "/{account_id}/rename",
            put(handlers::account::rename_account),
        )
        .route("/{account_id}", delete(handlers::account::delete_account))
        .route(
            "/{account_id}/deposits",
            post(handlers::transaction::deposit),
        )
        .route(
            "/{account_id}/withdrawals",
            post(handlers::transaction::withdraw),
        )
        .route(
            "/{account_id}/transactions",
            get(handlers::transaction::account_history),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let transaction_routes = Router::new()
        .route("/", get(handlers::transaction::user_history))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let transfer_routes = Router::new()
        .route("/initiate", post(handlers::transfer::initiate_transfer))
        .route("/execute", post(handlers::transfer::execute_transfer))
        // Deprecated single-step endpoints, kept to answer 410
        .route("/direct", post(handlers::transfer::direct_transfer))
        .route(
            "/external-direct",
            post(handlers::transfer::external_direct_transfer),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/user", user_routes)
        .nest("/api/v1/accounts", account_routes)
        .nest("/api/v1/transactions", transaction_routes)
        .nest("/api/v1/transfers", transfer_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway server.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!("gateway listening on http://{}", addr);
    tracing::info!("api docs at http://{}/docs", addr);

    axum::serve(listener, app).await.context("server error")
}
