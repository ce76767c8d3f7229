//! FerroBank - Demo Banking Backend
//!
//! Entry point: load config, set up logging, connect PostgreSQL, wire the
//! stores and services, then serve the HTTP gateway.

use std::sync::Arc;

use anyhow::{Context, Result};

use ferrobank::account::PgAccountStore;
use ferrobank::config::AppConfig;
use ferrobank::db::Database;
use ferrobank::gateway::{self, state::AppState};
use ferrobank::ledger::PgTransactionLog;
use ferrobank::logging::init_logging;
use ferrobank::otp::{OtpChallengeManager, PgChallengeStore, TracingDelivery};
use ferrobank::transfer::TransferOrchestrator;
use ferrobank::user_auth::UserAuthService;

#[tokio::main]
async fn main() -> Result<()> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = AppConfig::load(&env);

    // Guard must stay alive for the duration of the process
    let _guard = init_logging(&config);
    tracing::info!(env = %env, build = env!("GIT_HASH"), "starting ferrobank");

    let db = Arc::new(
        Database::connect(&config.postgres_url, &config.database)
            .await
            .context("failed to connect to PostgreSQL")?,
    );
    let pool = db.pool().clone();

    let accounts = Arc::new(PgAccountStore::new(pool.clone()));
    let ledger = Arc::new(PgTransactionLog::new(pool.clone()));
    let challenges = Arc::new(PgChallengeStore::new(pool.clone()));

    let otp = OtpChallengeManager::new(challenges, config.otp.expiry_minutes);
    let orchestrator = Arc::new(TransferOrchestrator::new(
        accounts.clone(),
        otp,
        Arc::new(TracingDelivery),
    ));

    let user_auth = Arc::new(UserAuthService::new(
        pool,
        config.jwt_secret.clone(),
        config.admin_password.clone(),
    ));

    let state = Arc::new(AppState::new(
        db,
        accounts,
        ledger,
        orchestrator,
        user_auth,
    ));

    gateway::run_server(&config.gateway, state).await
}
