//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{AccountType, AccountView};
use crate::gateway::handlers::HealthResponse;
use crate::gateway::handlers::account::{CreateAccountRequest, RenameAccountRequest};
use crate::gateway::handlers::transaction::{DepositRequest, WithdrawalRequest};
use crate::gateway::handlers::transfer::{
    ExecuteTransferRequest, InitiateTransferRequest, InitiateTransferResponse,
};
use crate::ledger::{TransactionKind, TransactionView};
use crate::transfer::TransferRecipient;
use crate::user_auth::handlers::VerifyAdminRequest;
use crate::user_auth::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, UserProfile,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FerroBank API",
        version = "1.0.0",
        description = "Demo banking backend: accounts, deposits, withdrawals and OTP-verified transfers."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        // Auth
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::verify_admin,
        crate::user_auth::handlers::get_profile,
        crate::user_auth::handlers::update_profile,
        // Accounts
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::list_accounts,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::rename_account,
        crate::gateway::handlers::account::delete_account,
        // Transactions
        crate::gateway::handlers::transaction::deposit,
        crate::gateway::handlers::transaction::withdraw,
        crate::gateway::handlers::transaction::account_history,
        crate::gateway::handlers::transaction::user_history,
        // Transfers
        crate::gateway::handlers::transfer::initiate_transfer,
        crate::gateway::handlers::transfer::execute_transfer,
        crate::gateway::handlers::transfer::direct_transfer,
        crate::gateway::handlers::transfer::external_direct_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            VerifyAdminRequest,
            AuthResponse,
            UserProfile,
            UpdateProfileRequest,
            AccountType,
            AccountView,
            CreateAccountRequest,
            RenameAccountRequest,
            DepositRequest,
            WithdrawalRequest,
            TransactionKind,
            TransactionView,
            TransferRecipient,
            InitiateTransferRequest,
            ExecuteTransferRequest,
            InitiateTransferResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Service health"),
        (name = "Auth", description = "Registration and login"),
        (name = "User", description = "Profile management"),
        (name = "Accounts", description = "Account lifecycle"),
        (name = "Transactions", description = "Deposits, withdrawals and history"),
        (name = "Transfers", description = "OTP-verified transfers")
    )
)]
pub struct ApiDoc;
