use std::sync::Arc;

use crate::account::AccountStore;
use crate::db::Database;
use crate::ledger::TransactionLog;
use crate::transfer::TransferOrchestrator;
use crate::user_auth::UserAuthService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub accounts: Arc<dyn AccountStore>,
    pub ledger: Arc<dyn TransactionLog>,
    pub orchestrator: Arc<TransferOrchestrator>,
    pub user_auth: Arc<UserAuthService>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        accounts: Arc<dyn AccountStore>,
        ledger: Arc<dyn TransactionLog>,
        orchestrator: Arc<TransferOrchestrator>,
        user_auth: Arc<UserAuthService>,
    ) -> Self {
        Self {
            db,
            accounts,
            ledger,
            orchestrator,
            user_auth,
        }
    }
}
