//! OTP-authorized money transfers.

pub mod orchestrator;
pub mod types;

pub use orchestrator::TransferOrchestrator;
pub use types::{InitiatedTransfer, TransferRecipient, TransferRequest, TransferState};
