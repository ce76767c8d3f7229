//! Two-phase transfer orchestration.
//!
//! Phase one (`initiate`) validates the request and issues an OTP challenge.
//! Phase two (`execute`) verifies the challenge, recomputes both balances
//! from fresh reads and commits everything in one store transaction. All
//! checks run again in phase two; initiation results are advisory only.

use std::sync::Arc;

use crate::account::{Account, AccountStore, BalanceWrite};
use crate::error::BankError;
use crate::ledger::{NewTransaction, TransactionKind, TransactionRecord};
use crate::money;
use crate::otp::{ChallengeDelivery, OtpChallengeManager};
use crate::transfer::types::{
    InitiatedTransfer, TransferRecipient, TransferRequest, TransferState,
};

/// Attempts per execution before a write conflict is surfaced to the caller.
const COMMIT_RETRIES: u32 = 3;

pub struct TransferOrchestrator {
    accounts: Arc<dyn AccountStore>,
    otp: OtpChallengeManager,
    delivery: Arc<dyn ChallengeDelivery>,
}

impl TransferOrchestrator {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        otp: OtpChallengeManager,
        delivery: Arc<dyn ChallengeDelivery>,
    ) -> Self {
        Self {
            accounts,
            otp,
            delivery,
        }
    }

    /// Validate a transfer request and issue the OTP challenge.
    pub async fn initiate(&self, req: &TransferRequest) -> Result<InitiatedTransfer, BankError> {
        tracing::info!(
            user_id = req.user_id,
            source = %req.source_account_id,
            state = TransferState::Requested.as_str(),
            "transfer requested"
        );

        let amount = money::parse_amount(&req.amount)?;

        if !self.otp.has_contact_channel(req.user_id).await? {
            return Err(BankError::NoContactChannel);
        }

        let source = self
            .accounts
            .fetch_owned(req.source_account_id, req.user_id)
            .await?;

        // Advisory funds check; the binding check happens at execution.
        if amount > source.balance {
            return Err(BankError::InsufficientFunds);
        }

        let recipient = self.resolve_recipient(req, &source).await?;

        tracing::info!(
            user_id = req.user_id,
            source = %source.account_number,
            recipient = %recipient.account_number,
            state = TransferState::Validated.as_str(),
            "transfer validated"
        );

        let code = self.otp.issue(req.user_id).await?;
        self.delivery.send_challenge(req.user_id, &code).await?;

        tracing::info!(
            user_id = req.user_id,
            state = TransferState::OtpIssued.as_str(),
            "transfer challenge issued"
        );

        Ok(InitiatedTransfer {
            source_account_id: source.account_id,
            recipient_number: recipient.account_number,
            amount,
        })
    }

    /// Verify the OTP and commit the transfer. Returns the source-side leg.
    pub async fn execute(
        &self,
        req: &TransferRequest,
        otp_code: &str,
    ) -> Result<TransactionRecord, BankError> {
        let amount = money::parse_amount(&req.amount)?;

        self.otp.verify(req.user_id, otp_code).await?;
        tracing::info!(
            user_id = req.user_id,
            state = TransferState::OtpVerified.as_str(),
            "transfer challenge verified"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_commit(req, amount).await {
                Ok(record) => {
                    tracing::info!(
                        user_id = req.user_id,
                        txn_id = %record.txn_id,
                        state = TransferState::Committed.as_str(),
                        "transfer committed"
                    );
                    return Ok(record);
                }
                Err(BankError::WriteConflict) if attempt < COMMIT_RETRIES => {
                    tracing::debug!(
                        user_id = req.user_id,
                        attempt,
                        "transfer commit lost a version race, retrying"
                    );
                }
                Err(err) => {
                    tracing::info!(
                        user_id = req.user_id,
                        state = TransferState::Rejected.as_str(),
                        error = %err,
                        "transfer rejected"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Direct transfers bypass the OTP challenge and are no longer served.
    pub fn direct_transfer(&self) -> Result<(), BankError> {
        Err(BankError::DeprecatedEndpoint)
    }

    /// One commit attempt against fresh reads of both accounts.
    async fn try_commit(
        &self,
        req: &TransferRequest,
        amount: rust_decimal::Decimal,
    ) -> Result<TransactionRecord, BankError> {
        let source = self
            .accounts
            .fetch_owned(req.source_account_id, req.user_id)
            .await?;
        let recipient = self.resolve_recipient(req, &source).await?;

        let debit_balance =
            money::compute_new_balance(source.balance, amount, TransactionKind::TransferOut)?;
        let credit_balance =
            money::compute_new_balance(recipient.balance, amount, TransactionKind::TransferIn)?;

        let label = req
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("Transfer");

        let out_leg = NewTransaction {
            account_id: source.account_id,
            user_id: source.user_id,
            kind: TransactionKind::TransferOut,
            amount,
            description: format!("{label} to account {}", recipient.account_number),
            related_account: Some(recipient.account_number.clone()),
            withdrawal_method: None,
            balance_after: debit_balance,
            transaction_date: None,
        };
        let in_leg = NewTransaction {
            account_id: recipient.account_id,
            user_id: recipient.user_id,
            kind: TransactionKind::TransferIn,
            amount,
            description: format!("{label} from account {}", source.account_number),
            related_account: Some(source.account_number.clone()),
            withdrawal_method: None,
            balance_after: credit_balance,
            transaction_date: None,
        };

        let (out_rec, _in_rec) = self
            .accounts
            .commit_transfer(
                &BalanceWrite {
                    account_id: source.account_id,
                    new_balance: debit_balance,
                    expected_version: source.version,
                },
                &BalanceWrite {
                    account_id: recipient.account_id,
                    new_balance: credit_balance,
                    expected_version: recipient.version,
                },
                out_leg,
                in_leg,
            )
            .await?;
        Ok(out_rec)
    }

    async fn resolve_recipient(
        &self,
        req: &TransferRequest,
        source: &Account,
    ) -> Result<Account, BankError> {
        let recipient = match &req.recipient {
            TransferRecipient::Internal { account_id } => {
                self.accounts.fetch_owned(*account_id, req.user_id).await?
            }
            TransferRecipient::External { account_number } => self
                .accounts
                .find_by_number(account_number)
                .await?
                .ok_or(BankError::RecipientNotFound)?,
        };
        if recipient.account_id == source.account_id {
            return Err(BankError::SelfTransfer);
        }
        Ok(recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::testkit::{CapturingDelivery, MemoryBank};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Fixture {
        bank: Arc<MemoryBank>,
        delivery: Arc<CapturingDelivery>,
        orchestrator: TransferOrchestrator,
    }

    fn fixture() -> Fixture {
        let bank = Arc::new(MemoryBank::new());
        let delivery = Arc::new(CapturingDelivery::default());
        let otp = OtpChallengeManager::new(bank.clone(), 10);
        let orchestrator = TransferOrchestrator::new(bank.clone(), otp, delivery.clone());
        Fixture {
            bank,
            delivery,
            orchestrator,
        }
    }

    fn external_req(user_id: i64, source: &Account, target: &Account, amount: &str) -> TransferRequest {
        TransferRequest {
            user_id,
            source_account_id: source.account_id,
            amount: amount.to_string(),
            recipient: TransferRecipient::External {
                account_number: target.account_number.clone(),
            },
            description: None,
        }
    }

    #[tokio::test]
    async fn full_flow_moves_money_and_writes_both_legs() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("100.00"));
        let dst = fx.bank.add_account(2, dec("0.00"));

        let mut req = external_req(1, &src, &dst, "40.00");
        req.description = Some("Rent".to_string());
        let initiated = fx.orchestrator.initiate(&req).await.unwrap();
        assert_eq!(initiated.amount, dec("40.00"));
        assert_eq!(initiated.recipient_number, dst.account_number);

        let code = fx.delivery.last_code_for(1).expect("challenge delivered");
        let out_rec = fx.orchestrator.execute(&req, &code).await.unwrap();

        assert_eq!(out_rec.kind, TransactionKind::TransferOut);
        assert_eq!(out_rec.amount, dec("40.00"));
        assert_eq!(out_rec.balance_after, dec("60.00"));
        assert_eq!(
            out_rec.related_account.as_deref(),
            Some(dst.account_number.as_str())
        );

        assert_eq!(fx.bank.balance_of(src.account_id), dec("60.00"));
        assert_eq!(fx.bank.balance_of(dst.account_id), dec("40.00"));

        let src_recs = fx.bank.records_for(src.account_id);
        let dst_recs = fx.bank.records_for(dst.account_id);
        assert_eq!(src_recs.len(), 1);
        assert_eq!(dst_recs.len(), 1);
        // the caller's label prefixes both legs
        assert_eq!(
            src_recs[0].description,
            format!("Rent to account {}", dst.account_number)
        );
        assert_eq!(
            dst_recs[0].description,
            format!("Rent from account {}", src.account_number)
        );
        assert_eq!(dst_recs[0].kind, TransactionKind::TransferIn);
        assert_eq!(dst_recs[0].balance_after, dec("40.00"));
        assert_eq!(
            dst_recs[0].related_account.as_deref(),
            Some(src.account_number.as_str())
        );
    }

    #[tokio::test]
    async fn internal_transfer_between_own_accounts() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("50.00"));
        let dst = fx.bank.add_account(1, dec("10.00"));

        let req = TransferRequest {
            user_id: 1,
            source_account_id: src.account_id,
            amount: "25.50".to_string(),
            recipient: TransferRecipient::Internal {
                account_id: dst.account_id,
            },
            description: None,
        };
        fx.orchestrator.initiate(&req).await.unwrap();
        let code = fx.delivery.last_code_for(1).unwrap();
        fx.orchestrator.execute(&req, &code).await.unwrap();

        assert_eq!(fx.bank.balance_of(src.account_id), dec("24.50"));
        assert_eq!(fx.bank.balance_of(dst.account_id), dec("35.50"));

        // absent description falls back to the default label
        let src_recs = fx.bank.records_for(src.account_id);
        assert_eq!(
            src_recs[0].description,
            format!("Transfer to account {}", dst.account_number)
        );
    }

    #[tokio::test]
    async fn self_transfer_is_rejected_before_any_challenge() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("100.00"));

        let req = external_req(1, &src, &src, "10.00");
        let res = fx.orchestrator.initiate(&req).await;
        assert!(matches!(res, Err(BankError::SelfTransfer)));
        assert!(fx.delivery.last_code_for(1).is_none());

        let req = TransferRequest {
            user_id: 1,
            source_account_id: src.account_id,
            amount: "10.00".to_string(),
            recipient: TransferRecipient::Internal {
                account_id: src.account_id,
            },
            description: None,
        };
        let res = fx.orchestrator.initiate(&req).await;
        assert!(matches!(res, Err(BankError::SelfTransfer)));
    }

    #[tokio::test]
    async fn initiation_rejects_obviously_bad_requests() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("20.00"));
        let dst = fx.bank.add_account(2, dec("0.00"));

        let res = fx
            .orchestrator
            .initiate(&external_req(1, &src, &dst, "20.01"))
            .await;
        assert!(matches!(res, Err(BankError::InsufficientFunds)));

        let res = fx
            .orchestrator
            .initiate(&external_req(1, &src, &dst, "-5"))
            .await;
        assert!(matches!(res, Err(BankError::InvalidAmount)));

        let mut req = external_req(1, &src, &dst, "5.00");
        req.recipient = TransferRecipient::External {
            account_number: "0000000000".to_string(),
        };
        let res = fx.orchestrator.initiate(&req).await;
        assert!(matches!(res, Err(BankError::RecipientNotFound)));

        // someone else's account as the source folds into not-found
        let res = fx
            .orchestrator
            .initiate(&external_req(2, &src, &dst, "5.00"))
            .await;
        assert!(matches!(res, Err(BankError::AccountNotFoundOrDenied)));
    }

    #[tokio::test]
    async fn missing_contact_channel_blocks_initiation() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("100.00"));
        let dst = fx.bank.add_account(2, dec("0.00"));
        fx.bank.remove_contact_channel(1);

        let res = fx
            .orchestrator
            .initiate(&external_req(1, &src, &dst, "10.00"))
            .await;
        assert!(matches!(res, Err(BankError::NoContactChannel)));
    }

    #[tokio::test]
    async fn execute_without_initiation_fails() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("100.00"));
        let dst = fx.bank.add_account(2, dec("0.00"));

        let req = external_req(1, &src, &dst, "10.00");
        let res = fx.orchestrator.execute(&req, "123456").await;
        assert!(matches!(res, Err(BankError::NoChallenge)));
        assert_eq!(fx.bank.balance_of(src.account_id), dec("100.00"));
    }

    #[tokio::test]
    async fn consumed_challenge_cannot_commit_twice() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("100.00"));
        let dst = fx.bank.add_account(2, dec("0.00"));

        let req = external_req(1, &src, &dst, "40.00");
        fx.orchestrator.initiate(&req).await.unwrap();
        let code = fx.delivery.last_code_for(1).unwrap();

        fx.orchestrator.execute(&req, &code).await.unwrap();
        let replay = fx.orchestrator.execute(&req, &code).await;
        assert!(matches!(replay, Err(BankError::NoChallenge)));

        // exactly one debit happened
        assert_eq!(fx.bank.balance_of(src.account_id), dec("60.00"));
        assert_eq!(fx.bank.records_for(src.account_id).len(), 1);
    }

    #[tokio::test]
    async fn wrong_code_leaves_balances_untouched() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("100.00"));
        let dst = fx.bank.add_account(2, dec("0.00"));

        let req = external_req(1, &src, &dst, "40.00");
        fx.orchestrator.initiate(&req).await.unwrap();
        let code = fx.delivery.last_code_for(1).unwrap();

        let wrong = if code == "000000" { "000001" } else { "000000" };
        let res = fx.orchestrator.execute(&req, wrong).await;
        assert!(matches!(res, Err(BankError::ChallengeMismatch)));
        assert_eq!(fx.bank.balance_of(src.account_id), dec("100.00"));

        // the real code still commits
        fx.orchestrator.execute(&req, &code).await.unwrap();
        assert_eq!(fx.bank.balance_of(src.account_id), dec("60.00"));
    }

    #[tokio::test]
    async fn funds_rechecked_at_execution_time() {
        let fx = fixture();
        let src = fx.bank.add_account(1, dec("100.00"));
        let dst = fx.bank.add_account(2, dec("0.00"));

        let req = external_req(1, &src, &dst, "80.00");
        fx.orchestrator.initiate(&req).await.unwrap();
        let code = fx.delivery.last_code_for(1).unwrap();

        // balance drops between initiation and execution
        fx.bank
            .write_balance(&BalanceWrite {
                account_id: src.account_id,
                new_balance: dec("50.00"),
                expected_version: src.version,
            })
            .await
            .unwrap();

        let res = fx.orchestrator.execute(&req, &code).await;
        assert!(matches!(res, Err(BankError::InsufficientFunds)));
        assert_eq!(fx.bank.balance_of(src.account_id), dec("50.00"));
        assert_eq!(fx.bank.balance_of(dst.account_id), dec("0.00"));
    }

    #[tokio::test]
    async fn direct_transfer_is_deprecated() {
        let fx = fixture();
        assert!(matches!(
            fx.orchestrator.direct_transfer(),
            Err(BankError::DeprecatedEndpoint)
        ));
    }
}
