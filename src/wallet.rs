//! Per-user wallet handle driving the end-to-end operation flow.
//!
//! `HluWallet` owns the session-key cache for one `(account, wallet)` pair
//! and runs each action through encode → build → sign → submit → reconcile
//! → poll. Batches run strictly sequentially with a fixed inter-operation
//! delay: nonce assignment is not transactionally reserved, so concurrent
//! submissions from the same sender would race on the same nonce.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actions::{encode_call_data, ElectionAction};
use crate::client::Hlu;
use crate::error::Result;
use crate::operation::build_operation;
use crate::poller::poll_until_terminal;
use crate::reconcile::link_hashes;
use crate::session::{SessionKey, SessionKeyManager};
use crate::signing::sign_operation;
use crate::submit::{submit_operation, SubmissionPath};
use crate::types::{OperationRecord, OperationStatus, TerminalStatus};

/// Result of driving one action to rest.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub record: OperationRecord,
    pub terminal: TerminalStatus,
    pub path: SubmissionPath,
}

/// Wallet handle for one platform account.
pub struct HluWallet {
    pub hlu: Arc<Hlu>,
    pub account_id: u64,
    pub wallet_id: u64,
    sessions: SessionKeyManager,
}

impl HluWallet {
    pub fn new(hlu: Arc<Hlu>, account_id: u64, wallet_id: u64) -> Self {
        let sessions = SessionKeyManager::new(hlu.api.clone());
        Self {
            hlu,
            account_id,
            wallet_id,
            sessions,
        }
    }

    /// The current session key (cached or freshly issued).
    pub async fn session(&self) -> Result<SessionKey> {
        self.sessions
            .get_or_create(self.account_id, self.wallet_id)
            .await
    }

    /// Run one action to a terminal state.
    pub async fn execute(
        &self,
        action: ElectionAction,
        manager: Address,
    ) -> Result<OperationOutcome> {
        self.execute_with_cancel(action, manager, CancellationToken::new())
            .await
    }

    /// Run one action to a terminal state, abandoning the status poll when
    /// `cancel` fires (the poll then resolves to `TimedOut`; status reads
    /// are idempotent, so nothing is left half-done).
    pub async fn execute_with_cancel(
        &self,
        action: ElectionAction,
        manager: Address,
        cancel: CancellationToken,
    ) -> Result<OperationOutcome> {
        let kind = action.kind();
        let addresses = self.hlu.addresses;

        let key = self.session().await?;
        let call_data = encode_call_data(&action, manager)?;

        let mut op = build_operation(
            &self.hlu.rpc,
            addresses.entry_point,
            key.scw_address,
            call_data,
            addresses.paymaster,
            &self.hlu.config.gas,
        )
        .await?;

        let frontend_hash = sign_operation(
            &self.hlu.rpc,
            addresses.entry_point,
            &mut op,
            &key,
        )
        .await?;

        let mut record = OperationRecord::new(frontend_hash);
        record.advance(OperationStatus::Signed);
        info!(action = kind, sender = %op.sender, hash = %frontend_hash, "operation signed");

        let submission = submit_operation(
            &self.hlu.rpc,
            &self.hlu.relayer,
            self.hlu.funded_signer(),
            addresses.entry_point,
            addresses.chain_id,
            &self.hlu.config.tx,
            &op,
            kind,
        )
        .await?;

        record.advance(OperationStatus::Submitted);
        record.tx_hash = submission.tx_hash;

        if submission.path == SubmissionPath::Direct {
            // The direct path already waited for a confirmation; the relayer
            // never saw this operation, so there is nothing to poll.
            record.advance(OperationStatus::Success);
            return Ok(OperationOutcome {
                terminal: TerminalStatus::Success {
                    tx_hash: record.tx_hash,
                },
                record,
                path: SubmissionPath::Direct,
            });
        }

        if let Some(remote) = submission.relayer_hash {
            if remote != frontend_hash {
                record.backend_hash = Some(remote);
                // Best effort; the poller retries on later pending ticks.
                let _ = link_hashes(&self.hlu.relayer, &mut record, key.scw_address).await;
            }
        }

        record.advance(OperationStatus::Pending);
        let terminal = poll_until_terminal(
            &self.hlu.relayer,
            &mut record,
            key.scw_address,
            &self.hlu.config.poll,
            &cancel,
        )
        .await;

        Ok(OperationOutcome {
            record,
            terminal,
            path: SubmissionPath::Relayer,
        })
    }

    /// Run a batch of actions sequentially with the configured
    /// inter-operation delay. Each action fails or succeeds on its own; one
    /// failure does not abort the rest.
    pub async fn execute_batch(
        &self,
        actions: Vec<ElectionAction>,
        manager: Address,
    ) -> Vec<Result<OperationOutcome>> {
        let mut outcomes = Vec::with_capacity(actions.len());
        let total = actions.len();

        for (i, action) in actions.into_iter().enumerate() {
            let kind = action.kind();
            info!(action = kind, index = i, total, "batch step");
            outcomes.push(self.execute(action, manager).await);

            if i + 1 < total {
                sleep(self.hlu.config.batch_delay).await;
            }
        }
        outcomes
    }
}
