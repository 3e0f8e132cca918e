//! Operation submission: direct EntryPoint call first, relayer fallback.
//!
//! The direct path bundles the single operation into `handleOps` and pays
//! gas from the funded signer; it bypasses the relayer entirely and returns
//! as soon as one confirmation lands. Any direct failure degrades to the
//! relayer, whose own hash may legitimately differ from the one the
//! signature covers.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::TxPolicy;
use crate::contracts::handleOpsCall;
use crate::error::{HluError, Result};
use crate::operation::UserOperation;
use crate::rest::relayer::RelayerClient;
use crate::rpc::RpcProvider;
use crate::tx::FundedSigner;

/// Which route carried the operation on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPath {
    Direct,
    Relayer,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub path: SubmissionPath,
    /// Transaction hash, when the carrying transaction is already known.
    pub tx_hash: Option<B256>,
    /// The relayer's identifier for the operation, when it differs from or
    /// echoes the computed hash. `None` on the direct path.
    pub relayer_hash: Option<B256>,
}

/// Submit a signed operation, trying the direct path first.
///
/// # Errors
///
/// Returns [`HluError::HashMismatch`] if the operation lacks its computed
/// hash, and [`HluError::Submission`] (with the action kind and sender)
/// when both paths fail.
#[allow(clippy::too_many_arguments)]
pub async fn submit_operation(
    rpc: &RpcProvider,
    relayer: &RelayerClient,
    funded: Option<&FundedSigner>,
    entry_point: Address,
    chain_id: u64,
    tx_policy: &TxPolicy,
    op: &UserOperation,
    action: &'static str,
) -> Result<SubmissionResult> {
    let computed_hash = op.computed_hash.ok_or_else(|| HluError::HashMismatch {
        sender: op.sender,
        message: "operation submitted without its computed hash".into(),
    })?;

    let direct_err = match submit_direct(rpc, funded, entry_point, chain_id, tx_policy, op).await {
        Ok(tx_hash) => {
            info!(sender = %op.sender, %tx_hash, "direct submission confirmed");
            return Ok(SubmissionResult {
                path: SubmissionPath::Direct,
                tx_hash: Some(tx_hash),
                relayer_hash: None,
            });
        }
        Err(e) => e,
    };

    warn!(
        action,
        sender = %op.sender,
        error = %direct_err,
        "direct submission failed, falling back to relayer"
    );

    match relayer.submit(op, computed_hash).await {
        Ok(resp) => {
            let relayer_hash = resp.backend_hash.or(resp.user_op_hash);
            info!(
                sender = %op.sender,
                tx_hash = ?resp.tx_hash,
                relayer_hash = ?relayer_hash,
                "relayer accepted operation"
            );
            Ok(SubmissionResult {
                path: SubmissionPath::Relayer,
                tx_hash: resp.tx_hash,
                relayer_hash,
            })
        }
        Err(relayer_err) => Err(HluError::Submission {
            action,
            sender: op.sender,
            direct: direct_err.to_string(),
            relayer: relayer_err.to_string(),
        }),
    }
}

/// Execute `handleOps([op], beneficiary)` from the funded signer and wait
/// for one confirmation. The funded signer is also the beneficiary of the
/// gas refund.
async fn submit_direct(
    rpc: &RpcProvider,
    funded: Option<&FundedSigner>,
    entry_point: Address,
    chain_id: u64,
    policy: &TxPolicy,
    op: &UserOperation,
) -> Result<B256> {
    let signer = funded.ok_or_else(|| HluError::Validation("no funded signer configured".into()))?;

    let call_data = handleOpsCall {
        ops: vec![op.as_sol()],
        beneficiary: signer.address(),
    }
    .abi_encode();

    let nonce = rpc.transaction_count(signer.address()).await?;
    let raw = signer.sign_transaction(
        nonce,
        entry_point,
        U256::ZERO,
        &call_data.into(),
        chain_id,
        policy,
    )?;

    let tx_hash = rpc.send_raw_transaction(&raw.bytes).await?;
    debug!(%tx_hash, "handleOps transaction sent, awaiting confirmation");

    wait_for_receipt(rpc, tx_hash, policy).await?;
    Ok(tx_hash)
}

/// Poll for a mined receipt at a fixed interval, bounded by the policy.
async fn wait_for_receipt(rpc: &RpcProvider, tx_hash: B256, policy: &TxPolicy) -> Result<()> {
    for attempt in 0..policy.receipt_attempts {
        if let Some(receipt) = rpc.transaction_receipt(tx_hash).await? {
            if receipt.is_success() {
                return Ok(());
            }
            return Err(HluError::Validation(format!(
                "transaction {tx_hash} reverted"
            )));
        }
        debug!(%tx_hash, attempt, "receipt not yet available");
        sleep(policy.receipt_interval).await;
    }
    Err(HluError::Validation(format!(
        "transaction {tx_hash} unconfirmed after {} probes",
        policy.receipt_attempts
    )))
}
