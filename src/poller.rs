//! Bounded status polling.
//!
//! Drives an operation record to a terminal state by querying the relayer at
//! a fixed interval. Confirmation latency on a public chain is unbounded, so
//! exhausting the attempt budget is a soft `TimedOut`, never an error. The
//! loop owns a cancellation token and is independent of any UI lifetime;
//! status reads are idempotent, so an abandoned poll has no side effects.

use alloy_primitives::{Address, B256};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollPolicy;
use crate::reconcile::link_hashes;
use crate::rest::relayer::RelayerClient;
use crate::types::{OperationRecord, OperationStatus, QueryStatus, TerminalStatus};

/// Poll until the operation reaches a terminal state or the attempt budget
/// runs out.
///
/// Per tick the current primary hash is queried; the alias (backend) hash is
/// consulted over a fixed `[primary, alias]` order — on `unknown` it is
/// probed once in the same tick, and on `failed` it is promoted to primary
/// exactly once before a failure is accepted.
pub async fn poll_until_terminal(
    relayer: &RelayerClient,
    record: &mut OperationRecord,
    sender: Address,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> TerminalStatus {
    let mut primary = record.frontend_hash;
    let mut alias_promoted = false;

    for attempt in 0..policy.max_attempts {
        if cancel.is_cancelled() {
            info!(hash = %primary, "poll cancelled");
            record.advance(OperationStatus::TimedOut);
            return TerminalStatus::TimedOut;
        }

        match query(relayer, primary).await {
            Some((QueryStatus::Success, tx_hash, _)) => {
                record.tx_hash = tx_hash.or(record.tx_hash);
                record.advance(OperationStatus::Success);
                info!(hash = %primary, tx_hash = ?record.tx_hash, "operation confirmed");
                return TerminalStatus::Success {
                    tx_hash: record.tx_hash,
                };
            }
            Some((QueryStatus::Failed, _, message)) => {
                // A relayer-side failure on one identifier can be stale when
                // the hashes diverged; retry once through the alias before
                // accepting it.
                if let Some(alias) = alias_of(record, primary) {
                    if !alias_promoted {
                        warn!(hash = %primary, alias = %alias, "failed status, retrying via alias hash");
                        alias_promoted = true;
                        primary = alias;
                        continue;
                    }
                }
                record.advance(OperationStatus::Failed);
                warn!(hash = %primary, message = ?message, "operation failed");
                return TerminalStatus::Failed { message };
            }
            Some((QueryStatus::Pending, _, _)) => {
                record.advance(OperationStatus::Pending);
                if !record.linked && record.backend_hash.is_some() {
                    // Opportunistic: link failures stay non-fatal and are
                    // retried on the next pending tick.
                    let _ = link_hashes(relayer, record, sender).await;
                }
            }
            Some((QueryStatus::Unknown, _, _)) => {
                if let Some(alias) = alias_of(record, primary) {
                    match query(relayer, alias).await {
                        Some((QueryStatus::Success, tx_hash, _)) => {
                            record.tx_hash = tx_hash.or(record.tx_hash);
                            record.advance(OperationStatus::Success);
                            info!(hash = %alias, tx_hash = ?record.tx_hash, "operation confirmed via alias");
                            return TerminalStatus::Success {
                                tx_hash: record.tx_hash,
                            };
                        }
                        Some((QueryStatus::Pending, _, _)) => {
                            record.advance(OperationStatus::Pending);
                        }
                        _ => {}
                    }
                }
            }
            // Transport errors count against the attempt budget like any
            // other non-terminal tick.
            None => {}
        }

        debug!(hash = %primary, attempt, "operation not yet terminal");
        if attempt + 1 < policy.max_attempts {
            tokio::select! {
                _ = sleep(policy.interval) => {}
                _ = cancel.cancelled() => {}
            }
        }
    }

    info!(hash = %primary, attempts = policy.max_attempts, "poll budget exhausted");
    record.advance(OperationStatus::TimedOut);
    TerminalStatus::TimedOut
}

/// The other identifier of the operation, when one exists and differs.
fn alias_of(record: &OperationRecord, primary: B256) -> Option<B256> {
    [record.frontend_hash]
        .into_iter()
        .chain(record.backend_hash)
        .find(|h| *h != primary)
}

async fn query(
    relayer: &RelayerClient,
    hash: B256,
) -> Option<(QueryStatus, Option<B256>, Option<String>)> {
    match relayer.check_status(hash).await {
        Ok(resp) => Some((resp.status, resp.tx_hash, resp.message)),
        Err(e) => {
            warn!(hash = %hash, error = %e, "status query failed");
            None
        }
    }
}
