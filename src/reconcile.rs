//! Linking of divergent operation hashes.
//!
//! The relayer may normalize an operation and derive its own hash; the link
//! call records that both identifiers name one logical operation, after
//! which either may drive status queries. Linking is idempotent and its
//! failure is never fatal — the poller retries it opportunistically on
//! later pending ticks.

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::error::{HluError, Result};
use crate::rest::relayer::RelayerClient;
use crate::types::OperationRecord;

/// Link the record's frontend and backend hashes at the relayer.
///
/// Call only when the hashes actually diverge. Marks the record linked on
/// success. Returns [`HluError::Link`] on failure; callers log and move on.
pub async fn link_hashes(
    relayer: &RelayerClient,
    record: &mut OperationRecord,
    sender: Address,
) -> Result<bool> {
    let backend = match record.backend_hash {
        Some(h) if h != record.frontend_hash => h,
        _ => return Ok(record.linked),
    };

    if record.linked {
        debug!(frontend = %record.frontend_hash, backend = %backend, "hashes already linked");
        return Ok(true);
    }

    match relayer
        .link_hashes(record.frontend_hash, backend, sender)
        .await
    {
        Ok(resp) if resp.success => {
            debug!(frontend = %record.frontend_hash, backend = %backend, "hashes linked");
            record.linked = true;
            Ok(true)
        }
        Ok(_) => {
            warn!(frontend = %record.frontend_hash, backend = %backend, "relayer declined hash link");
            Err(HluError::Link("relayer declined hash link".into()))
        }
        Err(e) => {
            warn!(
                frontend = %record.frontend_hash,
                backend = %backend,
                error = %e,
                "hash link failed"
            );
            Err(HluError::Link(e.to_string()))
        }
    }
}
