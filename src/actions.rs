//! Typed election actions and their call-data encoding.
//!
//! Each action maps to one inner election-manager call, wrapped in the
//! smart-contract-wallet `execute(manager, 0, inner)` envelope. Encoding is
//! pure and deterministic: identical actions produce byte-identical output.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

use crate::contracts::{batDauPhienBauCuCall, executeCall, taoPhienBauCuCall, themCuTriCall, themUngVienCall};
use crate::error::{HluError, Result};

/// A privileged election action performed through the SCW.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElectionAction {
    CreateSession {
        election_id: u64,
        duration_seconds: u64,
        max_voters: u64,
    },
    AddVoter {
        election_id: u64,
        session_id: u64,
        voter: Address,
    },
    AddCandidate {
        election_id: u64,
        session_id: u64,
        candidate: Address,
    },
    StartSession {
        election_id: u64,
        session_id: u64,
        duration_seconds: u64,
    },
}

impl ElectionAction {
    /// Stable kind label used in logs and error context.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateSession { .. } => "create-session",
            Self::AddVoter { .. } => "add-voter",
            Self::AddCandidate { .. } => "add-candidate",
            Self::StartSession { .. } => "start-session",
        }
    }

    /// ABI-encode the inner election-manager call for this action.
    pub fn inner_call_data(&self) -> Vec<u8> {
        match *self {
            Self::CreateSession {
                election_id,
                duration_seconds,
                max_voters,
            } => taoPhienBauCuCall {
                electionId: U256::from(election_id),
                durationSeconds: U256::from(duration_seconds),
                maxVoters: U256::from(max_voters),
            }
            .abi_encode(),
            Self::AddVoter {
                election_id,
                session_id,
                voter,
            } => themCuTriCall {
                electionId: U256::from(election_id),
                sessionId: U256::from(session_id),
                voter,
            }
            .abi_encode(),
            Self::AddCandidate {
                election_id,
                session_id,
                candidate,
            } => themUngVienCall {
                electionId: U256::from(election_id),
                sessionId: U256::from(session_id),
                candidate,
            }
            .abi_encode(),
            Self::StartSession {
                election_id,
                session_id,
                duration_seconds,
            } => batDauPhienBauCuCall {
                electionId: U256::from(election_id),
                sessionId: U256::from(session_id),
                durationSeconds: U256::from(duration_seconds),
            }
            .abi_encode(),
        }
    }
}

/// Encode an action as SCW call data: `execute(manager, 0, inner)`.
///
/// # Errors
///
/// Returns [`HluError::Encoding`] if the manager contract address is missing
/// (zero address).
pub fn encode_call_data(action: &ElectionAction, manager: Address) -> Result<Bytes> {
    if manager.is_zero() {
        return Err(HluError::Encoding(format!(
            "{}: manager contract address missing",
            action.kind()
        )));
    }

    let inner = action.inner_call_data();
    let wrapped = executeCall {
        target: manager,
        value: U256::ZERO,
        data: inner.into(),
    }
    .abi_encode();

    Ok(wrapped.into())
}
