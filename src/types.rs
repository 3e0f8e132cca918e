//! Wire DTOs and domain records shared across the orchestrator.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Platform contract addresses, discovered once per client lifetime.
#[derive(Debug, Clone, Copy)]
pub struct ContractAddresses {
    pub entry_point: Address,
    pub factory: Address,
    pub paymaster: Address,
    pub hlu_token: Address,
    pub chain_id: u64,
}

/// Raw `GET contract-addresses` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddressesResponse {
    pub success: bool,
    pub entry_point_address: Address,
    pub factory_address: Address,
    pub paymaster_address: Address,
    pub hlu_token_address: Address,
    pub chain_id: u64,
}

impl From<ContractAddressesResponse> for ContractAddresses {
    fn from(r: ContractAddressesResponse) -> Self {
        Self {
            entry_point: r.entry_point_address,
            factory: r.factory_address,
            paymaster: r.paymaster_address,
            hlu_token: r.hlu_token_address,
            chain_id: r.chain_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Key issuance service
// ---------------------------------------------------------------------------

/// Body of `POST create-session` / `POST get-session-key`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKeyRequest {
    pub account_id: u64,
    pub wallet_id: u64,
}

/// Response of `POST get-session-key`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKeyResponse {
    pub success: bool,
    /// Hex-encoded 32-byte signing key.
    pub session_key: Option<String>,
    /// Unix-second expiry.
    pub expires_at: Option<u64>,
    pub scw_address: Option<Address>,
}

// ---------------------------------------------------------------------------
// Relayer service
// ---------------------------------------------------------------------------

/// Response of `POST submit`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerSubmitResponse {
    pub tx_hash: Option<B256>,
    pub user_op_hash: Option<B256>,
    pub backend_hash: Option<B256>,
}

/// Status value reported by `GET check-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Failed,
    Pending,
    #[serde(other)]
    Unknown,
}

/// Response of `GET check-status?userOpHash=`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: QueryStatus,
    pub tx_hash: Option<B256>,
    pub message: Option<String>,
}

/// Body of `POST link-hashes`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkHashesRequest {
    pub frontend_hash: B256,
    pub backend_hash: B256,
    pub sender: Address,
}

/// Response of `POST link-hashes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkHashesResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Operation lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of one logical operation.
///
/// `Created → Signed → Submitted → Pending → {Success | Failed | TimedOut}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Created,
    Signed,
    Submitted,
    Pending,
    Success,
    Failed,
    TimedOut,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::TimedOut)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Signed => 1,
            Self::Submitted => 2,
            Self::Pending => 3,
            Self::Success | Self::Failed | Self::TimedOut => 4,
        }
    }
}

/// Terminal outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    Success { tx_hash: Option<B256> },
    Failed { message: Option<String> },
    TimedOut,
}

/// Tracks the identifiers and state of one operation across submission and
/// polling. The frontend hash is the EntryPoint-computed hash the signature
/// covers; the backend hash is the relayer's identifier when it diverges.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub frontend_hash: B256,
    pub backend_hash: Option<B256>,
    pub tx_hash: Option<B256>,
    pub linked: bool,
    pub status: OperationStatus,
}

impl OperationRecord {
    pub fn new(frontend_hash: B256) -> Self {
        Self {
            frontend_hash,
            backend_hash: None,
            tx_hash: None,
            linked: false,
            status: OperationStatus::Created,
        }
    }

    /// Move to `next` if that is a forward transition. Terminal states are
    /// absorbing; backward moves are ignored.
    pub fn advance(&mut self, next: OperationStatus) {
        if self.status.is_terminal() {
            return;
        }
        if next.rank() >= self.status.rank() {
            self.status = next;
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helper: U256 as decimal-string wei
// ---------------------------------------------------------------------------

/// All gas/fee numerics cross the wire as decimal-string-encoded wei.
pub(crate) mod serde_wei {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
