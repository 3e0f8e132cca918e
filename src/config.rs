use std::time::Duration;

use alloy_primitives::U256;

/// Configuration for the Hlu client.
#[derive(Debug, Clone)]
pub struct HluConfig {
    /// Base URL of the platform API (key issuance + contract discovery).
    pub api_url: String,
    /// Base URL of the relayer/bundler service.
    pub relayer_url: String,
    /// JSON-RPC endpoint of the HLU chain.
    pub rpc_url: String,
    /// Hex-encoded private key of the funded signer used for direct
    /// EntryPoint submission. `None` disables the direct path.
    pub funded_key: Option<String>,
    /// Gas and fee fields stamped on every UserOperation.
    pub gas: GasPolicy,
    /// Outer-transaction parameters for the direct submission path.
    pub tx: TxPolicy,
    /// Status-polling bounds.
    pub poll: PollPolicy,
    /// Delay between operations in a sequential batch.
    pub batch_delay: Duration,
}

/// Fixed gas/fee fields for UserOperations.
///
/// Policy values, never RPC estimates; valid while target-chain costs stay
/// stable. Tune per deployment.
#[derive(Debug, Clone)]
pub struct GasPolicy {
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            call_gas_limit: U256::from(2_000_000u64),
            verification_gas_limit: U256::from(2_000_000u64),
            pre_verification_gas: U256::from(210_000u64),
            // 5 gwei / 2 gwei
            max_fee_per_gas: U256::from(5_000_000_000u64),
            max_priority_fee_per_gas: U256::from(2_000_000_000u64),
        }
    }
}

/// Parameters of the legacy transaction wrapping a direct `handleOps` call.
#[derive(Debug, Clone)]
pub struct TxPolicy {
    pub gas_limit: u64,
    pub gas_price: U256,
    /// How many receipt probes to make while waiting for one confirmation.
    pub receipt_attempts: u32,
    /// Delay between receipt probes.
    pub receipt_interval: Duration,
}

impl Default for TxPolicy {
    fn default() -> Self {
        Self {
            gas_limit: 5_000_000,
            gas_price: U256::from(2_000_000_000u64),
            receipt_attempts: 30,
            receipt_interval: Duration::from_secs(2),
        }
    }
}

/// Bounds for the relayer status poller.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Maximum number of status ticks before resolving to `TimedOut`.
    pub max_attempts: u32,
    /// Fixed interval between ticks (no backoff).
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(5),
        }
    }
}

impl HluConfig {
    /// Minimal configuration with default policies.
    pub fn new(api_url: &str, relayer_url: &str, rpc_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            relayer_url: relayer_url.to_string(),
            rpc_url: rpc_url.to_string(),
            funded_key: None,
            gas: GasPolicy::default(),
            tx: TxPolicy::default(),
            poll: PollPolicy::default(),
            batch_delay: Duration::from_secs(2),
        }
    }
}
