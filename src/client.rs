//! Top-level Hlu client.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use tracing::info;

use crate::config::HluConfig;
use crate::contracts::{balanceOfCall, getNonceCall};
use crate::error::{HluError, Result};
use crate::rest::api::ApiClient;
use crate::rest::relayer::RelayerClient;
use crate::rpc::RpcProvider;
use crate::tx::FundedSigner;
use crate::types::{ContractAddresses, StatusResponse};

/// Main client for the HLU election platform.
///
/// Holds the HTTP and RPC transports plus the platform contract addresses,
/// which are discovered once at construction and cached for the client's
/// lifetime.
#[derive(Debug, Clone)]
pub struct Hlu {
    pub config: HluConfig,
    pub api: ApiClient,
    pub relayer: RelayerClient,
    pub rpc: RpcProvider,
    pub addresses: ContractAddresses,
    funded: Option<FundedSigner>,
}

impl Hlu {
    /// Create and initialize a client: discovers contract addresses and
    /// parses the funded-signer key when one is configured.
    pub async fn new(config: HluConfig) -> Result<Self> {
        let api = ApiClient::new(&config.api_url);
        let relayer = RelayerClient::new(&config.relayer_url);
        let rpc = RpcProvider::new(&config.rpc_url);

        let resp = api.contract_addresses().await?;
        if !resp.success {
            return Err(HluError::Validation(
                "contract discovery reported failure".into(),
            ));
        }
        let addresses = ContractAddresses::from(resp);
        info!(
            entry_point = %addresses.entry_point,
            paymaster = %addresses.paymaster,
            chain_id = addresses.chain_id,
            "platform contracts discovered"
        );

        let funded = config
            .funded_key
            .as_deref()
            .map(FundedSigner::from_hex)
            .transpose()?;

        Ok(Self {
            config,
            api,
            relayer,
            rpc,
            addresses,
            funded,
        })
    }

    /// The funded signer for direct submission, when configured.
    pub fn funded_signer(&self) -> Option<&FundedSigner> {
        self.funded.as_ref()
    }

    /// One-shot status passthrough for an operation hash.
    pub async fn check_status(&self, user_op_hash: B256) -> Result<StatusResponse> {
        self.relayer.check_status(user_op_hash).await
    }

    /// HLU token balance of `owner` (wei units of the token).
    pub async fn hlu_token_balance(&self, owner: Address) -> Result<U256> {
        let data = balanceOfCall { owner }.abi_encode();
        let ret = self.rpc.call(self.addresses.hlu_token, &data).await?;
        let decoded = balanceOfCall::abi_decode_returns(&ret, true)
            .map_err(|e| HluError::Validation(format!("balanceOf returned malformed data: {e}")))?;
        Ok(decoded._0)
    }

    /// Current EntryPoint nonce of a sender (diagnostic read; the builder
    /// always re-fetches its own).
    pub async fn entry_point_nonce(&self, sender: Address) -> Result<U256> {
        let data = getNonceCall { sender }.abi_encode();
        let ret = self.rpc.call(self.addresses.entry_point, &data).await?;
        let decoded = getNonceCall::abi_decode_returns(&ret, true)
            .map_err(|e| HluError::Validation(format!("getNonce returned malformed data: {e}")))?;
        Ok(decoded._0)
    }
}
