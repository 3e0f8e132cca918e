//! UserOperation assembly.
//!
//! The builder fetches a fresh nonce from the EntryPoint for every operation
//! (nonces are never reused client-side), stamps the fixed gas policy, and
//! points `paymasterAndData` at the sponsoring paymaster.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GasPolicy;
use crate::contracts::{getNonceCall, nonceOfCall, UserOperationStruct};
use crate::error::{HluError, Result};
use crate::rpc::RpcProvider;
use crate::types::serde_wei;

/// An ERC-4337 v0.6 UserOperation.
///
/// Wire form is camelCase with gas/fee numerics as decimal-string wei.
/// `computed_hash` is local bookkeeping and never serialized with the
/// operation itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    #[serde(with = "serde_wei")]
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    #[serde(with = "serde_wei")]
    pub call_gas_limit: U256,
    #[serde(with = "serde_wei")]
    pub verification_gas_limit: U256,
    #[serde(with = "serde_wei")]
    pub pre_verification_gas: U256,
    #[serde(with = "serde_wei")]
    pub max_fee_per_gas: U256,
    #[serde(with = "serde_wei")]
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
    /// Hash the signature covers, as computed by the EntryPoint.
    #[serde(skip)]
    pub computed_hash: Option<B256>,
}

impl UserOperation {
    /// ABI tuple with the current signature.
    pub fn as_sol(&self) -> UserOperationStruct {
        UserOperationStruct {
            sender: self.sender,
            nonce: self.nonce,
            initCode: self.init_code.clone(),
            callData: self.call_data.clone(),
            callGasLimit: self.call_gas_limit,
            verificationGasLimit: self.verification_gas_limit,
            preVerificationGas: self.pre_verification_gas,
            maxFeePerGas: self.max_fee_per_gas,
            maxPriorityFeePerGas: self.max_priority_fee_per_gas,
            paymasterAndData: self.paymaster_and_data.clone(),
            signature: self.signature.clone(),
        }
    }

    /// ABI tuple with the signature field zeroed, as hashed by the
    /// EntryPoint.
    pub fn as_unsigned_sol(&self) -> UserOperationStruct {
        let mut op = self.as_sol();
        op.signature = Bytes::new();
        op
    }
}

/// Assemble an unsigned operation for `sender` carrying `call_data`.
///
/// The nonce comes from the EntryPoint's `getNonce`; older deployments only
/// expose `nonceOf`, so that is retried once before giving up.
///
/// # Errors
///
/// Returns [`HluError::Nonce`] when both getters fail.
pub async fn build_operation(
    rpc: &RpcProvider,
    entry_point: Address,
    sender: Address,
    call_data: Bytes,
    paymaster: Address,
    gas: &GasPolicy,
) -> Result<UserOperation> {
    let nonce = fetch_nonce(rpc, entry_point, sender).await?;
    debug!(%sender, %nonce, "assembled unsigned operation");

    Ok(UserOperation {
        sender,
        nonce,
        init_code: Bytes::new(),
        call_data,
        call_gas_limit: gas.call_gas_limit,
        verification_gas_limit: gas.verification_gas_limit,
        pre_verification_gas: gas.pre_verification_gas,
        max_fee_per_gas: gas.max_fee_per_gas,
        max_priority_fee_per_gas: gas.max_priority_fee_per_gas,
        // Single-address "sponsor everything" convention: the paymaster
        // address verbatim, no structured suffix.
        paymaster_and_data: Bytes::from(paymaster.as_slice().to_vec()),
        signature: Bytes::new(),
        computed_hash: None,
    })
}

async fn fetch_nonce(rpc: &RpcProvider, entry_point: Address, sender: Address) -> Result<U256> {
    let primary = getNonceCall { sender }.abi_encode();
    match rpc.call(entry_point, &primary).await {
        Ok(ret) => {
            let decoded = getNonceCall::abi_decode_returns(&ret, true)
                .map_err(|e| HluError::Nonce {
                    sender,
                    message: format!("getNonce returned malformed data: {e}"),
                })?;
            Ok(decoded._0)
        }
        Err(primary_err) => {
            debug!(%sender, error = %primary_err, "getNonce failed, trying legacy nonceOf");
            let fallback = nonceOfCall { sender }.abi_encode();
            let ret = rpc
                .call(entry_point, &fallback)
                .await
                .map_err(|fallback_err| HluError::Nonce {
                    sender,
                    message: format!(
                        "getNonce: {primary_err}; nonceOf: {fallback_err}"
                    ),
                })?;
            let decoded = nonceOfCall::abi_decode_returns(&ret, true)
                .map_err(|e| HluError::Nonce {
                    sender,
                    message: format!("nonceOf returned malformed data: {e}"),
                })?;
            Ok(decoded._0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn sample_op() -> UserOperation {
        UserOperation {
            sender: address!("00000000000000000000000000000000000000aa"),
            nonce: U256::from(5u64),
            init_code: Bytes::new(),
            call_data: Bytes::from(vec![0xde, 0xad]),
            call_gas_limit: U256::from(2_000_000u64),
            verification_gas_limit: U256::from(2_000_000u64),
            pre_verification_gas: U256::from(210_000u64),
            max_fee_per_gas: U256::from(5_000_000_000u64),
            max_priority_fee_per_gas: U256::from(2_000_000_000u64),
            paymaster_and_data: Bytes::from(vec![0x01; 20]),
            signature: Bytes::new(),
            computed_hash: None,
        }
    }

    #[test]
    fn test_wire_form_uses_decimal_strings() {
        let json = serde_json::to_value(sample_op()).unwrap();
        assert_eq!(json["nonce"], "5");
        assert_eq!(json["callGasLimit"], "2000000");
        assert_eq!(json["maxFeePerGas"], "5000000000");
        assert_eq!(json["callData"], "0xdead");
        // Local bookkeeping never crosses the wire.
        assert!(json.get("computedHash").is_none());
    }

    #[test]
    fn test_wire_round_trip() {
        let op = sample_op();
        let json = serde_json::to_string(&op).unwrap();
        let back: UserOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sender, op.sender);
        assert_eq!(back.nonce, op.nonce);
        assert_eq!(back.max_priority_fee_per_gas, op.max_priority_fee_per_gas);
        assert_eq!(back.call_data, op.call_data);
    }

    #[test]
    fn test_unsigned_tuple_zeroes_signature() {
        let mut op = sample_op();
        op.signature = Bytes::from(vec![0xff; 65]);
        let unsigned = op.as_unsigned_sol();
        assert!(unsigned.signature.is_empty());
        assert_eq!(unsigned.callData, op.call_data);
    }
}
