//! EIP-155 legacy transactions for the direct submission path.
//!
//! The funded signer wraps `handleOps` call data in a plain legacy
//! transaction with fixed gas parameters. The HLU chain predates typed
//! transactions, so this is the only envelope the direct path needs.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::config::TxPolicy;
use crate::error::{HluError, Result};

/// Pre-signature payload; the trailing `(chain_id, 0, 0)` triplet is the
/// EIP-155 replay-protection extension.
#[derive(RlpEncodable)]
struct UnsignedLegacyTx {
    nonce: u64,
    gas_price: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    chain_id: u64,
    zero_r: u8,
    zero_s: u8,
}

#[derive(RlpEncodable)]
struct SignedLegacyTx {
    nonce: u64,
    gas_price: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    v: u64,
    r: U256,
    s: U256,
}

/// A raw transaction ready for `eth_sendRawTransaction`, plus its hash.
#[derive(Debug, Clone)]
pub struct RawTransaction {
    pub bytes: Vec<u8>,
    pub hash: B256,
}

/// The account paying gas for direct EntryPoint submissions.
#[derive(Debug, Clone)]
pub struct FundedSigner {
    key: SigningKey,
    address: Address,
}

impl FundedSigner {
    /// Parse a hex-encoded 32-byte private key.
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let stripped = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let bytes = hex::decode(stripped)
            .map_err(|e| HluError::Signing(format!("invalid funded key hex: {e}")))?;
        let key_array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HluError::Signing("funded key must be 32 bytes".into()))?;
        let key = SigningKey::from_bytes(&key_array.into())
            .map_err(|e| HluError::Signing(format!("invalid funded key: {e}")))?;

        let encoded = key.verifying_key().to_encoded_point(false);
        let hash = keccak256(&encoded.as_bytes()[1..]);
        let address = Address::from_slice(&hash[12..]);

        Ok(Self { key, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Build and sign an EIP-155 legacy transaction calling `to` with `data`.
    pub fn sign_transaction(
        &self,
        nonce: u64,
        to: Address,
        value: U256,
        data: &Bytes,
        chain_id: u64,
        policy: &TxPolicy,
    ) -> Result<RawTransaction> {
        let unsigned = UnsignedLegacyTx {
            nonce,
            gas_price: policy.gas_price,
            gas_limit: policy.gas_limit,
            to,
            value,
            data: data.clone(),
            chain_id,
            zero_r: 0,
            zero_s: 0,
        };
        let mut payload = Vec::new();
        unsigned.encode(&mut payload);
        let signing_hash = keccak256(&payload);

        let (sig, recid) = self
            .key
            .sign_prehash_recoverable(signing_hash.as_slice())
            .map_err(|e| HluError::Signing(format!("ecdsa failure: {e}")))?;

        let signed = SignedLegacyTx {
            nonce,
            gas_price: policy.gas_price,
            gas_limit: policy.gas_limit,
            to,
            value,
            data: data.clone(),
            v: chain_id * 2 + 35 + u64::from(recid.to_byte()),
            r: U256::from_be_slice(&sig.r().to_bytes()),
            s: U256::from_be_slice(&sig.s().to_bytes()),
        };
        let mut bytes = Vec::new();
        signed.encode(&mut bytes);
        let hash = keccak256(&bytes);

        Ok(RawTransaction { bytes, hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    /// The canonical EIP-155 example: nonce 9, 20 gwei, 21000 gas, 1 ether
    /// to 0x3535...35 on chain 1, signed with key 0x4646...46.
    #[test]
    fn test_eip155_known_vector() {
        let signer = FundedSigner::from_hex(
            "0x4646464646464646464646464646464646464646464646464646464646464646",
        )
        .unwrap();
        assert_eq!(
            signer.address(),
            address!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")
        );

        let policy = TxPolicy {
            gas_limit: 21_000,
            gas_price: U256::from(20_000_000_000u64),
            ..TxPolicy::default()
        };
        let raw = signer
            .sign_transaction(
                9,
                address!("3535353535353535353535353535353535353535"),
                U256::from(1_000_000_000_000_000_000u64),
                &Bytes::new(),
                1,
                &policy,
            )
            .unwrap();

        let expected = hex::decode(
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
        )
        .unwrap();
        assert_eq!(raw.bytes, expected);
    }

    #[test]
    fn test_tx_hash_is_keccak_of_raw() {
        let signer = FundedSigner::from_hex(&"11".repeat(32)).unwrap();
        let raw = signer
            .sign_transaction(
                0,
                address!("00000000000000000000000000000000000000bb"),
                U256::ZERO,
                &Bytes::from(vec![0x01, 0x02]),
                1337,
                &TxPolicy::default(),
            )
            .unwrap();
        assert_eq!(raw.hash, keccak256(&raw.bytes));
    }

    #[test]
    fn test_from_hex_rejects_bad_keys() {
        assert!(FundedSigner::from_hex("0x1234").is_err());
        assert!(FundedSigner::from_hex("not-hex").is_err());
    }
}
