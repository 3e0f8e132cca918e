//! Operation hashing and signing.
//!
//! The canonical hash is always the EntryPoint's own `getUserOpHash` over the
//! unsigned tuple — never computed locally, never accepted from the relayer.
//! The session key signs that hash as an EIP-191 personal message, matching
//! what the wallet's validation path recovers.

use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_sol_types::SolCall;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use tracing::debug;

use crate::contracts::getUserOpHashCall;
use crate::error::{HluError, Result};
use crate::operation::UserOperation;
use crate::rpc::RpcProvider;
use crate::session::SessionKey;

const EIP191_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak digest of the EIP-191 personal-message framing of a 32-byte hash.
fn eip191_digest(hash: &B256) -> B256 {
    let mut message = Vec::with_capacity(EIP191_PREFIX.len() + 32);
    message.extend_from_slice(EIP191_PREFIX);
    message.extend_from_slice(hash.as_slice());
    keccak256(&message)
}

/// Sign a 32-byte operation hash with the session key.
///
/// Returns the 65-byte `r || s || v` signature with `v` in `{27, 28}`.
pub fn sign_operation_hash(hash: &B256, key: &SigningKey) -> Result<Bytes> {
    let digest = eip191_digest(hash);
    let (sig, recid) = key
        .sign_prehash_recoverable(digest.as_slice())
        .map_err(|e| HluError::Signing(format!("ecdsa failure: {e}")))?;

    let mut out = Vec::with_capacity(65);
    out.extend_from_slice(&sig.r().to_bytes());
    out.extend_from_slice(&sig.s().to_bytes());
    out.push(recid.to_byte() + 27);
    Ok(Bytes::from(out))
}

/// Recover the signer address from an operation hash and its 65-byte
/// signature.
pub fn recover_signer(hash: &B256, signature: &[u8]) -> Result<Address> {
    if signature.len() != 65 {
        return Err(HluError::Signing(format!(
            "signature must be 65 bytes, got {}",
            signature.len()
        )));
    }
    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| HluError::Signing(format!("malformed signature: {e}")))?;
    let v = signature[64];
    let recid = RecoveryId::try_from(v.checked_sub(27).ok_or_else(|| {
        HluError::Signing(format!("recovery byte {v} out of range"))
    })?)
    .map_err(|e| HluError::Signing(format!("recovery byte {v}: {e}")))?;

    let digest = eip191_digest(hash);
    let verifying = VerifyingKey::recover_from_prehash(digest.as_slice(), &sig, recid)
        .map_err(|e| HluError::Signing(format!("recovery failed: {e}")))?;

    let encoded = verifying.to_encoded_point(false);
    let pk_hash = keccak256(&encoded.as_bytes()[1..]);
    Ok(Address::from_slice(&pk_hash[12..]))
}

/// Fetch the canonical hash of `op` from the EntryPoint (signature zeroed).
pub async fn entry_point_hash(
    rpc: &RpcProvider,
    entry_point: Address,
    op: &UserOperation,
) -> Result<B256> {
    let call = getUserOpHashCall {
        userOp: op.as_unsigned_sol(),
    };
    let ret = rpc.call(entry_point, &call.abi_encode()).await?;
    let decoded = getUserOpHashCall::abi_decode_returns(&ret, true)
        .map_err(|e| HluError::Signing(format!("getUserOpHash returned malformed data: {e}")))?;
    Ok(decoded._0)
}

/// Hash and sign `op` in place, filling `signature` and `computed_hash`.
///
/// After signing, the signer address is recovered and compared against the
/// session key; a mismatch means the signature does not cover the canonical
/// hash and is a fatal invariant violation, never retried.
///
/// # Errors
///
/// Returns [`HluError::HashMismatch`] on a recovery mismatch.
pub async fn sign_operation(
    rpc: &RpcProvider,
    entry_point: Address,
    op: &mut UserOperation,
    key: &SessionKey,
) -> Result<B256> {
    let hash = entry_point_hash(rpc, entry_point, op).await?;
    let signature = sign_operation_hash(&hash, key.signing_key())?;

    let recovered = recover_signer(&hash, &signature)?;
    if recovered != key.address() {
        return Err(HluError::HashMismatch {
            sender: op.sender,
            message: format!(
                "signature recovers to {recovered}, session key is {}",
                key.address()
            ),
        });
    }

    debug!(sender = %op.sender, hash = %hash, "operation signed");
    op.signature = signature;
    op.computed_hash = Some(hash);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    fn test_key() -> SigningKey {
        SigningKey::from_bytes(&[0x11u8; 32].into()).unwrap()
    }

    const HASH: B256 =
        b256!("7d2c6c5efdd9d2fbcd0ed33e180cb6b5ab1e128aa4e4ba543d50e0bc272a479e");

    #[test]
    fn test_sign_is_deterministic() {
        let key = test_key();
        let a = sign_operation_hash(&HASH, &key).unwrap();
        let b = sign_operation_hash(&HASH, &key).unwrap();
        assert_eq!(a, b, "RFC 6979 signing is deterministic");
        assert_eq!(a.len(), 65);
        assert!(a[64] == 27 || a[64] == 28);
    }

    #[test]
    fn test_recover_matches_signer() {
        let key = test_key();
        let sig = sign_operation_hash(&HASH, &key).unwrap();

        let encoded = key.verifying_key().to_encoded_point(false);
        let expected = Address::from_slice(&keccak256(&encoded.as_bytes()[1..])[12..]);

        assert_eq!(recover_signer(&HASH, &sig).unwrap(), expected);
    }

    #[test]
    fn test_recover_rejects_wrong_hash() {
        let key = test_key();
        let sig = sign_operation_hash(&HASH, &key).unwrap();

        let other = b256!("00000000000000000000000000000000000000000000000000000000000000ff");
        let encoded = key.verifying_key().to_encoded_point(false);
        let expected = Address::from_slice(&keccak256(&encoded.as_bytes()[1..])[12..]);

        // Recovery over a different hash yields some other address.
        let recovered = recover_signer(&other, &sig).unwrap();
        assert_ne!(recovered, expected);
    }

    #[test]
    fn test_recover_rejects_bad_lengths() {
        assert!(recover_signer(&HASH, &[0u8; 64]).is_err());
        assert!(recover_signer(&HASH, &[0u8; 66]).is_err());
    }

    #[test]
    fn test_different_keys_different_signatures() {
        let a = sign_operation_hash(&HASH, &test_key()).unwrap();
        let b =
            sign_operation_hash(&HASH, &SigningKey::from_bytes(&[0x22u8; 32].into()).unwrap())
                .unwrap();
        assert_ne!(a, b);
    }
}
