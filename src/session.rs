//! Session-key issuance and caching.
//!
//! The platform issues short-lived secp256k1 keys authorized on the user's
//! smart-contract wallet. Keys are cached per `(account, wallet)` pair and
//! refreshed when stale; a refresh race only costs a redundant fetch.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::{keccak256, Address};
use chrono::Utc;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use tracing::{debug, info};

use crate::error::{HluError, Result};
use crate::rest::api::ApiClient;

/// A time-bound signing key authorized on a smart-contract wallet.
#[derive(Debug, Clone)]
pub struct SessionKey {
    signing_key: SigningKey,
    /// The wallet the key is authorized on (the UserOperation sender).
    pub scw_address: Address,
    /// Unix-second expiry.
    pub expires_at: u64,
}

impl SessionKey {
    pub fn new(signing_key: SigningKey, scw_address: Address, expires_at: u64) -> Self {
        Self {
            signing_key,
            scw_address,
            expires_at,
        }
    }

    /// Parse the hex key material handed out by the issuance service.
    pub fn from_hex(key_hex: &str, scw_address: Address, expires_at: u64) -> Result<Self> {
        let stripped = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let bytes =
            hex::decode(stripped).map_err(|e| HluError::Signing(format!("invalid key hex: {e}")))?;
        let key_array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HluError::Signing("session key must be 32 bytes".into()))?;
        let signing_key = SigningKey::from_bytes(&key_array.into())
            .map_err(|e| HluError::Signing(format!("invalid session key: {e}")))?;
        Ok(Self::new(signing_key, scw_address, expires_at))
    }

    /// The key's own EOA address (keccak of the uncompressed public key).
    pub fn address(&self) -> Address {
        let encoded = self.signing_key.verifying_key().to_encoded_point(false);
        let hash = keccak256(&encoded.as_bytes()[1..]);
        Address::from_slice(&hash[12..])
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn is_valid_at(&self, now: u64) -> bool {
        self.expires_at > now
    }

    /// Valid right now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp().max(0) as u64)
    }
}

/// Obtains and caches session keys from the issuance service.
#[derive(Debug)]
pub struct SessionKeyManager {
    api: ApiClient,
    cache: Mutex<HashMap<(u64, u64), SessionKey>>,
}

impl SessionKeyManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return a valid session key for `(account_id, wallet_id)`, fetching a
    /// fresh one only when the cached key is missing or expired.
    ///
    /// # Errors
    ///
    /// Returns [`HluError::KeyIssuance`] when the fetch does not yield a
    /// usable key. The preceding create call is advisory and its failure is
    /// tolerated (the key may already exist server-side).
    pub async fn get_or_create(&self, account_id: u64, wallet_id: u64) -> Result<SessionKey> {
        if let Some(key) = self.cached(account_id, wallet_id) {
            return Ok(key);
        }

        if let Err(e) = self.api.create_session(account_id, wallet_id).await {
            debug!(account_id, wallet_id, error = %e, "create-session failed, key may already exist");
        }

        let resp = self
            .api
            .get_session_key(account_id, wallet_id)
            .await
            .map_err(|e| HluError::KeyIssuance {
                account_id,
                wallet_id,
                message: e.to_string(),
            })?;

        if !resp.success {
            return Err(HluError::KeyIssuance {
                account_id,
                wallet_id,
                message: "issuance service reported failure".into(),
            });
        }

        let (key_hex, expires_at, scw_address) =
            match (resp.session_key, resp.expires_at, resp.scw_address) {
                (Some(k), Some(exp), Some(scw)) => (k, exp, scw),
                _ => {
                    return Err(HluError::KeyIssuance {
                        account_id,
                        wallet_id,
                        message: "issuance response missing key, expiry, or wallet address".into(),
                    })
                }
            };

        let key =
            SessionKey::from_hex(&key_hex, scw_address, expires_at).map_err(|e| {
                HluError::KeyIssuance {
                    account_id,
                    wallet_id,
                    message: e.to_string(),
                }
            })?;

        info!(
            account_id,
            wallet_id,
            scw = %key.scw_address,
            expires_at,
            "session key issued"
        );

        self.cache
            .lock()
            .expect("session cache poisoned")
            .insert((account_id, wallet_id), key.clone());

        Ok(key)
    }

    fn cached(&self, account_id: u64, wallet_id: u64) -> Option<SessionKey> {
        let cache = self.cache.lock().expect("session cache poisoned");
        cache
            .get(&(account_id, wallet_id))
            .filter(|k| k.is_valid())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const SCW: Address = address!("00000000000000000000000000000000000000aa");

    #[test]
    fn test_from_hex_accepts_prefixed_and_bare() {
        let bare = "11".repeat(32);
        let a = SessionKey::from_hex(&bare, SCW, 10).unwrap();
        let b = SessionKey::from_hex(&format!("0x{bare}"), SCW, 10).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_from_hex_rejects_bad_lengths() {
        assert!(SessionKey::from_hex("0x1234", SCW, 10).is_err());
        assert!(SessionKey::from_hex("zz", SCW, 10).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let key = SessionKey::from_hex(&"22".repeat(32), SCW, 100).unwrap();
        assert!(key.is_valid_at(99));
        assert!(!key.is_valid_at(100));
        assert!(!key.is_valid_at(101));
    }

    #[test]
    fn test_address_derivation_known_key() {
        // The classic dev key; its address is a well-known fixture.
        let key = SessionKey::from_hex(
            "4646464646464646464646464646464646464646464646464646464646464646",
            SCW,
            10,
        )
        .unwrap();
        assert_eq!(
            key.address(),
            address!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")
        );
    }
}
