//! Platform API endpoints: session-key issuance and contract discovery.

use serde_json::Value;

use crate::error::Result;
use crate::rest::HttpClient;
use crate::types::{ContractAddressesResponse, SessionKeyRequest, SessionKeyResponse};

/// Client for the platform API (key issuance + discovery).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClient::new(base_url),
        }
    }

    /// POST /create-session - ask the issuance service to mint a session key.
    ///
    /// The response body is ignored: a failure here may only mean a key
    /// already exists, so callers treat this as advisory.
    pub async fn create_session(&self, account_id: u64, wallet_id: u64) -> Result<Value> {
        self.http
            .post(
                "/create-session",
                &SessionKeyRequest {
                    account_id,
                    wallet_id,
                },
            )
            .await
    }

    /// POST /get-session-key - fetch the current session key for a wallet.
    pub async fn get_session_key(
        &self,
        account_id: u64,
        wallet_id: u64,
    ) -> Result<SessionKeyResponse> {
        self.http
            .post(
                "/get-session-key",
                &SessionKeyRequest {
                    account_id,
                    wallet_id,
                },
            )
            .await
    }

    /// GET /contract-addresses - platform contract addresses and chain id.
    pub async fn contract_addresses(&self) -> Result<ContractAddressesResponse> {
        self.http.get("/contract-addresses", &[]).await
    }
}
