//! Relayer/bundler endpoints: submission, status checks, hash linking.

use alloy_primitives::{Address, B256};
use serde::Serialize;

use crate::error::Result;
use crate::operation::UserOperation;
use crate::rest::HttpClient;
use crate::types::{LinkHashesRequest, LinkHashesResponse, RelayerSubmitResponse, StatusResponse};

/// Body of `POST /submit`: the flattened signed operation plus the hash the
/// signature covers, so the relayer can hash-match on its side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitOperationRequest<'a> {
    #[serde(flatten)]
    operation: &'a UserOperation,
    computed_hash: B256,
}

/// Client for the relayer/bundler HTTP API.
#[derive(Debug, Clone)]
pub struct RelayerClient {
    http: HttpClient,
}

impl RelayerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClient::new(base_url),
        }
    }

    /// POST /submit - hand a signed operation to the relayer.
    pub async fn submit(
        &self,
        operation: &UserOperation,
        computed_hash: B256,
    ) -> Result<RelayerSubmitResponse> {
        self.http
            .post(
                "/submit",
                &SubmitOperationRequest {
                    operation,
                    computed_hash,
                },
            )
            .await
    }

    /// GET /check-status?userOpHash= - query the status of an operation by
    /// either of its hashes.
    pub async fn check_status(&self, user_op_hash: B256) -> Result<StatusResponse> {
        let hash = user_op_hash.to_string();
        self.http
            .get("/check-status", &[("userOpHash", hash.as_str())])
            .await
    }

    /// POST /link-hashes - record that two hashes identify one operation.
    pub async fn link_hashes(
        &self,
        frontend_hash: B256,
        backend_hash: B256,
        sender: Address,
    ) -> Result<LinkHashesResponse> {
        self.http
            .post(
                "/link-hashes",
                &LinkHashesRequest {
                    frontend_hash,
                    backend_hash,
                    sender,
                },
            )
            .await
    }
}
