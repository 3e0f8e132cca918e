//! Minimal JSON-RPC provider for the HLU chain.
//!
//! Only the methods the orchestrator needs: read-only `eth_call`, raw
//! transaction submission, funded-signer nonce, and receipt lookup.

use alloy_primitives::{Address, B256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{HluError, Result};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// A mined transaction receipt (the fields the submitter inspects).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub status: Option<String>,
    pub block_number: Option<String>,
}

impl TransactionReceipt {
    /// Post-Byzantium receipts report `0x1` on success.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("0x1")
    }
}

/// JSON-RPC client over HTTP.
#[derive(Debug, Clone)]
pub struct RpcProvider {
    client: Client,
    url: String,
}

impl RpcProvider {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let resp = self.client.post(&self.url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(HluError::Http { status, message });
        }

        let decoded: RpcResponse = resp.json().await.map_err(HluError::Request)?;
        if let Some(err) = decoded.error {
            return Err(HluError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(decoded.result)
    }

    /// eth_call against `to` with the given ABI-encoded data, latest block.
    pub async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>> {
        let params = json!([
            { "to": to, "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]);
        let raw: String = from_result(self.request("eth_call", params).await?)?;
        decode_hex(&raw)
    }

    /// eth_getTransactionCount for the pending block (next usable nonce).
    pub async fn transaction_count(&self, address: Address) -> Result<u64> {
        let raw: String = from_result(
            self.request("eth_getTransactionCount", json!([address, "pending"]))
                .await?,
        )?;
        parse_quantity(&raw)
    }

    /// eth_sendRawTransaction; returns the transaction hash.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<B256> {
        let tx_hex = format!("0x{}", hex::encode(raw_tx));
        from_result(
            self.request("eth_sendRawTransaction", json!([tx_hex]))
                .await?,
        )
    }

    /// eth_getTransactionReceipt; `None` until the transaction is mined.
    pub async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(from_result(result)?))
    }
}

fn from_result<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(HluError::Json)
}

fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped).map_err(|e| HluError::Validation(format!("invalid hex string: {e}")))
}

fn parse_quantity(value: &str) -> Result<u64> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(stripped, 16)
        .map_err(|e| HluError::Validation(format!("invalid quantity {value}: {e}")))
}
