use alloy_primitives::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HluError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("key issuance failed for account {account_id} wallet {wallet_id}: {message}")]
    KeyIssuance {
        account_id: u64,
        wallet_id: u64,
        message: String,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("nonce fetch failed for sender {sender}: {message}")]
    Nonce { sender: Address, message: String },

    #[error("operation hash invariant violated for sender {sender}: {message}")]
    HashMismatch { sender: Address, message: String },

    #[error(
        "submission failed for {action} from {sender}: direct: {direct}; relayer: {relayer}"
    )]
    Submission {
        action: &'static str,
        sender: Address,
        direct: String,
        relayer: String,
    },

    #[error("hash link failed: {0}")]
    Link(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, HluError>;
