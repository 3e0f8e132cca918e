pub mod actions;
pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod operation;
pub mod poller;
pub mod reconcile;
pub mod rest;
pub mod rpc;
pub mod session;
pub mod signing;
pub mod submit;
pub mod tx;
pub mod types;
pub mod wallet;

// ---- Top-level re-exports for ergonomic usage ----

// Client + wallet
pub use client::Hlu;
pub use config::{GasPolicy, HluConfig, PollPolicy, TxPolicy};
pub use error::{HluError, Result};
pub use wallet::{HluWallet, OperationOutcome};

// Actions
pub use actions::{encode_call_data, ElectionAction};

// Sessions
pub use session::{SessionKey, SessionKeyManager};

// Operations
pub use operation::{build_operation, UserOperation};
pub use signing::{recover_signer, sign_operation};
pub use submit::{submit_operation, SubmissionPath, SubmissionResult};

// Lifecycle
pub use poller::poll_until_terminal;
pub use reconcile::link_hashes;
pub use types::{
    ContractAddresses, OperationRecord, OperationStatus, QueryStatus, StatusResponse,
    TerminalStatus,
};

// Transports
pub use rest::api::ApiClient;
pub use rest::relayer::RelayerClient;
pub use rpc::RpcProvider;
pub use tx::FundedSigner;
