//! Integration tests for UserOperation assembly against a mocked JSON-RPC
//! provider: nonce getter fallback and fixed gas policy stamping.

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use hlu::contracts::{getNonceCall, nonceOfCall};
use hlu::{build_operation, GasPolicy, HluError, RpcProvider};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENTRY_POINT: Address = address!("00000000000000000000000000000000000000e9");
const PAYMASTER: Address = address!("00000000000000000000000000000000000000f1");
const SENDER: Address = address!("00000000000000000000000000000000000000aa");

fn rpc_result(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": value,
    }))
}

fn rpc_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": -32000, "message": message },
    }))
}

fn uint_word(value: u64) -> serde_json::Value {
    json!(format!("0x{value:064x}"))
}

#[tokio::test]
async fn test_build_uses_primary_nonce_getter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(hex::encode(getNonceCall::SELECTOR)))
        .respond_with(rpc_result(uint_word(5)))
        .expect(1)
        .mount(&server)
        .await;

    let rpc = RpcProvider::new(&server.uri());
    let gas = GasPolicy::default();
    let op = build_operation(&rpc, ENTRY_POINT, SENDER, Bytes::new(), PAYMASTER, &gas)
        .await
        .unwrap();

    assert_eq!(op.nonce, U256::from(5u64));
    assert_eq!(op.sender, SENDER);
    assert_eq!(op.call_gas_limit, gas.call_gas_limit);
    assert_eq!(op.max_fee_per_gas, gas.max_fee_per_gas);
    // Paymaster convention: the sponsor address verbatim, nothing else.
    assert_eq!(op.paymaster_and_data.as_ref(), PAYMASTER.as_slice());
    assert!(op.signature.is_empty());
    assert!(op.init_code.is_empty());
}

#[tokio::test]
async fn test_build_falls_back_to_legacy_getter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(hex::encode(getNonceCall::SELECTOR)))
        .respond_with(rpc_error("execution reverted"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(hex::encode(nonceOfCall::SELECTOR)))
        .respond_with(rpc_result(uint_word(12)))
        .expect(1)
        .mount(&server)
        .await;

    let rpc = RpcProvider::new(&server.uri());
    let op = build_operation(
        &rpc,
        ENTRY_POINT,
        SENDER,
        Bytes::from(vec![0x01]),
        PAYMASTER,
        &GasPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(op.nonce, U256::from(12u64));
}

#[tokio::test]
async fn test_both_nonce_getters_failing_is_nonce_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(rpc_error("execution reverted"))
        .mount(&server)
        .await;

    let rpc = RpcProvider::new(&server.uri());
    let err = build_operation(
        &rpc,
        ENTRY_POINT,
        SENDER,
        Bytes::new(),
        PAYMASTER,
        &GasPolicy::default(),
    )
    .await
    .unwrap_err();

    match err {
        HluError::Nonce { sender, message } => {
            assert_eq!(sender, SENDER);
            assert!(message.contains("getNonce"));
            assert!(message.contains("nonceOf"));
        }
        other => panic!("expected Nonce error, got {other}"),
    }
}
