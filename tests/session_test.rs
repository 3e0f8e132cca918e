//! Integration tests for session-key issuance and caching.
//!
//! Uses wiremock to stand in for the platform API and asserts the cache
//! contract: a valid cached key never touches the network.

use chrono::Utc;
use hlu::rest::api::ApiClient;
use hlu::{HluError, SessionKeyManager};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_HEX: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
const SCW: &str = "0x00000000000000000000000000000000000000aa";

fn future_expiry() -> u64 {
    (Utc::now().timestamp() + 3600) as u64
}

async fn mount_issuance(server: &MockServer, expires_at: u64, fetch_expected: u64) {
    Mock::given(method("POST"))
        .and(path("/create-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/get-session-key"))
        .and(body_partial_json(json!({ "accountId": 1, "walletId": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "sessionKey": KEY_HEX,
            "expiresAt": expires_at,
            "scwAddress": SCW,
        })))
        .expect(fetch_expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cache_hit_issues_zero_network_calls() {
    let server = MockServer::start().await;
    mount_issuance(&server, future_expiry(), 1).await;

    let manager = SessionKeyManager::new(ApiClient::new(&server.uri()));

    let first = manager.get_or_create(1, 2).await.unwrap();
    // Second call must come from the cache: the fetch mock is bounded to
    // exactly one request and the server verifies on drop.
    let second = manager.get_or_create(1, 2).await.unwrap();

    assert_eq!(first.scw_address, second.scw_address);
    assert_eq!(first.address(), second.address());
    assert_eq!(first.scw_address, SCW.parse::<alloy_primitives::Address>().unwrap());
}

#[tokio::test]
async fn test_expired_key_is_refetched() {
    let server = MockServer::start().await;
    let stale = (Utc::now().timestamp() - 10) as u64;
    mount_issuance(&server, stale, 2).await;

    let manager = SessionKeyManager::new(ApiClient::new(&server.uri()));

    // Both calls see an expired key and must refetch.
    let a = manager.get_or_create(1, 2).await.unwrap();
    let b = manager.get_or_create(1, 2).await.unwrap();
    assert!(!a.is_valid());
    assert!(!b.is_valid());
}

#[tokio::test]
async fn test_create_failure_is_tolerated() {
    let server = MockServer::start().await;

    // The create call blows up; issuance still succeeds via the fetch.
    Mock::given(method("POST"))
        .and(path("/create-session"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/get-session-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "sessionKey": KEY_HEX,
            "expiresAt": future_expiry(),
            "scwAddress": SCW,
        })))
        .mount(&server)
        .await;

    let manager = SessionKeyManager::new(ApiClient::new(&server.uri()));
    let key = manager.get_or_create(1, 2).await.unwrap();
    assert!(key.is_valid());
}

#[tokio::test]
async fn test_fetch_failure_is_key_issuance_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/create-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/get-session-key"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manager = SessionKeyManager::new(ApiClient::new(&server.uri()));
    let err = manager.get_or_create(7, 9).await.unwrap_err();
    assert!(matches!(
        err,
        HluError::KeyIssuance {
            account_id: 7,
            wallet_id: 9,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unusable_fetch_response_is_key_issuance_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/create-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    // Success flag set but no key material.
    Mock::given(method("POST"))
        .and(path("/get-session-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "sessionKey": null,
            "expiresAt": null,
            "scwAddress": null,
        })))
        .mount(&server)
        .await;

    let manager = SessionKeyManager::new(ApiClient::new(&server.uri()));
    let err = manager.get_or_create(1, 2).await.unwrap_err();
    assert!(matches!(err, HluError::KeyIssuance { .. }));
}
