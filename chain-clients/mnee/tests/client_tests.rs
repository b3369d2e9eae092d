//! Unit tests for the MNEE REST client
//!
//! These tests run the client against a wiremock server standing in for the
//! MNEE proxy API.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chain_clients_mnee::transaction::txid_of;
use chain_clients_mnee::{
    Environment, MneeClient, MneeError, TicketStatus, TransferCallback, TransferRecipient,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const API_KEY: &str = "test-api-key";

/// WIF of private key 1, owner of `OWNER_ADDR`
const OWNER_WIF: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";
const OWNER_ADDR: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
const RECIPIENT_ADDR: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
const TOKEN_ID: &str = "ae59f3b898ec61acbdb6cc7a245fabeded0c094bf046f35206a3aec60ef88127_0";

fn client_for(server: &MockServer) -> MneeClient {
    MneeClient::with_base_url(Environment::Sandbox, API_KEY, &server.uri())
        .expect("Failed to create MneeClient")
}

fn config_json() -> serde_json::Value {
    json!({
        "decimals": 5,
        "approver": "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        "feeAddress": RECIPIENT_ADDR,
        "burnAddress": RECIPIENT_ADDR,
        "mintAddress": RECIPIENT_ADDR,
        "tokenId": TOKEN_ID,
        "fees": [{"min": 0, "max": 18446744073709551615u64, "fee": 1000}]
    })
}

fn utxo_json(amt: u64) -> serde_json::Value {
    json!({
        "txid": "aa".repeat(32),
        "vout": 0,
        "outpoint": format!("{}_0", "aa".repeat(32)),
        "height": 850000,
        "idx": 3,
        "score": 850000000003u64,
        "satoshis": 1,
        "script": STANDARD.encode([0x76, 0xa9, 0x14]),
        "owners": [OWNER_ADDR],
        "senders": [RECIPIENT_ADDR],
        "data": {
            "bsv21": {"amt": amt, "dec": 5, "id": TOKEN_ID, "op": "transfer", "sym": "MNEE"},
            "cosign": {"address": OWNER_ADDR, "cosigner": "02ab"}
        }
    })
}

async fn mount_config(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/config"))
        .and(query_param("auth_token", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_json()))
        .mount(server)
        .await;
}

async fn mount_utxos(server: &MockServer, amt: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/utxos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([utxo_json(amt)])))
        .mount(server)
        .await;
}

fn recipients(amount: u64) -> Vec<TransferRecipient> {
    vec![TransferRecipient {
        address: RECIPIENT_ADDR.to_string(),
        amount,
    }]
}

fn wifs() -> Vec<String> {
    vec![OWNER_WIF.to_string()]
}

// ============================================================================
// QUERY TESTS
// ============================================================================

/// What is tested: get_config decodes the camelCase system config
/// Why: every transfer depends on tokenId, approver and fee tiers
#[tokio::test]
async fn test_get_config() {
    let server = MockServer::start().await;
    mount_config(&server).await;

    let config = client_for(&server).get_config().await.unwrap();
    assert_eq!(config.decimals, 5);
    assert_eq!(config.token_id.as_deref(), Some(TOKEN_ID));
    assert_eq!(config.fees.len(), 1);
    assert_eq!(config.fee_for(500), Some(1000));
}

/// What is tested: balances carry the human-scaled `precised` value
/// Why: precised is derived client-side from the config decimals
#[tokio::test]
async fn test_get_balances_scales_with_decimals() {
    let server = MockServer::start().await;
    mount_config(&server).await;
    Mock::given(method("POST"))
        .and(path("/v2/balance"))
        .and(body_json(json!([OWNER_ADDR])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"address": OWNER_ADDR, "amt": 150000}])),
        )
        .mount(&server)
        .await;

    let balances = client_for(&server)
        .get_balances(&[OWNER_ADDR.to_string()])
        .await
        .unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].address.as_deref(), Some(OWNER_ADDR));
    assert_eq!(balances[0].amt, 150000.0);
    assert!((balances[0].precised - 1.5).abs() < f64::EPSILON);
}

/// What is tested: paginated UTXO query forwards page, size and ascending order
#[tokio::test]
async fn test_get_paginated_unspent_txos_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/utxos"))
        .and(query_param("page", "2"))
        .and(query_param("size", "25"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([utxo_json(42)])))
        .expect(1)
        .mount(&server)
        .await;

    let utxos = client_for(&server)
        .get_paginated_unspent_txos(&[OWNER_ADDR.to_string()], 2, 25)
        .await
        .unwrap();
    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].token_amount(), Some(42));
    assert_eq!(utxos[0].token_id(), Some(TOKEN_ID));
}

/// What is tested: get_unspent_txos walks pages until a short page
/// Why: "all UTXOs" must not stop at the first page
#[tokio::test]
async fn test_get_unspent_txos_walks_pages() {
    let server = MockServer::start().await;
    let full_page: Vec<_> = (0..100).map(|_| utxo_json(1)).collect();
    Mock::given(method("POST"))
        .and(path("/v2/utxos"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/utxos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([utxo_json(7)])))
        .expect(1)
        .mount(&server)
        .await;

    let utxos = client_for(&server)
        .get_unspent_txos(&[OWNER_ADDR.to_string()])
        .await
        .unwrap();
    assert_eq!(utxos.len(), 101);
}

/// What is tested: get_unspent_txos stops when the API keeps returning the same full page
#[tokio::test]
async fn test_get_unspent_txos_stops_on_repeated_page() {
    let server = MockServer::start().await;
    let full_page: Vec<_> = (0..100).map(|_| utxo_json(1)).collect();
    Mock::given(method("POST"))
        .and(path("/v2/utxos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
        .mount(&server)
        .await;

    let utxos = client_for(&server)
        .get_unspent_txos(&[OWNER_ADDR.to_string()])
        .await
        .unwrap();
    assert_eq!(utxos.len(), 100);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

/// What is tested: history query forwards from/limit
#[tokio::test]
async fn test_get_specific_transaction_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sync"))
        .and(query_param("from", "5"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "txid": "bb".repeat(32),
            "height": 850001,
            "idx": 1,
            "score": 850001000001u64,
            "rawtx": "AQAAAA==",
            "outs": [0, 1],
            "senders": [OWNER_ADDR],
            "receivers": [RECIPIENT_ADDR]
        }])))
        .mount(&server)
        .await;

    let history = client_for(&server)
        .get_specific_transaction_history(&[OWNER_ADDR.to_string()], 5, 3)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].receivers, vec![RECIPIENT_ADDR.to_string()]);
}

// ============================================================================
// TRANSFER TESTS
// ============================================================================

/// What is tested: synchronous transfer reports txid/txhex of the cosigned tx
/// Why: the cosigner returns base64; callers expect hex plus its txid
#[tokio::test]
async fn test_synchronous_transfer_returns_cosigned_tx() {
    let server = MockServer::start().await;
    mount_config(&server).await;
    mount_utxos(&server, 500_000).await;

    let cosigned = vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    Mock::given(method("POST"))
        .and(path("/v1/transfer"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"rawtx": STANDARD.encode(&cosigned)})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .synchronous_transfer(&wifs(), &recipients(10_000))
        .await
        .unwrap();
    assert_eq!(response.txhex.as_deref(), Some(hex::encode(&cosigned).as_str()));
    assert_eq!(response.txid, Some(txid_of(&cosigned)));
}

/// What is tested: asynchronous transfer forwards the callback and returns the ticket id
#[tokio::test]
async fn test_asynchronous_transfer_returns_ticket_id() {
    let server = MockServer::start().await;
    mount_config(&server).await;
    mount_utxos(&server, 500_000).await;
    Mock::given(method("POST"))
        .and(path("/v2/transfer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ticket-123",
            "status": "BROADCASTING"
        })))
        .mount(&server)
        .await;

    let callback = TransferCallback {
        url: Some("https://example.com/hook".to_string()),
        secret: Some("s3cret".to_string()),
    };
    let ticket_id = client_for(&server)
        .asynchronous_transfer(&wifs(), &recipients(10_000), Some(&callback))
        .await
        .unwrap();
    assert_eq!(ticket_id, "ticket-123");

    let requests = server.received_requests().await.unwrap();
    let submit = requests
        .iter()
        .find(|r| r.url.path() == "/v2/transfer")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&submit.body).unwrap();
    assert_eq!(body["callback_url"], "https://example.com/hook");
    assert_eq!(body["callback_secret"], "s3cret");
    assert!(body["rawtx"].as_str().is_some());
}

/// What is tested: an empty ticket id from the server is an error
#[tokio::test]
async fn test_asynchronous_submit_empty_ticket_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/transfer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": ""})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit_raw_tx_async("0100000000", None)
        .await
        .unwrap_err();
    assert!(matches!(err, MneeError::EmptyTicketId));
}

/// What is tested: insufficient token balance is reported before submission
#[tokio::test]
async fn test_transfer_insufficient_balance() {
    let server = MockServer::start().await;
    mount_config(&server).await;
    mount_utxos(&server, 500).await;

    let err = client_for(&server)
        .partial_sign(&wifs(), &recipients(10_000))
        .await
        .unwrap_err();
    assert!(matches!(err, MneeError::InsufficientBalance));
    assert!(err.is_client_error());
}

/// What is tested: partial_sign returns a hex transaction and never calls the cosigner
#[tokio::test]
async fn test_partial_sign_does_not_submit() {
    let server = MockServer::start().await;
    mount_config(&server).await;
    mount_utxos(&server, 500_000).await;
    Mock::given(method("POST"))
        .and(path("/v1/transfer"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let raw_hex = client_for(&server)
        .partial_sign(&wifs(), &recipients(10_000))
        .await
        .unwrap();
    assert!(hex::decode(&raw_hex).is_ok());
    assert!(raw_hex.starts_with("01000000"));
}

/// What is tested: invalid hex is rejected locally
#[tokio::test]
async fn test_submit_raw_tx_invalid_hex() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .submit_raw_tx_sync("not-hex")
        .await
        .unwrap_err();
    assert!(matches!(err, MneeError::InvalidRawTx(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// TICKET TESTS
// ============================================================================

/// What is tested: poll_ticket waits while BROADCASTING and returns the settled ticket
#[tokio::test]
async fn test_poll_ticket_until_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/ticket"))
        .and(query_param("ticketID", "t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-1", "status": "BROADCASTING"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/ticket"))
        .and(query_param("ticketID", "t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-1",
            "tx_id": "cc".repeat(32),
            "status": "SUCCESS",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:05Z",
            "errors": []
        })))
        .mount(&server)
        .await;

    let ticket = client_for(&server)
        .poll_ticket("t-1", Duration::from_millis(10), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Success);
    assert_eq!(ticket.tx_id, Some("cc".repeat(32)));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

/// What is tested: on timeout the last observed ticket is returned
#[tokio::test]
async fn test_poll_ticket_timeout_returns_last_ticket() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/ticket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-2", "status": "BROADCASTING"
        })))
        .mount(&server)
        .await;

    let ticket = client_for(&server)
        .poll_ticket("t-2", Duration::from_millis(20), Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Broadcasting);
}

/// What is tested: a zero poll interval does not hammer the ticket endpoint
#[tokio::test]
async fn test_poll_ticket_zero_interval_is_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/ticket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-3", "status": "BROADCASTING"
        })))
        .mount(&server)
        .await;

    let ticket = client_for(&server)
        .poll_ticket("t-3", Duration::ZERO, Duration::from_millis(200))
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Broadcasting);
    // one check per 50 ms at most
    assert!(server.received_requests().await.unwrap().len() <= 5);
}

/// What is tested: unknown ticket statuses decode instead of failing
#[tokio::test]
async fn test_ticket_unknown_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/ticket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-3", "status": "QUEUED", "callback_secret": "hidden"
        })))
        .mount(&server)
        .await;

    let ticket = client_for(&server).get_ticket("t-3").await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Unknown);
    let echoed = serde_json::to_value(&ticket).unwrap();
    assert!(echoed.get("callback_secret").is_none());
}

// ============================================================================
// ERROR MAPPING TESTS
// ============================================================================

/// What is tested: HTTP 403 maps to Forbidden
#[tokio::test]
async fn test_forbidden_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/config"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client_for(&server).get_config().await.unwrap_err();
    assert!(matches!(err, MneeError::Forbidden));
    assert!(!err.is_client_error());
}

/// What is tested: other non-2xx statuses carry status and body
#[tokio::test]
async fn test_api_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/balance"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    mount_config(&server).await;

    let err = client_for(&server)
        .get_balances(&[OWNER_ADDR.to_string()])
        .await
        .unwrap_err();
    match err {
        MneeError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
