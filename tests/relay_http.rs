mod common;

use std::time::Duration;

use alloy::primitives::{hex, keccak256, Signature, U256};
use common::*;
use wallet_disperse::blockchain::transaction::sign_all;
use wallet_disperse::blockchain::{FeeParams, PlannedTransfer, SignerRole, Wallet, WalletSet};
use wallet_disperse::config::RelayConfig;
use wallet_disperse::relay::{BundleRelay, FlashbotsRelay, SignedBundle, SubmissionOutcome};

fn relay_config(url: &str) -> RelayConfig {
    RelayConfig {
        url: url.to_string(),
        ..RelayConfig::default()
    }
}

async fn two_transfer_bundle() -> SignedBundle {
    let wallets = WalletSet::from_keys(&test_config(2, 21_000, GWEI).keys, 1).unwrap();
    let transfers: Vec<PlannedTransfer> = wallets
        .collection()
        .iter()
        .enumerate()
        .map(|(i, target)| PlannedTransfer {
            signer: SignerRole::Funding,
            from: wallets.funding().address(),
            to: target.address(),
            value: U256::from(ETHER),
            nonce: i as u64,
            gas_limit: 21_000,
            fees: FeeParams::from_base_fee(10 * GWEI, GWEI),
        })
        .collect();
    SignedBundle::new(sign_all(&wallets, &transfers).await.unwrap())
}

fn auth() -> Wallet {
    Wallet::from_private_key(RELAY_KEY, 1).unwrap()
}

#[tokio::test]
async fn test_send_bundle_request_layout_and_signature() {
    let (url, captured) = start_mock_relay(
        200,
        r#"{"jsonrpc":"2.0","id":1,"result":{"bundleHash":"0xfeed"}}"#,
    )
    .await;
    let relay = FlashbotsRelay::new(&relay_config(&url), auth(), Duration::from_secs(5)).unwrap();
    let bundle = two_transfer_bundle().await;

    let outcome = relay
        .submit(&bundle, 0x1036641, &["flashbots".to_string(), "Titan".to_string()])
        .await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Accepted {
            bundle_hash: Some("0xfeed".to_string()),
            tx_hashes: vec![],
        }
    );

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.request_line.starts_with("POST "));
    assert_eq!(request.header("content-type"), Some("application/json"));

    let raw = bundle.raw_transactions();
    let expected_body = format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"eth_sendBundle","params":[{{"txs":["{}","{}"],"blockNumber":"0x1036641","builders":["flashbots","Titan"]}}]}}"#,
        raw[0], raw[1]
    );
    assert_eq!(request.body, expected_body);

    let header = request.header("x-flashbots-signature").unwrap();
    let (address, signature) = header.split_once(':').unwrap();
    assert_eq!(address, auth().address().to_string());

    let signature = Signature::try_from(hex::decode(signature).unwrap().as_slice()).unwrap();
    let digest = hex::encode_prefixed(keccak256(request.body.as_bytes()));
    let recovered = signature
        .recover_address_from_msg(digest.as_bytes())
        .unwrap();
    assert_eq!(recovered, auth().address());
}

#[tokio::test]
async fn test_call_bundle_request_and_simulation_parse() {
    let (url, captured) = start_mock_relay(
        200,
        r#"{"jsonrpc":"2.0","id":1,"result":{"bundleHash":"0xabc","results":[{"txHash":"0x01"},{"txHash":"0x02","error":"execution reverted","revert":"0x6f6f7073"}]}}"#,
    )
    .await;
    let relay = FlashbotsRelay::new(&relay_config(&url), auth(), Duration::from_secs(5)).unwrap();
    let bundle = two_transfer_bundle().await;

    let simulation = relay.simulate(&bundle, 255).await.unwrap();
    let result = simulation.result.unwrap();
    assert_eq!(result.bundle_hash.as_deref(), Some("0xabc"));
    assert_eq!(result.results[1].revert.as_deref(), Some("0x6f6f7073"));

    let requests = captured.lock().unwrap().clone();
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["method"], "eth_callBundle");
    assert_eq!(body["params"][0]["blockNumber"], "0xff");
    assert_eq!(body["params"][0]["stateBlockNumber"], "latest");
    assert_eq!(body["params"][0]["txs"].as_array().unwrap().len(), 2);
    assert!(requests[0].header("x-flashbots-signature").is_some());
}

#[tokio::test]
async fn test_relay_http_error_is_rejected() {
    let (url, _) = start_mock_relay(
        400,
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid bundle"}}"#,
    )
    .await;
    let relay = FlashbotsRelay::new(&relay_config(&url), auth(), Duration::from_secs(5)).unwrap();

    let outcome = relay
        .submit(&two_transfer_bundle().await, 1, &["flashbots".to_string()])
        .await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Rejected("invalid bundle".to_string())
    );
}

#[tokio::test]
async fn test_unreachable_relay_is_ambiguous() {
    // Bind and drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let relay = FlashbotsRelay::new(&relay_config(&url), auth(), Duration::from_secs(2)).unwrap();
    let outcome = relay
        .submit(&two_transfer_bundle().await, 1, &["flashbots".to_string()])
        .await;
    assert!(matches!(outcome, SubmissionOutcome::Ambiguous(_)));
}

#[tokio::test]
async fn test_unreachable_relay_fails_simulation() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let relay = FlashbotsRelay::new(&relay_config(&url), auth(), Duration::from_secs(2)).unwrap();
    assert!(relay.simulate(&two_transfer_bundle().await, 1).await.is_err());
}
