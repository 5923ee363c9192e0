//! Flashbots relay client.
//!
//! # Responsibilities
//! - Serialize `eth_callBundle` / `eth_sendBundle` requests
//! - Authenticate every request body with the relay signing key
//! - Map relay answers onto simulation responses and submission outcomes

use alloy::primitives::{hex, keccak256};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use crate::blockchain::{BlockchainResult, Wallet};
use crate::config::RelayConfig;
use crate::relay::types::{
    hex_quantity, CallBundleParams, JsonRpcRequest, JsonRpcResponse, RelayError, RelayResult,
    SendBundleParams, SendBundleResult, SignedBundle, SimulationResponse, SubmissionOutcome,
    CALL_BUNDLE_METHOD, SEND_BUNDLE_METHOD,
};

/// Header carrying `<address>:<signature>` over the request body.
pub const SIGNATURE_HEADER: &str = "X-Flashbots-Signature";

/// Private bundle relay.
#[async_trait]
pub trait BundleRelay: Send + Sync {
    /// Simulate a bundle against `target_block`.
    async fn simulate(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
    ) -> RelayResult<SimulationResponse>;

    /// Submit a bundle for inclusion in `target_block`.
    async fn submit(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
        builders: &[String],
    ) -> SubmissionOutcome;
}

/// Sign a request body the way the relay expects.
///
/// The message is the `0x`-hex keccak256 of the body, signed as an
/// Ethereum personal message.
pub async fn sign_payload(auth: &Wallet, body: &str) -> BlockchainResult<String> {
    let digest = hex::encode_prefixed(keccak256(body.as_bytes()));
    let signature = auth.sign_message(digest.as_bytes()).await?;
    Ok(format!(
        "{}:{}",
        auth.address(),
        hex::encode_prefixed(signature.as_bytes())
    ))
}

/// HTTP client for a Flashbots-compatible relay.
#[derive(Debug, Clone)]
pub struct FlashbotsRelay {
    http: reqwest::Client,
    url: url::Url,
    auth: Wallet,
}

impl FlashbotsRelay {
    pub fn new(config: &RelayConfig, auth: Wallet, request_timeout: Duration) -> RelayResult<Self> {
        let url = config
            .url
            .parse()
            .map_err(|e: url::ParseError| RelayError::InvalidUrl(format!("'{}': {}", config.url, e)))?;
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;

        tracing::info!(
            relay = %config.url,
            auth_address = %auth.address(),
            "Relay client initialized"
        );

        Ok(Self { http, url, auth })
    }

    /// POST a signed JSON body and return status plus raw text.
    async fn post(&self, body: String) -> RelayResult<(reqwest::StatusCode, String)> {
        let signature = sign_payload(&self.auth, &body).await?;
        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

#[async_trait]
impl BundleRelay for FlashbotsRelay {
    async fn simulate(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
    ) -> RelayResult<SimulationResponse> {
        let request = JsonRpcRequest::new(
            CALL_BUNDLE_METHOD,
            CallBundleParams {
                txs: bundle.raw_transactions(),
                block_number: hex_quantity(target_block),
                state_block_number: "latest".to_string(),
            },
        );
        let body = serde_json::to_string(&request)?;

        tracing::debug!(target_block, txs = bundle.transactions.len(), "Simulating bundle");
        let (status, text) = self.post(body).await?;

        match serde_json::from_str::<SimulationResponse>(&text) {
            Ok(response) if status.is_success() || response.error.is_some() => Ok(response),
            Err(e) if status.is_success() => Err(RelayError::Serialization(e)),
            _ => Err(RelayError::Status {
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    async fn submit(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
        builders: &[String],
    ) -> SubmissionOutcome {
        let request = JsonRpcRequest::new(
            SEND_BUNDLE_METHOD,
            SendBundleParams {
                txs: bundle.raw_transactions(),
                block_number: hex_quantity(target_block),
                builders: builders.to_vec(),
            },
        );
        let body = match serde_json::to_string(&request) {
            Ok(body) => body,
            Err(e) => return SubmissionOutcome::Ambiguous(e.to_string()),
        };

        let (status, text) = match self.post(body).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "Error sending bundle");
                return SubmissionOutcome::Ambiguous(e.to_string());
            }
        };

        let outcome = interpret_submission(status.is_success(), status.as_u16(), &text);
        if !matches!(outcome, SubmissionOutcome::Accepted { .. }) {
            tracing::error!(status = status.as_u16(), body = %text, "Error sending bundle");
        }
        outcome
    }
}

/// Classify a relay answer to `eth_sendBundle`.
pub fn interpret_submission(success: bool, status: u16, body: &str) -> SubmissionOutcome {
    match serde_json::from_str::<JsonRpcResponse<SendBundleResult>>(body) {
        Ok(JsonRpcResponse {
            error: Some(error), ..
        }) => SubmissionOutcome::Rejected(error.message),
        Ok(JsonRpcResponse {
            result: Some(result),
            ..
        }) if success => SubmissionOutcome::Accepted {
            bundle_hash: result.bundle_hash,
            tx_hashes: result
                .bundle_transactions
                .into_iter()
                .map(|tx| tx.hash)
                .collect(),
        },
        _ if !success => SubmissionOutcome::Rejected(format!("HTTP {}: {}", status, body)),
        _ => SubmissionOutcome::Ambiguous(format!("unrecognised relay response: {}", body)),
    }
}
