//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use wallet_disperse::blockchain::{
    BlockchainError, BlockchainResult, ChainClient, ChainId, LatestBlock, SignedTransfer,
    TransferReceipt, Wallet,
};
use wallet_disperse::config::{
    AppConfig, ChainConfig, FeeConfig, KeyConfig, PrivateKey, RelayConfig, ReportConfig,
};
use wallet_disperse::relay::{
    BundleRelay, RelayResult, SignedBundle, SimulationResponse, SubmissionOutcome,
};

// Anvil's default accounts.
pub const FUNDING_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const COLLECTION_KEYS: [&str; 3] = [
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    "7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6",
];
pub const RELAY_KEY: &str = "47e179ec197488593b187f80a00eb0da91f1b9d0b13f8733639f19c30a34926a";

pub const ETHER: u64 = 1_000_000_000_000_000_000;
pub const GWEI: u128 = 1_000_000_000;

pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(ETHER)
}

pub fn address_of(key: &str) -> Address {
    Wallet::from_private_key(key, 1).unwrap().address()
}

/// Config with the funding key and the first `collection` collection keys.
pub fn test_config(collection: usize, gas_limit: u64, priority_fee: u128) -> AppConfig {
    AppConfig {
        chain: ChainConfig::default(),
        keys: KeyConfig {
            relay_signing_key: PrivateKey::new(RELAY_KEY),
            funding_key: PrivateKey::new(FUNDING_KEY),
            collection_keys: COLLECTION_KEYS[..collection]
                .iter()
                .map(|k| PrivateKey::new(*k))
                .collect(),
        },
        fees: FeeConfig {
            max_priority_fee_per_gas: priority_fee,
            gas_limit,
        },
        relay: RelayConfig::default(),
        report: ReportConfig::default(),
    }
}

/// A transfer the mock chain accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTx {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
    pub tx_hash: TxHash,
}

#[derive(Debug, Default)]
struct ChainState {
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    base_fee: u128,
    block_number: u64,
    sent: Vec<SentTx>,
}

/// In-memory chain: accounts, nonces and a block counter.
///
/// Every accepted transfer is mined immediately in its own block and pays
/// 21000 gas at `min(max_fee, base_fee + priority_fee)`.
pub struct MockChain {
    chain_id: u64,
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new(chain_id: u64, base_fee: u128) -> Self {
        Self {
            chain_id,
            state: Mutex::new(ChainState {
                base_fee,
                block_number: 17_000_000,
                ..Default::default()
            }),
        }
    }

    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.state.lock().unwrap().balances.insert(address, balance);
        self
    }

    pub fn with_nonce(self, address: Address, nonce: u64) -> Self {
        self.state.lock().unwrap().nonces.insert(address, nonce);
        self
    }

    pub fn balance(&self, address: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().unwrap().block_number
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        Ok(ChainId(self.chain_id))
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        Ok(self.balance(address))
    }

    async fn get_latest_block(&self) -> BlockchainResult<LatestBlock> {
        let state = self.state.lock().unwrap();
        Ok(LatestBlock {
            number: state.block_number,
            base_fee_per_gas: state.base_fee,
        })
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        Ok(self.block_number())
    }

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .nonces
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn send_transaction(&self, tx: &SignedTransfer) -> BlockchainResult<TransferReceipt> {
        const GAS_USED: u64 = 21_000;

        let transfer = &tx.transfer;
        let mut state = self.state.lock().unwrap();

        let expected_nonce = state.nonces.get(&transfer.from).copied().unwrap_or_default();
        if transfer.nonce != expected_nonce {
            return Err(BlockchainError::Rpc(format!(
                "nonce mismatch: expected {}, got {}",
                expected_nonce, transfer.nonce
            )));
        }

        let price = transfer
            .fees
            .max_fee_per_gas
            .min(state.base_fee + transfer.fees.max_priority_fee_per_gas);
        let cost = transfer.value + U256::from(GAS_USED) * U256::from(price);
        let balance = state.balances.get(&transfer.from).copied().unwrap_or_default();
        let remaining = balance
            .checked_sub(cost)
            .ok_or_else(|| BlockchainError::Rpc("insufficient funds for gas * price + value".to_string()))?;

        state.balances.insert(transfer.from, remaining);
        *state.balances.entry(transfer.to).or_default() += transfer.value;
        state.nonces.insert(transfer.from, expected_nonce + 1);
        state.block_number += 1;
        state.sent.push(SentTx {
            from: transfer.from,
            to: transfer.to,
            value: transfer.value,
            nonce: transfer.nonce,
            tx_hash: tx.tx_hash,
        });

        Ok(TransferReceipt {
            tx_hash: tx.tx_hash,
            block_number: Some(state.block_number),
            gas_used: GAS_USED,
        })
    }
}

/// A recorded `submit` call.
#[derive(Debug, Clone)]
pub struct Submission {
    pub raw_transactions: Vec<String>,
    pub target_block: u64,
    pub builders: Vec<String>,
}

/// Relay with a scripted simulation body and submission outcome.
pub struct MockRelay {
    simulation: String,
    outcome: SubmissionOutcome,
    simulations: Mutex<Vec<u64>>,
    submissions: Mutex<Vec<Submission>>,
}

impl MockRelay {
    pub fn new(simulation: &str, outcome: SubmissionOutcome) -> Self {
        Self {
            simulation: simulation.to_string(),
            outcome,
            simulations: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Clean simulation, accepted submission without transaction hashes.
    pub fn accepting() -> Self {
        Self::new(
            r#"{"jsonrpc":"2.0","id":1,"result":{"bundleHash":"0xb0b","results":[]}}"#,
            SubmissionOutcome::Accepted {
                bundle_hash: Some("0xb0b".to_string()),
                tx_hashes: vec![],
            },
        )
    }

    pub fn simulations(&self) -> Vec<u64> {
        self.simulations.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BundleRelay for MockRelay {
    async fn simulate(
        &self,
        _bundle: &SignedBundle,
        target_block: u64,
    ) -> RelayResult<SimulationResponse> {
        self.simulations.lock().unwrap().push(target_block);
        Ok(serde_json::from_str(&self.simulation)?)
    }

    async fn submit(
        &self,
        bundle: &SignedBundle,
        target_block: u64,
        builders: &[String],
    ) -> SubmissionOutcome {
        self.submissions.lock().unwrap().push(Submission {
            raw_transactions: bundle.raw_transactions(),
            target_block,
            builders: builders.to_vec(),
        });
        self.outcome.clone()
    }
}

/// An HTTP request as received by the mock relay server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Start a mock relay that answers every request with `status` and `response`
/// and records what it received. Returns the base URL and the capture log.
pub async fn start_mock_relay(
    status: u16,
    response: &'static str,
) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let log = captured.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                if let Some(request) = read_request(&mut socket).await {
                    log.lock().unwrap().push(request);
                }
                let status_text = match status {
                    200 => "200 OK",
                    400 => "400 Bad Request",
                    403 => "403 Forbidden",
                    500 => "500 Internal Server Error",
                    _ => "200 OK",
                };
                let reply = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    response.len(),
                    response
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), captured)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (body_start + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[body_start..body_end]).to_string();

    Some(CapturedRequest {
        request_line,
        headers,
        body,
    })
}
