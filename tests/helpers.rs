//! Shared test helpers for the gateway tests
//!
//! The module is organized into two categories:
//! - **Constants**: valid addresses, keys and ids used across tests
//! - **Fake client**: an in-memory `MneeApi` that records every call

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chain_clients_mnee::{
    BalanceData, Fee, MneeError, MneeTxo, Result, SystemConfig, Ticket, TicketStatus,
    TransactionHistory, TransferCallback, TransferRecipient, TransferResponse,
};
use mnee_api::{ApiServer, Config, MneeApi};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Valid mainnet P2PKH address
pub const DUMMY_ADDR_A: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

/// Valid mainnet P2PKH address (key 1)
pub const DUMMY_ADDR_B: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";

/// WIF of private key 1
pub const DUMMY_WIF: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";

pub const DUMMY_TICKET_ID: &str = "9b1e4c1a-7d0f-4f55-9a0b-2f3c7f6f1e01";

pub const DUMMY_TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

pub const DUMMY_TOKEN_ID: &str =
    "ae59f3b898ec61acbdb6cc7a245fabeded0c094bf046f35206a3aec60ef88127_0";

// ============================================================================
// FAKE CLIENT
// ============================================================================

/// One recorded call into the fake client
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Balances(Vec<String>),
    UnspentTxos(Vec<String>),
    PaginatedTxos {
        addresses: Vec<String>,
        page: u32,
        size: u32,
    },
    History {
        addresses: Vec<String>,
        from_score: u64,
        limit: u64,
    },
    SyncTransfer {
        wifs: Vec<String>,
        recipients: Vec<TransferRecipient>,
    },
    AsyncTransfer {
        wifs: Vec<String>,
        recipients: Vec<TransferRecipient>,
        callback: Option<TransferCallback>,
    },
    SubmitSync(String),
    SubmitAsync {
        raw_tx_hex: String,
        callback: Option<TransferCallback>,
    },
    PartialSign {
        wifs: Vec<String>,
        recipients: Vec<TransferRecipient>,
    },
    PollTicket {
        ticket_id: String,
        interval: Duration,
        timeout: Duration,
    },
    Config,
}

/// In-memory `MneeApi` returning canned data and recording calls.
#[derive(Default)]
pub struct FakeMnee {
    calls: Mutex<Vec<Call>>,
    /// Balances returned by `get_balances` (empty by default)
    pub balances: Vec<BalanceData>,
    /// When set, every call fails with the produced error
    pub failure: Option<fn() -> MneeError>,
}

impl FakeMnee {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: Vec<BalanceData>) -> Self {
        Self {
            balances,
            ..Self::default()
        }
    }

    pub fn failing(failure: fn() -> MneeError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure {
            Some(make_error) => Err(make_error()),
            None => Ok(()),
        }
    }
}

pub fn dummy_ticket(status: TicketStatus) -> Ticket {
    Ticket {
        id: Some(DUMMY_TICKET_ID.to_string()),
        tx_id: Some(DUMMY_TXID.to_string()),
        tx_hex: None,
        action_requested: Some("transfer".to_string()),
        callback_url: None,
        callback_secret: Some("never-echoed".to_string()),
        status,
        created_at: None,
        updated_at: None,
        errors: Vec::new(),
    }
}

pub fn dummy_utxo() -> MneeTxo {
    serde_json::from_value(serde_json::json!({
        "txid": DUMMY_TXID,
        "vout": 1,
        "outpoint": format!("{}_1", DUMMY_TXID),
        "height": 850000,
        "idx": 12,
        "score": 850000000012u64,
        "satoshis": 1,
        "owners": [DUMMY_ADDR_A],
        "data": {"bsv21": {"amt": 250000, "dec": 5, "id": DUMMY_TOKEN_ID, "op": "transfer"}}
    }))
    .unwrap()
}

#[async_trait]
impl MneeApi for FakeMnee {
    async fn get_balances(&self, addresses: &[String]) -> Result<Vec<BalanceData>> {
        self.record(Call::Balances(addresses.to_vec()))?;
        Ok(self.balances.clone())
    }

    async fn get_unspent_txos(&self, addresses: &[String]) -> Result<Vec<MneeTxo>> {
        self.record(Call::UnspentTxos(addresses.to_vec()))?;
        Ok(vec![dummy_utxo()])
    }

    async fn get_paginated_unspent_txos(
        &self,
        addresses: &[String],
        page: u32,
        size: u32,
    ) -> Result<Vec<MneeTxo>> {
        self.record(Call::PaginatedTxos {
            addresses: addresses.to_vec(),
            page,
            size,
        })?;
        Ok(vec![dummy_utxo()])
    }

    async fn get_specific_transaction_history(
        &self,
        addresses: &[String],
        from_score: u64,
        limit: u64,
    ) -> Result<Vec<TransactionHistory>> {
        self.record(Call::History {
            addresses: addresses.to_vec(),
            from_score,
            limit,
        })?;
        Ok(vec![TransactionHistory {
            height: 850000,
            idx: 12,
            score: 850000000012,
            rawtx: None,
            txid: Some(DUMMY_TXID.to_string()),
            outs: vec![0, 1],
            senders: vec![DUMMY_ADDR_B.to_string()],
            receivers: vec![DUMMY_ADDR_A.to_string()],
        }])
    }

    async fn synchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<TransferResponse> {
        self.record(Call::SyncTransfer {
            wifs: wifs.to_vec(),
            recipients: recipients.to_vec(),
        })?;
        Ok(TransferResponse {
            txid: Some(DUMMY_TXID.to_string()),
            txhex: Some("0100000000".to_string()),
        })
    }

    async fn asynchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
        callback: Option<&TransferCallback>,
    ) -> Result<String> {
        self.record(Call::AsyncTransfer {
            wifs: wifs.to_vec(),
            recipients: recipients.to_vec(),
            callback: callback.cloned(),
        })?;
        Ok(DUMMY_TICKET_ID.to_string())
    }

    async fn submit_raw_tx_sync(&self, raw_tx_hex: &str) -> Result<TransferResponse> {
        self.record(Call::SubmitSync(raw_tx_hex.to_string()))?;
        Ok(TransferResponse {
            txid: Some(DUMMY_TXID.to_string()),
            txhex: Some(raw_tx_hex.to_string()),
        })
    }

    async fn submit_raw_tx_async(
        &self,
        raw_tx_hex: &str,
        callback: Option<&TransferCallback>,
    ) -> Result<String> {
        self.record(Call::SubmitAsync {
            raw_tx_hex: raw_tx_hex.to_string(),
            callback: callback.cloned(),
        })?;
        Ok(DUMMY_TICKET_ID.to_string())
    }

    async fn partial_sign(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<String> {
        self.record(Call::PartialSign {
            wifs: wifs.to_vec(),
            recipients: recipients.to_vec(),
        })?;
        Ok("01000000deadbeef".to_string())
    }

    async fn poll_ticket(
        &self,
        ticket_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Ticket> {
        self.record(Call::PollTicket {
            ticket_id: ticket_id.to_string(),
            interval,
            timeout,
        })?;
        Ok(dummy_ticket(TicketStatus::Success))
    }

    async fn get_config(&self) -> Result<SystemConfig> {
        self.record(Call::Config)?;
        Ok(SystemConfig {
            decimals: 5,
            token_id: Some(DUMMY_TOKEN_ID.to_string()),
            fees: vec![Fee {
                min: 0,
                max: 1_000_000,
                fee: 1000,
            }],
            ..SystemConfig::default()
        })
    }
}

// ============================================================================
// SERVER BUILDERS
// ============================================================================

/// Gateway configuration used by route tests
pub fn build_test_config() -> Config {
    Config {
        mnee_api_key: "test-api-key".to_string(),
        ticket_poll_interval_ms: 5,
        ticket_poll_timeout_ms: 50,
        ..Config::default()
    }
}

/// Builds an API server over `fake`, returning the fake for call inspection.
pub fn build_test_server(fake: FakeMnee) -> (ApiServer, Arc<FakeMnee>) {
    let fake = Arc::new(fake);
    let server = ApiServer::new(build_test_config(), fake.clone());
    (server, fake)
}
