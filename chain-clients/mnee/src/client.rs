//! MNEE REST client
//!
//! Thin async client over the MNEE proxy API. Every call authenticates with
//! the API key as the `auth_token` query parameter.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::address::PrivateKey;
use crate::builder;
use crate::error::{MneeError, Result};
use crate::transaction::txid_of;
use crate::types::{
    BalanceData, CosignedTx, MneeTxo, RawBalance, SystemConfig, Ticket, TransactionHistory,
    TransferCallback, TransferRecipient, TransferRequest, TransferResponse,
};

const PRODUCTION_API_URL: &str = "https://proxy-api.mnee.net";
const SANDBOX_API_URL: &str = "https://sandbox-proxy-api.mnee.net";

/// Page size used when walking every UTXO page.
const ALL_UTXOS_PAGE_SIZE: u32 = 100;

/// Upper bound on pages walked by `get_unspent_txos`.
const MAX_UTXO_PAGES: u32 = 1000;

/// Shortest wait between two ticket status checks.
const MIN_TICKET_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// ENVIRONMENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    /// Case-insensitive "production" selects production; anything else is sandbox.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub fn api_url(self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_API_URL,
            Environment::Sandbox => SANDBOX_API_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
        }
    }
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct MneeClient {
    client: Client,
    base_url: String,
    api_key: String,
    environment: Environment,
}

impl MneeClient {
    /// Creates a client for `environment` using its public API URL.
    pub fn new(environment: Environment, api_key: &str) -> Result<Self> {
        Self::with_base_url(environment, api_key, environment.api_url())
    }

    /// Creates a client against an explicit API URL (self-hosted proxy, tests).
    pub fn with_base_url(environment: Environment, api_key: &str, base_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(MneeError::InvalidConfig("API key is required".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(MneeError::InvalidEnvironment);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            environment,
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub async fn get_config(&self) -> Result<SystemConfig> {
        self.send(self.get("/v1/config")).await
    }

    /// Balances for `addresses`, scaled with the token's decimals.
    pub async fn get_balances(&self, addresses: &[String]) -> Result<Vec<BalanceData>> {
        let config = self.get_config().await?;
        let raw: Vec<RawBalance> = self
            .send(self.post("/v2/balance").json(addresses))
            .await?;

        Ok(raw
            .into_iter()
            .map(|b| BalanceData {
                address: b.address,
                amt: b.amt as f64,
                precised: config.to_precised(b.amt),
            })
            .collect())
    }

    pub async fn get_paginated_unspent_txos(
        &self,
        addresses: &[String],
        page: u32,
        size: u32,
    ) -> Result<Vec<MneeTxo>> {
        let request = self
            .post("/v2/utxos")
            .query(&[("page", page.to_string()), ("size", size.to_string())])
            .query(&[("order", "asc")])
            .json(addresses);
        self.send(request).await
    }

    /// Walks every UTXO page until a short page is returned.
    ///
    /// Stops early when the API repeats the previous page, and fails once
    /// `MAX_UTXO_PAGES` full pages have been read.
    pub async fn get_unspent_txos(&self, addresses: &[String]) -> Result<Vec<MneeTxo>> {
        let mut all: Vec<MneeTxo> = Vec::new();
        let mut previous: Option<Vec<MneeTxo>> = None;
        let mut page = 1;
        loop {
            let batch = self
                .get_paginated_unspent_txos(addresses, page, ALL_UTXOS_PAGE_SIZE)
                .await?;
            if previous.as_ref() == Some(&batch) {
                warn!("UTXO page {} repeats page {}, stopping", page, page - 1);
                break;
            }
            if batch.len() < ALL_UTXOS_PAGE_SIZE as usize {
                all.extend(batch);
                break;
            }
            if page >= MAX_UTXO_PAGES {
                return Err(MneeError::Api {
                    status: 500,
                    message: format!("UTXO listing exceeded {} pages", MAX_UTXO_PAGES),
                });
            }
            all.extend(batch.iter().cloned());
            previous = Some(batch);
            page += 1;
        }
        debug!("Fetched {} UTXOs across {} page(s)", all.len(), page);
        Ok(all)
    }

    pub async fn get_specific_transaction_history(
        &self,
        addresses: &[String],
        from_score: u64,
        limit: u64,
    ) -> Result<Vec<TransactionHistory>> {
        let request = self
            .post("/v1/sync")
            .query(&[("from", from_score), ("limit", limit)])
            .json(addresses);
        self.send(request).await
    }

    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket> {
        self.send(self.get("/v2/ticket").query(&[("ticketID", ticket_id)]))
            .await
    }

    /// Polls a ticket every `interval` (at least 50 ms) until it leaves
    /// BROADCASTING or `timeout` elapses. On timeout the last observed ticket
    /// is returned.
    pub async fn poll_ticket(
        &self,
        ticket_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Ticket> {
        if ticket_id.trim().is_empty() {
            return Err(MneeError::EmptyTicketId);
        }

        let interval = interval.max(MIN_TICKET_POLL_INTERVAL);
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let ticket = self.get_ticket(ticket_id).await?;
            if ticket.status.is_terminal() {
                return Ok(ticket);
            }
            if tokio::time::Instant::now() + interval > deadline {
                warn!("Ticket {} still {:?} after {:?}", ticket_id, ticket.status, timeout);
                return Ok(ticket);
            }
            tokio::time::sleep(interval).await;
        }
    }

    // ------------------------------------------------------------------------
    // Transfers
    // ------------------------------------------------------------------------

    /// Builds and owner-signs a transfer without submitting it. Returns hex.
    pub async fn partial_sign(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<String> {
        let raw = self.build_signed_transfer(wifs, recipients).await?;
        Ok(hex::encode(raw))
    }

    /// Builds, signs and submits a transfer, waiting for the cosigner.
    pub async fn synchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<TransferResponse> {
        let raw = self.build_signed_transfer(wifs, recipients).await?;
        self.submit_sync(&raw).await
    }

    /// Builds, signs and submits a transfer; returns the ticket id.
    pub async fn asynchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
        callback: Option<&TransferCallback>,
    ) -> Result<String> {
        let raw = self.build_signed_transfer(wifs, recipients).await?;
        self.submit_async(&raw, callback).await
    }

    pub async fn submit_raw_tx_sync(&self, raw_tx_hex: &str) -> Result<TransferResponse> {
        let raw = decode_raw_tx(raw_tx_hex)?;
        self.submit_sync(&raw).await
    }

    pub async fn submit_raw_tx_async(
        &self,
        raw_tx_hex: &str,
        callback: Option<&TransferCallback>,
    ) -> Result<String> {
        let raw = decode_raw_tx(raw_tx_hex)?;
        self.submit_async(&raw, callback).await
    }

    async fn build_signed_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<Vec<u8>> {
        if recipients.is_empty() {
            return Err(MneeError::NoRecipients);
        }
        if recipients.iter().any(|r| r.amount == 0) {
            return Err(MneeError::TransferAmountNotPositive);
        }
        if wifs.is_empty() {
            return Err(MneeError::NoSigningKeys);
        }

        let keys = wifs
            .iter()
            .map(|wif| PrivateKey::from_wif(wif))
            .collect::<Result<Vec<_>>>()?;

        let mut owners: Vec<String> = keys.iter().map(|k| k.address().to_string()).collect();
        owners.dedup();

        let config = self.get_config().await?;
        let utxos = self.get_unspent_txos(&owners).await?;
        let tx = builder::build_transfer(&config, &keys, recipients, &utxos)?;

        info!("Signed transfer {} for {} recipient(s)", tx.txid(), recipients.len());
        Ok(tx.to_bytes())
    }

    async fn submit_sync(&self, raw: &[u8]) -> Result<TransferResponse> {
        let body = TransferRequest {
            rawtx: STANDARD.encode(raw),
            callback_url: None,
            callback_secret: None,
        };
        let reply: CosignedTx = self.send(self.post("/v1/transfer").json(&body)).await?;

        let cosigned = reply
            .rawtx
            .ok_or_else(|| MneeError::Decode("cosigner reply is missing rawtx".to_string()))?;
        let bytes = STANDARD
            .decode(cosigned)
            .map_err(|e| MneeError::Decode(format!("cosigned rawtx is not base64: {}", e)))?;

        Ok(TransferResponse {
            txid: Some(txid_of(&bytes)),
            txhex: Some(hex::encode(&bytes)),
        })
    }

    async fn submit_async(&self, raw: &[u8], callback: Option<&TransferCallback>) -> Result<String> {
        let body = TransferRequest {
            rawtx: STANDARD.encode(raw),
            callback_url: callback.and_then(|c| c.url.clone()),
            callback_secret: callback.and_then(|c| c.secret.clone()),
        };
        let ticket: Ticket = self.send(self.post("/v2/transfer").json(&body)).await?;

        match ticket.id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(MneeError::EmptyTicketId),
        }
    }

    // ------------------------------------------------------------------------
    // HTTP plumbing
    // ------------------------------------------------------------------------

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("auth_token", self.api_key.as_str())])
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .query(&[("auth_token", self.api_key.as_str())])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            return Err(MneeError::Forbidden);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MneeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MneeError::Decode(e.to_string()))
    }
}

fn decode_raw_tx(raw_tx_hex: &str) -> Result<Vec<u8>> {
    let trimmed = raw_tx_hex.trim();
    if trimmed.is_empty() {
        return Err(MneeError::InvalidRawTx("empty transaction".to_string()));
    }
    hex::decode(trimmed).map_err(|e| MneeError::InvalidRawTx(e.to_string()))
}
