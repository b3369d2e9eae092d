//! MNEE client seam
//!
//! Handlers reach the MNEE SDK only through the `MneeApi` trait, so the
//! gateway can run against the real client or a test double.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chain_clients_mnee::{
    BalanceData, Environment, MneeClient, MneeTxo, Result, SystemConfig, Ticket,
    TransactionHistory, TransferCallback, TransferRecipient, TransferResponse,
};
use tracing::info;

use crate::config::Config;

/// Capability set the gateway needs from the MNEE SDK.
#[async_trait]
pub trait MneeApi: Send + Sync {
    async fn get_balances(&self, addresses: &[String]) -> Result<Vec<BalanceData>>;

    async fn get_unspent_txos(&self, addresses: &[String]) -> Result<Vec<MneeTxo>>;

    async fn get_paginated_unspent_txos(
        &self,
        addresses: &[String],
        page: u32,
        size: u32,
    ) -> Result<Vec<MneeTxo>>;

    async fn get_specific_transaction_history(
        &self,
        addresses: &[String],
        from_score: u64,
        limit: u64,
    ) -> Result<Vec<TransactionHistory>>;

    async fn synchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<TransferResponse>;

    /// Returns the ticket id of the submitted transfer.
    async fn asynchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
        callback: Option<&TransferCallback>,
    ) -> Result<String>;

    async fn submit_raw_tx_sync(&self, raw_tx_hex: &str) -> Result<TransferResponse>;

    /// Returns the ticket id of the submitted transaction.
    async fn submit_raw_tx_async(
        &self,
        raw_tx_hex: &str,
        callback: Option<&TransferCallback>,
    ) -> Result<String>;

    /// Returns the owner-signed transaction as hex, without submitting it.
    async fn partial_sign(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<String>;

    async fn poll_ticket(
        &self,
        ticket_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Ticket>;

    async fn get_config(&self) -> Result<SystemConfig>;
}

#[async_trait]
impl MneeApi for MneeClient {
    async fn get_balances(&self, addresses: &[String]) -> Result<Vec<BalanceData>> {
        MneeClient::get_balances(self, addresses).await
    }

    async fn get_unspent_txos(&self, addresses: &[String]) -> Result<Vec<MneeTxo>> {
        MneeClient::get_unspent_txos(self, addresses).await
    }

    async fn get_paginated_unspent_txos(
        &self,
        addresses: &[String],
        page: u32,
        size: u32,
    ) -> Result<Vec<MneeTxo>> {
        MneeClient::get_paginated_unspent_txos(self, addresses, page, size).await
    }

    async fn get_specific_transaction_history(
        &self,
        addresses: &[String],
        from_score: u64,
        limit: u64,
    ) -> Result<Vec<TransactionHistory>> {
        MneeClient::get_specific_transaction_history(self, addresses, from_score, limit).await
    }

    async fn synchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<TransferResponse> {
        MneeClient::synchronous_transfer(self, wifs, recipients).await
    }

    async fn asynchronous_transfer(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
        callback: Option<&TransferCallback>,
    ) -> Result<String> {
        MneeClient::asynchronous_transfer(self, wifs, recipients, callback).await
    }

    async fn submit_raw_tx_sync(&self, raw_tx_hex: &str) -> Result<TransferResponse> {
        MneeClient::submit_raw_tx_sync(self, raw_tx_hex).await
    }

    async fn submit_raw_tx_async(
        &self,
        raw_tx_hex: &str,
        callback: Option<&TransferCallback>,
    ) -> Result<String> {
        MneeClient::submit_raw_tx_async(self, raw_tx_hex, callback).await
    }

    async fn partial_sign(
        &self,
        wifs: &[String],
        recipients: &[TransferRecipient],
    ) -> Result<String> {
        MneeClient::partial_sign(self, wifs, recipients).await
    }

    async fn poll_ticket(
        &self,
        ticket_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Ticket> {
        MneeClient::poll_ticket(self, ticket_id, interval, timeout).await
    }

    async fn get_config(&self) -> Result<SystemConfig> {
        MneeClient::get_config(self).await
    }
}

/// Builds the process-wide MNEE client from configuration.
///
/// # Returns
///
/// * `Ok(MneeClient)` - Client bound to the configured environment and key
/// * `Err(anyhow::Error)` - API key missing or the client rejected its settings
pub fn init_mnee_client(config: &Config) -> anyhow::Result<MneeClient> {
    if config.mnee_api_key.trim().is_empty() {
        anyhow::bail!("MNEE_API_KEY is required");
    }

    let environment = Environment::from_name(&config.mnee_env);
    let client = match config.api_url_override() {
        Some(url) => MneeClient::with_base_url(environment, &config.mnee_api_key, url),
        None => MneeClient::new(environment, &config.mnee_api_key),
    }
    .context("Failed to initialize MNEE client")?;

    info!(
        "MNEE client initialized ({} at {})",
        environment.as_str(),
        client.base_url()
    );
    Ok(client)
}
