//! Transfer and raw transaction endpoints
//!
//! Transfer bodies carry decimal MNEE amounts; they are converted to atomic
//! units before reaching the client. Raw submission bodies carry a hex
//! transaction that the caller already signed.

use std::sync::Arc;

use chain_clients_mnee::{validate_address, TransferCallback, TransferRecipient};
use serde::{Deserialize, Serialize};
use tracing::info;
use warp::{Rejection, Reply};

use super::generic::{json_ok, ApiError};
use crate::mnee_client::MneeApi;

/// Atomic units per MNEE
const ATOMIC_UNITS_PER_MNEE: f64 = 100_000.0;

// ============================================================================
// REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// One destination of a transfer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientRequest {
    pub address: String,
    /// Decimal MNEE amount
    pub amount: f64,
}

/// Body of the transfer, transfer-async and partial-sign endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub request: Vec<RecipientRequest>,
    pub wifs: Vec<String>,
    /// Webhook for async transfers
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub callback_secret: Option<String>,
}

/// Body of the raw submission endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTxRequest {
    pub raw_tx_hex: String,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub callback_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketIdResponse {
    pub ticket_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSignResponse {
    pub raw_tx_hex: String,
}

// ============================================================================
// REQUEST CONVERSION
// ============================================================================

/// Converts a decimal MNEE amount to atomic units, rounding to the nearest unit.
pub fn to_atomic_amount(amount: f64) -> Result<u64, ApiError> {
    let atomic = (amount * ATOMIC_UNITS_PER_MNEE).round();
    if amount.is_nan() || atomic < 1.0 {
        return Err(ApiError::bad_request("Amount must be greater than 0"));
    }
    if atomic >= u64::MAX as f64 {
        return Err(ApiError::bad_request(format!(
            "Amount exceeds the maximum transferable value: {}",
            amount
        )));
    }
    Ok(atomic as u64)
}

/// Validates recipients in order and converts them for the client.
fn to_recipients(request: &[RecipientRequest]) -> Result<Vec<TransferRecipient>, ApiError> {
    request
        .iter()
        .map(|r| -> Result<TransferRecipient, ApiError> {
            let address = validate_address(r.address.trim()).map_err(|_| {
                ApiError::bad_request(format!("Invalid wallet address in request: {}", r.address))
            })?;
            let amount = to_atomic_amount(r.amount)?;
            Ok(TransferRecipient { address, amount })
        })
        .collect()
}

fn to_callback(url: &Option<String>, secret: &Option<String>) -> Option<TransferCallback> {
    let url = url.as_ref().filter(|u| !u.trim().is_empty()).cloned();
    let secret = secret.as_ref().filter(|s| !s.is_empty()).cloned();
    if url.is_none() && secret.is_none() {
        None
    } else {
        Some(TransferCallback { url, secret })
    }
}

fn raw_tx_hex(request: &RawTxRequest) -> Result<&str, ApiError> {
    let hex = request.raw_tx_hex.trim();
    if hex.is_empty() {
        return Err(ApiError::bad_request("rawTxHex cannot be empty"));
    }
    Ok(hex)
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Handler for `POST /api/transaction/transfer`.
///
/// Builds, signs and submits the transfer, waiting for the cosigner.
pub async fn transfer_sync_handler(
    request: TransferRequest,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let recipients = to_recipients(&request.request)?;

    let response = mnee
        .synchronous_transfer(&request.wifs, &recipients)
        .await
        .map_err(ApiError::from)?;

    info!("Synchronous transfer completed: {:?}", response.txid);
    Ok(json_ok(response))
}

/// Handler for `POST /api/transaction/transfer-async`.
pub async fn transfer_async_handler(
    request: TransferRequest,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let recipients = to_recipients(&request.request)?;
    let callback = to_callback(&request.callback_url, &request.callback_secret);

    let ticket_id = mnee
        .asynchronous_transfer(&request.wifs, &recipients, callback.as_ref())
        .await
        .map_err(ApiError::from)?;

    info!("Asynchronous transfer submitted, ticket {}", ticket_id);
    Ok(json_ok(TicketIdResponse { ticket_id }))
}

/// Handler for `POST /api/transaction/partial-sign`.
///
/// Returns the owner-signed transaction without submitting it.
pub async fn partial_sign_handler(
    request: TransferRequest,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let recipients = to_recipients(&request.request)?;

    let raw_tx_hex = mnee
        .partial_sign(&request.wifs, &recipients)
        .await
        .map_err(ApiError::from)?;
    Ok(json_ok(PartialSignResponse { raw_tx_hex }))
}

/// Handler for `POST /api/transaction/submit-rawtx`.
pub async fn submit_rawtx_handler(
    request: RawTxRequest,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let hex = raw_tx_hex(&request)?;

    let response = mnee
        .submit_raw_tx_sync(hex)
        .await
        .map_err(ApiError::from)?;

    info!("Raw transaction submitted: {:?}", response.txid);
    Ok(json_ok(response))
}

/// Handler for `POST /api/transaction/submit-rawtx-async`.
pub async fn submit_rawtx_async_handler(
    request: RawTxRequest,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let hex = raw_tx_hex(&request)?;
    let callback = to_callback(&request.callback_url, &request.callback_secret);

    let ticket_id = mnee
        .submit_raw_tx_async(hex, callback.as_ref())
        .await
        .map_err(ApiError::from)?;

    info!("Raw transaction submitted, ticket {}", ticket_id);
    Ok(json_ok(TicketIdResponse { ticket_id }))
}
