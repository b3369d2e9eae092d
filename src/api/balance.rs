//! Balance endpoints

use std::collections::HashMap;
use std::sync::Arc;

use chain_clients_mnee::{validate_address, BalanceData};
use tracing::debug;
use warp::{Rejection, Reply};

use super::generic::{json_ok, ApiError};
use super::params::parse_addresses;
use crate::mnee_client::MneeApi;

/// Handler for `GET /api/balance/:address`.
///
/// Returns a zero balance when the API reports nothing for the address.
pub async fn get_balance_handler(
    address: String,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    if address.trim().is_empty() {
        return Err(ApiError::bad_request("Address is required").into());
    }
    let address = validate_address(&address)
        .map_err(|_| ApiError::bad_request(format!("Invalid wallet address: {}", address)))?;

    let balances = mnee
        .get_balances(std::slice::from_ref(&address))
        .await
        .map_err(ApiError::from)?;

    let balance = balances
        .into_iter()
        .next()
        .unwrap_or_else(|| BalanceData::zero(&address));
    Ok(json_ok(balance))
}

/// Handler for `GET /api/balance?addresses=a,b`.
///
/// All addresses go to the API in a single call. When nothing is returned a
/// zero balance is reported for each requested address.
pub async fn get_balances_handler(
    query: HashMap<String, String>,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let addresses = parse_addresses(&query)?;
    debug!("Fetching balances for {} address(es)", addresses.len());

    let mut balances = mnee.get_balances(&addresses).await.map_err(ApiError::from)?;
    if balances.is_empty() {
        balances = addresses.iter().map(|a| BalanceData::zero(a)).collect();
    }
    Ok(json_ok(balances))
}
