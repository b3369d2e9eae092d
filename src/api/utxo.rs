//! UTXO endpoints

use std::collections::HashMap;
use std::sync::Arc;

use warp::{Rejection, Reply};

use super::generic::{json_ok, ApiError};
use super::params::{parse_addresses, parse_positive};
use crate::mnee_client::MneeApi;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_SIZE: u32 = 10;

/// Handler for `GET /api/utxos/all?addresses=a,b`.
pub async fn get_all_utxos_handler(
    query: HashMap<String, String>,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let addresses = parse_addresses(&query)?;
    let utxos = mnee
        .get_unspent_txos(&addresses)
        .await
        .map_err(ApiError::from)?;
    Ok(json_ok(utxos))
}

/// Handler for `GET /api/utxos/paginated?addresses=a,b&page=&size=`.
///
/// `page` defaults to 1 and `size` to 10; both must be greater than zero.
pub async fn get_paginated_utxos_handler(
    query: HashMap<String, String>,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let addresses = parse_addresses(&query)?;
    let page = parse_positive(&query, "page", DEFAULT_PAGE)?;
    let size = parse_positive(&query, "size", DEFAULT_SIZE)?;

    let utxos = mnee
        .get_paginated_unspent_txos(&addresses, page, size)
        .await
        .map_err(ApiError::from)?;
    Ok(json_ok(utxos))
}
