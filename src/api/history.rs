//! Transaction history endpoint

use std::collections::HashMap;
use std::sync::Arc;

use chain_clients_mnee::TransactionHistory;
use serde::{Deserialize, Serialize};
use warp::{Rejection, Reply};

use super::generic::{json_ok, ApiError};
use super::params::{parse_addresses, parse_non_negative};
use crate::mnee_client::MneeApi;

const DEFAULT_FROM_SCORE: u64 = 0;
const DEFAULT_LIMIT: u64 = 10;

/// Response data of the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<TransactionHistory>,
}

/// Handler for `GET /api/transaction?addresses=a,b&fromScore=&limit=`.
pub async fn get_history_handler(
    query: HashMap<String, String>,
    mnee: Arc<dyn MneeApi>,
) -> Result<impl Reply, Rejection> {
    let addresses = parse_addresses(&query)?;
    let from_score = parse_non_negative(&query, "fromScore", DEFAULT_FROM_SCORE)?;
    let limit = parse_non_negative(&query, "limit", DEFAULT_LIMIT)?;

    let history = mnee
        .get_specific_transaction_history(&addresses, from_score, limit)
        .await
        .map_err(ApiError::from)?;
    Ok(json_ok(HistoryResponse { history }))
}
