//! System configuration endpoint

use std::sync::Arc;

use warp::{Rejection, Reply};

use super::generic::{json_ok, ApiError};
use crate::mnee_client::MneeApi;

/// Handler for `GET /api/config`.
pub async fn get_config_handler(mnee: Arc<dyn MneeApi>) -> Result<impl Reply, Rejection> {
    let config = mnee.get_config().await.map_err(ApiError::from)?;
    Ok(json_ok(config))
}
