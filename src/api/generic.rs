//! Generic API structures and handlers
//!
//! This module contains the response envelope, rejection handling, CORS
//! setup, and the route table of the MNEE API gateway.

use anyhow::{Context, Result};
use chain_clients_mnee::MneeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warp::hyper::body::Bytes;
use warp::{http::{Method, StatusCode}, Filter, Rejection, Reply};

use crate::config::Config;
use crate::mnee_client::MneeApi;

// ============================================================================
// SHARED REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
///
/// Successful responses carry `data`; failures carry a human-readable
/// `message`. The HTTP status code is the only other failure signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Replies with `{"success": true, "data": ...}` and status 200.
pub fn json_ok<T: Serialize>(data: T) -> warp::reply::Json {
    warp::reply::json(&ApiResponse::ok(data))
}

// ============================================================================
// CUSTOM REJECTION TYPES
// ============================================================================

/// Request failure carrying the status code and message to report.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    /// Maps an SDK failure: caller-caused errors are 400, everything else 500.
    pub fn from_sdk(err: &MneeError) -> Self {
        if err.is_client_error() {
            warn!("MNEE request rejected: {}", err);
            Self::bad_request(err.to_string())
        } else {
            error!("MNEE request failed: {}", err);
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: err.to_string(),
            }
        }
    }
}

impl From<MneeError> for ApiError {
    fn from(err: MneeError) -> Self {
        ApiError::from_sdk(&err)
    }
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Creates a warp filter that provides the shared MNEE client to handlers.
pub fn with_mnee(
    mnee: Arc<dyn MneeApi>,
) -> impl Filter<Extract = (Arc<dyn MneeApi>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || mnee.clone())
}

/// Creates a warp filter that provides the gateway configuration to handlers.
pub fn with_config(
    config: Arc<Config>,
) -> impl Filter<Extract = (Arc<Config>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || config.clone())
}

/// Reads the raw body and deserializes it as `T`.
///
/// Bodies that are not valid JSON for `T` are rejected with 422.
pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send + 'static,
{
    warp::body::bytes().and_then(|body: Bytes| async move {
        serde_json::from_slice::<T>(&body).map_err(|e| {
            debug!(
                "Body deserialization failed: {}. Body: {}",
                e,
                String::from_utf8_lossy(&body)
            );
            warp::reject::custom(ApiError::unprocessable(format!(
                "Unprocessable Entity: {}",
                e
            )))
        })
    })
}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Creates a CORS filter based on the configured allowed origins.
fn create_cors_filter(allowed_origins: &[String]) -> warp::cors::Builder {
    let methods = vec![Method::GET, Method::POST, Method::OPTIONS];
    let headers = vec!["content-type", "authorization", "origin", "accept"];

    if allowed_origins.iter().any(|o| o == "*") {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods)
            .allow_headers(headers)
    } else {
        let origins: Vec<&str> = allowed_origins.iter().map(|s| s.as_str()).collect();
        warp::cors()
            .allow_origins(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
///
/// Converts every rejection into the failure envelope with a matching
/// HTTP status code.
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if let Some(err) = rej.find::<ApiError>() {
        (err.status, err.message.clone())
    } else if let Some(err) = rej.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::UNPROCESSABLE_ENTITY, format!("Unprocessable Entity: {}", err))
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if let Some(err) = rej.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, err.to_string())
    } else if rej.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::<()>::failure(message)),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server exposing the MNEE client.
pub struct ApiServer {
    /// Gateway configuration
    config: Arc<Config>,
    /// Shared MNEE client, constructed once at startup
    mnee: Arc<dyn MneeApi>,
}

impl ApiServer {
    /// Creates a new API server.
    ///
    /// # Arguments
    ///
    /// * `config` - Gateway configuration
    /// * `mnee` - MNEE client shared by every handler
    pub fn new(config: Config, mnee: Arc<dyn MneeApi>) -> Self {
        Self {
            config: Arc::new(config),
            mnee,
        }
    }

    /// Starts the API server and serves requests until the process stops.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server shut down
    /// * `Err(anyhow::Error)` - Listener address could not be parsed
    pub async fn run(&self) -> Result<()> {
        let addr: std::net::SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .context("Failed to parse API server address")?;

        info!("MNEE API gateway listening on {}", addr);

        let routes = self.create_routes();
        warp::serve(routes).run(addr).await;

        Ok(())
    }

    /// Creates all API routes for the server.
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        use super::{balance, history, system_config, ticket, transfer, utxo};

        let mnee = self.mnee.clone();

        // Health check endpoint
        let health = warp::path!("health").and(warp::get()).map(|| {
            json_ok("MNEE API gateway is running")
        });

        // GET /api/balance/:address - single address balance
        let balance_single = warp::path!("api" / "balance" / String)
            .and(warp::get())
            .and(with_mnee(mnee.clone()))
            .and_then(balance::get_balance_handler);

        // GET /api/balance?addresses=a,b - balances of several addresses
        let balance_multi = warp::path!("api" / "balance")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .and(with_mnee(mnee.clone()))
            .and_then(balance::get_balances_handler);

        // GET /api/utxos/all?addresses=a,b
        let utxos_all = warp::path!("api" / "utxos" / "all")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .and(with_mnee(mnee.clone()))
            .and_then(utxo::get_all_utxos_handler);

        // GET /api/utxos/paginated?addresses=a,b&page=&size=
        let utxos_paginated = warp::path!("api" / "utxos" / "paginated")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .and(with_mnee(mnee.clone()))
            .and_then(utxo::get_paginated_utxos_handler);

        // GET /api/transaction?addresses=a,b&fromScore=&limit=
        let history = warp::path!("api" / "transaction")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .and(with_mnee(mnee.clone()))
            .and_then(history::get_history_handler);

        // POST /api/transaction/transfer - build, sign and cosign synchronously
        let transfer_sync = warp::path!("api" / "transaction" / "transfer")
            .and(warp::post())
            .and(json_body::<transfer::TransferRequest>())
            .and(with_mnee(mnee.clone()))
            .and_then(transfer::transfer_sync_handler);

        // POST /api/transaction/transfer-async - returns a ticket id
        let transfer_async = warp::path!("api" / "transaction" / "transfer-async")
            .and(warp::post())
            .and(json_body::<transfer::TransferRequest>())
            .and(with_mnee(mnee.clone()))
            .and_then(transfer::transfer_async_handler);

        // POST /api/transaction/partial-sign - signed but not submitted
        let partial_sign = warp::path!("api" / "transaction" / "partial-sign")
            .and(warp::post())
            .and(json_body::<transfer::TransferRequest>())
            .and(with_mnee(mnee.clone()))
            .and_then(transfer::partial_sign_handler);

        // POST /api/transaction/submit-rawtx - synchronous raw submission
        let submit_rawtx = warp::path!("api" / "transaction" / "submit-rawtx")
            .and(warp::post())
            .and(json_body::<transfer::RawTxRequest>())
            .and(with_mnee(mnee.clone()))
            .and_then(transfer::submit_rawtx_handler);

        // POST /api/transaction/submit-rawtx-async - returns a ticket id
        let submit_rawtx_async = warp::path!("api" / "transaction" / "submit-rawtx-async")
            .and(warp::post())
            .and(json_body::<transfer::RawTxRequest>())
            .and(with_mnee(mnee.clone()))
            .and_then(transfer::submit_rawtx_async_handler);

        // GET /api/transaction/status/:ticketId - bounded ticket poll
        let ticket_status = warp::path!("api" / "transaction" / "status" / String)
            .and(warp::get())
            .and(with_mnee(mnee.clone()))
            .and(with_config(self.config.clone()))
            .and_then(ticket::poll_ticket_handler);

        // GET /api/config - MNEE system configuration
        let system_config = warp::path!("api" / "config")
            .and(warp::get())
            .and(with_mnee(mnee))
            .and_then(system_config::get_config_handler);

        // Combine all routes and apply rejection handler
        health
            .or(balance_single)
            .or(balance_multi)
            .or(utxos_all)
            .or(utxos_paginated)
            .or(history)
            .or(transfer_sync)
            .or(transfer_async)
            .or(partial_sign)
            .or(submit_rawtx)
            .or(submit_rawtx_async)
            .or(ticket_status)
            .or(system_config)
            .with(create_cors_filter(&self.config.cors_origin_list()))
            .with(warp::trace::request())
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    #[allow(dead_code)] // Used by tests
    pub fn test_routes(&self) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}
