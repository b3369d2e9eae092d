//! Ticket status endpoint

use std::sync::Arc;

use tracing::debug;
use warp::{Rejection, Reply};

use super::generic::{json_ok, ApiError};
use crate::config::Config;
use crate::mnee_client::MneeApi;

/// Handler for `GET /api/transaction/status/:ticketId`.
///
/// Polls until the ticket leaves BROADCASTING or the configured timeout
/// elapses, then returns the last observed ticket.
pub async fn poll_ticket_handler(
    ticket_id: String,
    mnee: Arc<dyn MneeApi>,
    config: Arc<Config>,
) -> Result<impl Reply, Rejection> {
    let ticket_id = ticket_id.trim();
    if ticket_id.is_empty() {
        return Err(ApiError::bad_request("ticketId is required").into());
    }

    debug!("Polling ticket {}", ticket_id);
    let ticket = mnee
        .poll_ticket(
            ticket_id,
            config.ticket_poll_interval(),
            config.ticket_poll_timeout(),
        )
        .await
        .map_err(ApiError::from)?;
    Ok(json_ok(ticket))
}
