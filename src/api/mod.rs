//! REST API Server Module
//!
//! This module exposes the MNEE client over HTTP: balances, UTXOs, history,
//! transfers, raw transaction submission, ticket polling and the system
//! configuration.

// Envelope, rejection handling, CORS and the route table
mod generic;

mod balance;
mod history;
mod params;
mod system_config;
mod ticket;
mod transfer;
mod utxo;

pub use generic::{ApiError, ApiResponse, ApiServer};
pub use history::HistoryResponse;
pub use transfer::{
    to_atomic_amount, PartialSignResponse, RawTxRequest, RecipientRequest, TicketIdResponse,
    TransferRequest,
};
