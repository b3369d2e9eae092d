//! MNEE Chain Client Library
//!
//! REST client for the MNEE 1Sat token proxy API plus the transaction
//! builder that produces owner-signed cosign transfers. The approver's
//! signature is added remotely by the MNEE cosigner.

pub mod address;
pub mod builder;
pub mod client;
pub mod error;
pub mod script;
pub mod transaction;
pub mod types;

pub use address::{validate_address, Address, Network, PrivateKey};
pub use client::{Environment, MneeClient};
pub use error::{MneeError, Result};
pub use types::{
    BalanceData, Bsv21Data, CosignData, Fee, MneeTxo, SystemConfig, Ticket, TicketStatus,
    TransactionHistory, TransferCallback, TransferRecipient, TransferResponse, TxoData,
};
