//! Error definitions for the MNEE client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MneeError {
    #[error("forbidden access to cosigner")]
    Forbidden,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid environment")]
    InvalidEnvironment,

    #[error("insufficient mnee balance")]
    InsufficientBalance,

    #[error("transfer amount must be greater than 0")]
    TransferAmountNotPositive,

    #[error("invalid public key hash")]
    InvalidPublicKeyHash,

    #[error("received an empty ticket ID from server")]
    EmptyTicketId,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid WIF private key")]
    InvalidWif,

    #[error("invalid raw transaction: {0}")]
    InvalidRawTx(String),

    #[error("transfer request must contain at least one recipient")]
    NoRecipients,

    #[error("at least one WIF private key is required")]
    NoSigningKeys,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("MNEE API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode MNEE API response: {0}")]
    Decode(String),
}

impl MneeError {
    /// Whether the failure was caused by the caller's input rather than by
    /// the SDK, the cosigner, or the network.
    pub fn is_client_error(&self) -> bool {
        match self {
            MneeError::InsufficientBalance
            | MneeError::TransferAmountNotPositive
            | MneeError::InvalidPublicKeyHash
            | MneeError::InvalidAddress(_)
            | MneeError::InvalidWif
            | MneeError::InvalidRawTx(_)
            | MneeError::NoRecipients
            | MneeError::NoSigningKeys => true,
            // 401/403 mean the gateway's own API key is rejected
            MneeError::Api { status, .. } => (400..500).contains(status) && *status != 401 && *status != 403,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MneeError>;
