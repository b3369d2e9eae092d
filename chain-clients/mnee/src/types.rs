//! MNEE API data types
//!
//! Wire shapes exchanged with the MNEE proxy API. Field names follow the API's
//! JSON (a mix of camelCase and snake_case), so renames are explicit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SYSTEM CONFIG
// ============================================================================

/// Fee tier: transfers whose total lies in `[min, max]` pay `fee` atomic units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub min: u64,
    pub max: u64,
    pub fee: u64,
}

/// Token-wide configuration published by the MNEE API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burn_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fees: Vec<Fee>,
}

impl SystemConfig {
    /// Returns the fee for a transfer of `amount` atomic units, if a tier covers it.
    pub fn fee_for(&self, amount: u64) -> Option<u64> {
        self.fees
            .iter()
            .find(|tier| amount >= tier.min && amount <= tier.max)
            .map(|tier| tier.fee)
    }

    /// Converts atomic units to the human-scaled amount.
    pub fn to_precised(&self, atomic: u64) -> f64 {
        atomic as f64 / 10f64.powi(self.decimals as i32)
    }
}

// ============================================================================
// BALANCES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceData {
    pub address: Option<String>,
    pub amt: f64,
    pub precised: f64,
}

impl BalanceData {
    pub fn zero(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            amt: 0.0,
            precised: 0.0,
        }
    }
}

/// Balance entry as returned by the API, before scaling.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBalance {
    pub address: Option<String>,
    #[serde(default)]
    pub amt: u64,
}

// ============================================================================
// UTXOS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bsv21Data {
    #[serde(rename = "dec", default)]
    pub decimals: u8,
    #[serde(default)]
    pub amt: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(rename = "sym", default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosignData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosigner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxoData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bsv21: Option<Bsv21Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosign: Option<CosignData>,
}

/// Unspent token output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MneeTxo {
    #[serde(default)]
    pub satoshis: u64,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub idx: u64,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub vout: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outpoint: Option<String>,
    /// Base64-encoded locking script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TxoData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub senders: Vec<String>,
}

impl MneeTxo {
    /// Token amount carried by this output, if it is a BSV-21 output.
    pub fn token_amount(&self) -> Option<u64> {
        self.data.as_ref()?.bsv21.as_ref().map(|b| b.amt)
    }

    pub fn token_id(&self) -> Option<&str> {
        self.data.as_ref()?.bsv21.as_ref()?.id.as_deref()
    }
}

// ============================================================================
// HISTORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionHistory {
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub idx: u64,
    #[serde(default)]
    pub score: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rawtx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outs: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub senders: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receivers: Vec<String>,
}

// ============================================================================
// TRANSFERS
// ============================================================================

/// One transfer destination, amount in atomic units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecipient {
    pub address: String,
    pub amount: u64,
}

/// Optional webhook the API calls when an asynchronous ticket settles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferCallback {
    pub url: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txhex: Option<String>,
}

/// Body of the cosigner submission endpoints.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransferRequest {
    pub rawtx: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_secret: Option<String>,
}

/// Synchronous cosigner reply: the cosigned transaction, base64-encoded.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CosignedTx {
    pub rawtx: Option<String>,
}

// ============================================================================
// TICKETS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Broadcasting,
    Success,
    Mined,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    /// Whether the ticket has left the broadcasting phase.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TicketStatus::Broadcasting)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_requested: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub callback_secret: Option<String>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ============================================================================
// INSCRIPTIONS
// ============================================================================

/// BSV-21 transfer inscription payload.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransferInscription<'a> {
    pub p: &'static str,
    pub amt: String,
    pub op: &'static str,
    pub dec: String,
    pub id: &'a str,
}

impl<'a> TransferInscription<'a> {
    pub fn new(token_id: &'a str, amount: u64, decimals: u8) -> Self {
        Self {
            p: "bsv-20",
            amt: amount.to_string(),
            op: "transfer",
            dec: decimals.to_string(),
            id: token_id,
        }
    }
}
