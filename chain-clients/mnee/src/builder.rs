//! Cosigned transfer construction
//!
//! Builds a BSV-21 transfer spending the signers' token outputs and signs
//! every input with its owner's key. The result still needs the approver's
//! signature, which the MNEE cosigner adds on submission.

use std::collections::HashMap;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::Signature;
use tracing::debug;

use crate::address::{Address, PrivateKey};
use crate::error::{MneeError, Result};
use crate::script::{self, Script};
use crate::transaction::{OutPoint, Transaction, TxInput, TxOutput, OWNER_SIGHASH};
use crate::types::{MneeTxo, SystemConfig, TransferRecipient};

/// Every 1Sat token output carries exactly one satoshi.
const TOKEN_OUTPUT_SATOSHIS: u64 = 1;

struct SpendCandidate<'a> {
    outpoint: OutPoint,
    script: Script,
    satoshis: u64,
    amount: u64,
    key: &'a PrivateKey,
}

/// Builds and owner-signs a transfer to `recipients`.
///
/// `utxos` are the unspent outputs of the signers' addresses; outputs of other
/// tokens or other owners are ignored.
pub fn build_transfer(
    config: &SystemConfig,
    keys: &[PrivateKey],
    recipients: &[TransferRecipient],
    utxos: &[MneeTxo],
) -> Result<Transaction> {
    if recipients.is_empty() {
        return Err(MneeError::NoRecipients);
    }
    if keys.is_empty() {
        return Err(MneeError::NoSigningKeys);
    }

    let token_id = config
        .token_id
        .as_deref()
        .ok_or_else(|| MneeError::InvalidConfig("missing tokenId".to_string()))?;
    let approver = config
        .approver
        .as_deref()
        .ok_or_else(|| MneeError::InvalidConfig("missing approver".to_string()))
        .and_then(|hex_key| {
            hex::decode(hex_key)
                .map_err(|_| MneeError::InvalidConfig("approver is not hex".to_string()))
        })?;

    let mut total: u64 = 0;
    let mut destinations = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        if recipient.amount == 0 {
            return Err(MneeError::TransferAmountNotPositive);
        }
        let address = Address::from_str(&recipient.address)?;
        total = total
            .checked_add(recipient.amount)
            .ok_or(MneeError::InsufficientBalance)?;
        destinations.push((address, recipient.amount));
    }

    let fee = config.fee_for(total).ok_or_else(|| {
        MneeError::InvalidConfig(format!("no fee tier covers amount {}", total))
    })?;
    let required = total.checked_add(fee).ok_or(MneeError::InsufficientBalance)?;

    let keys_by_address: HashMap<String, &PrivateKey> = keys
        .iter()
        .map(|key| (key.address().to_string(), key))
        .collect();

    let mut candidates = spend_candidates(utxos, token_id, &keys_by_address);
    candidates.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut selected = Vec::new();
    let mut gathered: u64 = 0;
    for candidate in candidates {
        if gathered >= required {
            break;
        }
        gathered = gathered.checked_add(candidate.amount).ok_or_else(|| {
            MneeError::Decode("token UTXO amounts overflow".to_string())
        })?;
        selected.push(candidate);
    }
    if gathered < required {
        debug!("Insufficient balance: have {}, need {}", gathered, required);
        return Err(MneeError::InsufficientBalance);
    }

    let mut tx = Transaction::default();
    for candidate in &selected {
        tx.inputs.push(TxInput::new(
            candidate.outpoint.clone(),
            candidate.script.clone(),
            candidate.satoshis,
        ));
    }

    for (address, amount) in &destinations {
        tx.outputs.push(token_output(address, &approver, token_id, *amount, config.decimals)?);
    }

    if fee > 0 {
        let fee_address = config
            .fee_address
            .as_deref()
            .ok_or_else(|| MneeError::InvalidConfig("missing feeAddress".to_string()))
            .and_then(Address::from_str)?;
        tx.outputs.push(token_output(&fee_address, &approver, token_id, fee, config.decimals)?);
    }

    let change = gathered - required;
    if change > 0 {
        let change_address = keys[0].address();
        tx.outputs.push(token_output(&change_address, &approver, token_id, change, config.decimals)?);
    }

    for (index, candidate) in selected.iter().enumerate() {
        let digest = tx.signature_hash(index, OWNER_SIGHASH)?;
        let signature: Signature = candidate
            .key
            .signing_key()
            .sign_prehash(&digest)
            .map_err(|e| MneeError::Signing(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);

        let mut sig_bytes = signature.to_der().as_bytes().to_vec();
        sig_bytes.push(OWNER_SIGHASH as u8);

        tx.inputs[index].unlocking_script =
            script::owner_unlock(&sig_bytes, &candidate.key.public_key_bytes());
    }

    debug!(
        "Built transfer: {} inputs, {} outputs, amount {}, fee {}",
        tx.inputs.len(),
        tx.outputs.len(),
        total,
        fee
    );

    Ok(tx)
}

fn token_output(
    address: &Address,
    approver: &[u8],
    token_id: &str,
    amount: u64,
    decimals: u8,
) -> Result<TxOutput> {
    Ok(TxOutput {
        satoshis: TOKEN_OUTPUT_SATOSHIS,
        locking_script: script::inscribed_transfer_lock(address, approver, token_id, amount, decimals)?,
    })
}

fn spend_candidates<'a>(
    utxos: &[MneeTxo],
    token_id: &str,
    keys_by_address: &HashMap<String, &'a PrivateKey>,
) -> Vec<SpendCandidate<'a>> {
    utxos
        .iter()
        .filter_map(|utxo| {
            if utxo.token_id() != Some(token_id) {
                return None;
            }
            let amount = utxo.token_amount().filter(|amt| *amt > 0)?;
            let key = utxo
                .owners
                .iter()
                .find_map(|owner| keys_by_address.get(owner).copied())?;
            let outpoint = OutPoint::from_hex(utxo.txid.as_deref()?, utxo.vout).ok()?;
            let script = STANDARD.decode(utxo.script.as_deref()?).ok()?;

            Some(SpendCandidate {
                outpoint,
                script: Script::from_bytes(script),
                satoshis: if utxo.satoshis == 0 { TOKEN_OUTPUT_SATOSHIS } else { utxo.satoshis },
                amount,
                key,
            })
        })
        .collect()
}
