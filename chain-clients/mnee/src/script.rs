//! Script construction for cosigned BSV-21 outputs.

use crate::address::Address;
use crate::error::{MneeError, Result};
use crate::types::TransferInscription;

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1: u8 = 0x51;
pub const OP_IF: u8 = 0x63;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;

const BSV20_CONTENT_TYPE: &[u8] = b"application/bsv-20";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.0.push(opcode);
        self
    }

    /// Appends `data` with the minimal push prefix.
    pub fn push_data(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len < OP_PUSHDATA1 as usize {
            self.0.push(len as u8);
        } else if len <= u8::MAX as usize {
            self.0.push(OP_PUSHDATA1);
            self.0.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.0.push(OP_PUSHDATA2);
            self.0.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.0.push(OP_PUSHDATA4);
            self.0.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.0.extend_from_slice(data);
        self
    }

    pub fn append(mut self, other: &Script) -> Self {
        self.0.extend_from_slice(&other.0);
        self
    }
}

/// Lock requiring both the owner's and the approver's signature:
/// `OP_DUP OP_HASH160 <pkh> OP_EQUALVERIFY OP_CHECKSIGVERIFY <approver> OP_CHECKSIG`
pub fn cosign_lock(owner: &Address, approver_pubkey: &[u8]) -> Result<Script> {
    if approver_pubkey.len() != 33 && approver_pubkey.len() != 65 {
        return Err(MneeError::InvalidConfig(
            "approver public key must be a SEC1 encoded point".to_string(),
        ));
    }

    Ok(Script::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(owner.pubkey_hash())
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIGVERIFY)
        .push_data(approver_pubkey)
        .push_opcode(OP_CHECKSIG))
}

/// 1Sat ordinal envelope carrying a BSV-21 transfer inscription, followed by
/// the cosign lock of the receiving address.
pub fn inscribed_transfer_lock(
    owner: &Address,
    approver_pubkey: &[u8],
    token_id: &str,
    amount: u64,
    decimals: u8,
) -> Result<Script> {
    let inscription = TransferInscription::new(token_id, amount, decimals);
    let json = serde_json::to_vec(&inscription)
        .map_err(|e| MneeError::Signing(format!("failed to encode inscription: {}", e)))?;

    let envelope = Script::new()
        .push_opcode(OP_FALSE)
        .push_opcode(OP_IF)
        .push_data(b"ord")
        .push_opcode(OP_1)
        .push_data(BSV20_CONTENT_TYPE)
        .push_opcode(OP_0)
        .push_data(&json)
        .push_opcode(OP_ENDIF);

    Ok(envelope.append(&cosign_lock(owner, approver_pubkey)?))
}

/// Owner half of the cosign unlock: `<sig> <pubkey>`. The cosigner prepends
/// its own signature before broadcasting.
pub fn owner_unlock(signature: &[u8], public_key: &[u8]) -> Script {
    Script::new().push_data(signature).push_data(public_key)
}
