//! Transaction serialization and BIP-143 (FORKID) signature hashing.

use crate::address::sha256d;
use crate::error::{MneeError, Result};
use crate::script::Script;

pub const SIGHASH_ALL: u32 = 0x01;
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;
pub const SIGHASH_FORKID: u32 = 0x40;

/// Sighash used for the owner's signature: the cosigner may still add inputs.
pub const OWNER_SIGHASH: u32 = SIGHASH_ALL | SIGHASH_ANYONECANPAY | SIGHASH_FORKID;

const DEFAULT_SEQUENCE: u32 = 0xffff_ffff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutPoint {
    /// Transaction id in display (big-endian hex) order
    pub txid: [u8; 32],
    pub vout: u32,
}

impl OutPoint {
    pub fn from_hex(txid_hex: &str, vout: u32) -> Result<Self> {
        let bytes = hex::decode(txid_hex)
            .map_err(|_| MneeError::Decode(format!("invalid txid: {}", txid_hex)))?;
        let txid: [u8; 32] = bytes
            .try_into()
            .map_err(|_| MneeError::Decode(format!("invalid txid length: {}", txid_hex)))?;
        Ok(Self { txid, vout })
    }

    fn write(&self, buf: &mut Vec<u8>) {
        let mut le = self.txid;
        le.reverse();
        buf.extend_from_slice(&le);
        buf.extend_from_slice(&self.vout.to_le_bytes());
    }
}

#[derive(Debug, Clone)]
pub struct TxInput {
    pub outpoint: OutPoint,
    pub unlocking_script: Script,
    pub sequence: u32,
    /// Locking script of the spent output (needed for the sighash only)
    pub source_script: Script,
    /// Satoshis of the spent output (needed for the sighash only)
    pub source_satoshis: u64,
}

impl TxInput {
    pub fn new(outpoint: OutPoint, source_script: Script, source_satoshis: u64) -> Self {
        Self {
            outpoint,
            unlocking_script: Script::new(),
            sequence: DEFAULT_SEQUENCE,
            source_script,
            source_satoshis,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TxOutput {
    pub satoshis: u64,
    pub locking_script: Script,
}

impl TxOutput {
    fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.satoshis.to_le_bytes());
        write_varint(buf, self.locking_script.len() as u64);
        buf.extend_from_slice(self.locking_script.as_bytes());
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }
}

impl Transaction {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());

        write_varint(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            input.outpoint.write(&mut buf);
            write_varint(&mut buf, input.unlocking_script.len() as u64);
            buf.extend_from_slice(input.unlocking_script.as_bytes());
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_varint(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            output.write(&mut buf);
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn txid(&self) -> String {
        txid_of(&self.to_bytes())
    }

    /// BIP-143 style digest used by BSV with SIGHASH_FORKID.
    ///
    /// Only `SIGHASH_ALL` base types are produced by this crate, so the
    /// SINGLE/NONE output rules are not implemented.
    pub fn signature_hash(&self, input_index: usize, sighash_type: u32) -> Result<[u8; 32]> {
        let input = self
            .inputs
            .get(input_index)
            .ok_or_else(|| MneeError::Signing(format!("input {} out of range", input_index)))?;

        if sighash_type & 0x1f != SIGHASH_ALL {
            return Err(MneeError::Signing(format!(
                "unsupported sighash type {:#x}",
                sighash_type
            )));
        }

        let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

        let hash_prevouts = if anyone_can_pay {
            [0u8; 32]
        } else {
            let mut buf = Vec::with_capacity(self.inputs.len() * 36);
            for i in &self.inputs {
                i.outpoint.write(&mut buf);
            }
            sha256d(&buf)
        };

        let hash_sequence = if anyone_can_pay {
            [0u8; 32]
        } else {
            let mut buf = Vec::with_capacity(self.inputs.len() * 4);
            for i in &self.inputs {
                buf.extend_from_slice(&i.sequence.to_le_bytes());
            }
            sha256d(&buf)
        };

        let hash_outputs = {
            let mut buf = Vec::new();
            for o in &self.outputs {
                o.write(&mut buf);
            }
            sha256d(&buf)
        };

        let mut preimage = Vec::new();
        preimage.extend_from_slice(&self.version.to_le_bytes());
        preimage.extend_from_slice(&hash_prevouts);
        preimage.extend_from_slice(&hash_sequence);
        input.outpoint.write(&mut preimage);
        write_varint(&mut preimage, input.source_script.len() as u64);
        preimage.extend_from_slice(input.source_script.as_bytes());
        preimage.extend_from_slice(&input.source_satoshis.to_le_bytes());
        preimage.extend_from_slice(&input.sequence.to_le_bytes());
        preimage.extend_from_slice(&hash_outputs);
        preimage.extend_from_slice(&self.lock_time.to_le_bytes());
        preimage.extend_from_slice(&sighash_type.to_le_bytes());

        Ok(sha256d(&preimage))
    }
}

/// Transaction id (display order hex) of serialized transaction bytes.
pub fn txid_of(raw: &[u8]) -> String {
    let mut hash = sha256d(raw);
    hash.reverse();
    hex::encode(hash)
}

fn write_varint(buf: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => buf.push(n as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&n.to_le_bytes());
        }
    }
}
