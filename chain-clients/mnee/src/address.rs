//! Addresses and WIF keys
//!
//! P2PKH base58check addresses and wallet-import-format private keys.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{MneeError, Result};

const MAINNET_P2PKH: u8 = 0x00;
const TESTNET_P2PKH: u8 = 0x6f;
const MAINNET_WIF: u8 = 0x80;
const TESTNET_WIF: u8 = 0xef;

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let rip = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&rip);
    out
}

/// SHA256(SHA256(data))
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH,
            Network::Testnet => TESTNET_P2PKH,
        }
    }
}

// ============================================================================
// ADDRESS
// ============================================================================

/// Pay-to-public-key-hash address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    pubkey_hash: [u8; 20],
}

impl Address {
    pub fn from_pubkey_hash(pubkey_hash: [u8; 20], network: Network) -> Self {
        Self {
            network,
            pubkey_hash,
        }
    }

    pub fn from_public_key(public_key: &[u8], network: Network) -> Self {
        Self::from_pubkey_hash(hash160(public_key), network)
    }

    pub fn pubkey_hash(&self) -> &[u8; 20] {
        &self.pubkey_hash
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl FromStr for Address {
    type Err = MneeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MneeError::InvalidAddress(s.to_string());

        let payload = bs58::decode(s).with_check(None).into_vec().map_err(|_| invalid())?;
        if payload.len() != 21 {
            return Err(invalid());
        }

        let network = match payload[0] {
            MAINNET_P2PKH => Network::Mainnet,
            TESTNET_P2PKH => Network::Testnet,
            _ => return Err(invalid()),
        };

        let mut pubkey_hash = [0u8; 20];
        pubkey_hash.copy_from_slice(&payload[1..]);
        Ok(Self {
            network,
            pubkey_hash,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = Vec::with_capacity(21);
        payload.push(self.network.p2pkh_version());
        payload.extend_from_slice(&self.pubkey_hash);
        f.write_str(&bs58::encode(payload).with_check().into_string())
    }
}

/// Validates an address string and returns its canonical form.
pub fn validate_address(address: &str) -> Result<String> {
    Ok(Address::from_str(address)?.to_string())
}

// ============================================================================
// PRIVATE KEY (WIF)
// ============================================================================

/// secp256k1 private key decoded from wallet import format.
#[derive(Clone)]
pub struct PrivateKey {
    signing_key: SigningKey,
    compressed: bool,
    network: Network,
}

impl PrivateKey {
    pub fn from_wif(wif: &str) -> Result<Self> {
        let payload = bs58::decode(wif.trim())
            .with_check(None)
            .into_vec()
            .map_err(|_| MneeError::InvalidWif)?;

        let network = match payload.first() {
            Some(&MAINNET_WIF) => Network::Mainnet,
            Some(&TESTNET_WIF) => Network::Testnet,
            _ => return Err(MneeError::InvalidWif),
        };

        let compressed = match payload.len() {
            33 => false,
            34 if payload[33] == 0x01 => true,
            _ => return Err(MneeError::InvalidWif),
        };

        let signing_key =
            SigningKey::from_slice(&payload[1..33]).map_err(|_| MneeError::InvalidWif)?;

        Ok(Self {
            signing_key,
            compressed,
            network,
        })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// SEC1-encoded public key, compressed unless the WIF said otherwise.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.verifying_key()
            .to_encoded_point(self.compressed)
            .as_bytes()
            .to_vec()
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key_bytes(), self.network)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address().to_string())
            .finish_non_exhaustive()
    }
}
