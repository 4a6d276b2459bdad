//! Signature recovery for wallet authentication.
//!
//! The verifier only depends on the [`SignatureRecovery`] trait; the
//! production implementation recovers secp256k1 signers from
//! Ethereum-style personal-message signatures (EIP-191 prefix, 65-byte
//! r||s||v encoding, keccak256 address derivation).

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Crypto operation errors
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid signature format: {0}")]
    InvalidSignature(String),
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    #[error("Signature recovery failed")]
    RecoveryFailed,
    #[error("Hex decode error: {0}")]
    HexError(String),
}

/// A 20-byte account address.
pub type Address = [u8; 20];

/// Recovery of the signing address from a message and its signature,
/// without a separate public key input.
pub trait SignatureRecovery: Send + Sync {
    fn recover(&self, message: &[u8], signature_hex: &str) -> CryptoResult<Address>;
}

/// Personal-message recovery over secp256k1.
#[derive(Debug, Clone, Default)]
pub struct PersonalMessageRecovery;

impl SignatureRecovery for PersonalMessageRecovery {
    fn recover(&self, message: &[u8], signature_hex: &str) -> CryptoResult<Address> {
        let sig_bytes = decode_signature_hex(signature_hex)?;
        let recovery_id = parse_recovery_id(sig_bytes[64])?;

        let sig = Signature::from_slice(&sig_bytes[..64])
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        let hash = personal_message_hash(message);
        let recovered_key = VerifyingKey::recover_from_prehash(&hash, &sig, recovery_id)
            .map_err(|_| CryptoError::RecoveryFailed)?;

        Ok(address_from_pubkey(&recovered_key))
    }
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Hash a message under the EIP-191 personal-message prefix.
///
/// Signers (wallets) hash the same bytes, so the prefix must match them
/// exactly: `"\x19Ethereum Signed Message:\n" || len(message) || message`.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive the account address from a public key: last 20 bytes of the
/// keccak256 of the uncompressed point (without the 0x04 prefix).
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Decode a hex signature (optionally `0x`-prefixed) into 65 bytes.
fn decode_signature_hex(signature_hex: &str) -> CryptoResult<[u8; 65]> {
    let stripped = signature_hex.strip_prefix("0x").unwrap_or(signature_hex);
    let bytes = hex::decode(stripped).map_err(|e| CryptoError::HexError(e.to_string()))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        CryptoError::InvalidSignature(format!("signature must be 65 bytes, got {}", v.len()))
    })
}

/// Parse the recovery id from the trailing v byte.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> CryptoResult<RecoveryId> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| CryptoError::InvalidRecoveryId(v))
}
