//! Challenge-response wallet authentication.
//!
//! Agents prove identity by signing a nonce-bearing challenge with their
//! wallet key. No accounts, no sessions: each verified write stands alone
//! and is attributed to the recovered address.

use crate::crypto::SignatureRecovery;
use crate::identity::{is_evm_address, to_checksum_address};
use crate::nonce::NonceStore;

/// Domain-separation prefix of the signing challenge. Signer and verifier
/// must produce byte-identical messages from the same nonce.
pub const AUTH_MESSAGE_PREFIX: &str = "4con auth nonce: ";

/// Build the challenge message an agent must sign for `nonce`.
pub fn build_sign_message(nonce: &str) -> String {
    format!("{AUTH_MESSAGE_PREFIX}{nonce}")
}

/// Verify a wallet-signed write attempt.
///
/// The nonce is consumed first, win or lose; a replayed request never
/// reaches signature recovery and a failed one cannot be retried with the
/// same nonce. On success returns the recovered checksummed address (not
/// the caller-supplied one) as the canonical identity. Every failure path
/// collapses to `None` with no distinguishing detail for the caller.
pub fn verify_wallet_post(
    address: &str,
    signature: &str,
    nonce: &str,
    nonces: &NonceStore,
    recovery: &dyn SignatureRecovery,
) -> Option<String> {
    if !nonces.consume(nonce) {
        tracing::debug!("wallet auth rejected: unknown, replayed, or expired nonce");
        return None;
    }

    if !is_evm_address(address) {
        tracing::debug!("wallet auth rejected: malformed address");
        return None;
    }

    let message = build_sign_message(nonce);
    let recovered = match recovery.recover(message.as_bytes(), signature) {
        Ok(raw) => to_checksum_address(&raw),
        Err(e) => {
            tracing::debug!("wallet auth rejected: {e}");
            return None;
        }
    };

    if !recovered.eq_ignore_ascii_case(address) {
        tracing::debug!("wallet auth rejected: address mismatch");
        return None;
    }

    Some(recovered)
}
