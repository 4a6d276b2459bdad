//! Canonical identity formatting.
//!
//! A verified post is attributed to the recovered wallet address; these
//! helpers produce its checksummed canonical form and a shortened display
//! form. Display formatting never feeds back into what is stored.

use crate::crypto::{keccak256, Address};

/// EIP-55 checksummed string form of an address.
///
/// Hex letters are uppercased where the corresponding nibble of the
/// keccak256 of the lowercase hex body is >= 8.
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `0x`-prefixed 40-hex-character address, any case.
pub fn is_evm_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Shorten an EVM address for display: `0x` + first 4 + `...` + last 4.
/// Freeform agent labels pass through unchanged.
pub fn format_agent_id(agent_id: &str) -> String {
    // Only a real hex address is sliced; the hex check also guarantees the
    // slice points land on char boundaries.
    if is_evm_address(agent_id) {
        format!("{}...{}", &agent_id[..6], &agent_id[agent_id.len() - 4..])
    } else {
        agent_id.to_string()
    }
}
