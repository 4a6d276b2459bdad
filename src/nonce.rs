//! Single-use challenge nonces for wallet authentication.
//!
//! Tokens are minted with `issue` and destroyed on the first `consume`
//! attempt, whether or not that attempt succeeds. There is no eviction
//! sweep; staleness is resolved lazily when a token is consumed.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;

/// Nonce store: outstanding challenge tokens with their expiry.
pub struct NonceStore {
    /// Token -> absolute expiry
    nonces: DashMap<String, DateTime<Utc>>,
    /// Validity window for a freshly issued token
    ttl: Duration,
}

impl NonceStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            nonces: DashMap::new(),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Mint a fresh single-use token: 16 bytes from the OS RNG, lowercase hex.
    pub fn issue(&self) -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        let nonce = hex::encode(bytes);
        self.nonces.insert(nonce.clone(), Utc::now() + self.ttl);
        nonce
    }

    /// Consume a token: true iff it was outstanding and unexpired.
    ///
    /// The token is removed before the expiry check, so an expired token
    /// is destroyed rather than left retryable. The removal is a single
    /// atomic map operation; of any number of concurrent calls for the
    /// same token, exactly one can observe it as present.
    pub fn consume(&self, nonce: &str) -> bool {
        match self.nonces.remove(nonce) {
            Some((_, expiry)) => Utc::now() <= expiry,
            None => false,
        }
    }

    /// Count of outstanding tokens (for stats)
    pub fn len(&self) -> usize {
        self.nonces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nonces.is_empty()
    }
}
