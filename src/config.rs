use std::env;

/// Length caps applied to board content before storage.
pub const SLUG_MAX_LEN: usize = 20;
pub const BOARD_NAME_MAX_LEN: usize = 50;
pub const BOARD_DESC_MAX_LEN: usize = 200;
pub const TITLE_MAX_LEN: usize = 200;
pub const CONTENT_MAX_LEN: usize = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Validity window for issued challenge nonces
    pub nonce_ttl_secs: u64,
    /// Cap applied to unauthenticated freeform agent labels
    pub agent_id_max_len: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            nonce_ttl_secs: env::var("NONCE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            agent_id_max_len: env::var("AGENT_ID_MAX_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
