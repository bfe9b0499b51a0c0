//! POS API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use atlas_db::artifacts::DEFAULT_MAX_PROOF_BYTES;

/// POS API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Directory payment proof images are written to
    pub proof_dir: PathBuf,

    /// Prefix of the references stored on orders
    pub proof_url_prefix: String,

    /// Largest accepted decoded proof image in bytes (default: 5MB)
    pub max_proof_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            db_path: PathBuf::from("./data/atlas.db"),
            db_max_connections: 5,
            proof_dir: PathBuf::from("./uploads/payment_proofs"),
            proof_url_prefix: "uploads/payment_proofs".to_string(),
            max_proof_bytes: DEFAULT_MAX_PROOF_BYTES,
        }
    }
}

/// Headroom on top of the base64-encoded proof for the rest of the order.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Largest request body that can still carry a proof of
/// `max_proof_bytes` as a base64 data URI.
///
/// ```rust
/// use atlas_api::config::request_body_limit;
///
/// // 5 MiB of image is 6.67 MiB of base64, plus 1 MiB for the order
/// assert_eq!(request_body_limit(5 * 1024 * 1024), 6_990_508 + 1_048_576);
/// ```
pub const fn request_body_limit(max_proof_bytes: usize) -> usize {
    max_proof_bytes.div_ceil(3) * 4 + BODY_OVERHEAD_BYTES
}

impl ApiConfig {
    /// Request body limit derived from `max_proof_bytes`.
    pub fn body_limit(&self) -> usize {
        request_body_limit(self.max_proof_bytes)
    }

    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: parse_var("ATLAS_HTTP_PORT", defaults.http_port)?,
            db_path: env::var("ATLAS_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            db_max_connections: parse_var("ATLAS_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            proof_dir: env::var("ATLAS_PROOF_DIR").map(PathBuf::from).unwrap_or(defaults.proof_dir),
            proof_url_prefix: env::var("ATLAS_PROOF_URL_PREFIX").unwrap_or(defaults.proof_url_prefix),
            max_proof_bytes: parse_var("ATLAS_MAX_PROOF_BYTES", defaults.max_proof_bytes)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("ATLAS_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
