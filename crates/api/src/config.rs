//! Process configuration read from environment variables.
//!
//! | variable                | default        |
//! |-------------------------|----------------|
//! | `BIND_ADDR`             | `0.0.0.0:8080` |
//! | `JWT_SECRET`            | required (dev default when `MARKETPLACE_DEV=1`) |
//! | `COMMISSION_TIERS_FILE` | unset: no commission configuration at startup |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use marketplace_commission::{CommissionError, CommissionTier, validate_tiers};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("JWT_SECRET is required (set MARKETPLACE_DEV=1 to use a development secret)")]
    MissingJwtSecret,

    #[error("cannot read commission tiers from {path:?}: {source}")]
    TiersFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse commission tiers from {path:?}: {source}")]
    TiersFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid commission tiers: {0}")]
    InvalidTiers(#[from] CommissionError),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Seeded as commission configuration version 1 when present.
    pub commission_tiers: Option<Vec<CommissionTier>>,
}

impl ApiConfig {
    /// Config with default bind address and no commission tiers.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: jwt_secret.into(),
            commission_tiers: None,
        }
    }

    pub fn with_commission_tiers(mut self, tiers: Vec<CommissionTier>) -> Self {
        self.commission_tiers = Some(tiers);
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_raw.clone(),
                source,
            })?;

        let dev = lookup("MARKETPLACE_DEV").is_some_and(|v| v == "1");
        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if dev => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::MissingJwtSecret),
        };

        let commission_tiers = match lookup("COMMISSION_TIERS_FILE") {
            Some(path) => Some(load_tiers_file(PathBuf::from(path))?),
            None => None,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            commission_tiers,
        })
    }
}

/// Read a JSON array of tiers and check it before the server starts.
pub fn load_tiers_file(path: PathBuf) -> Result<Vec<CommissionTier>, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::TiersFile {
        path: path.clone(),
        source,
    })?;
    let tiers: Vec<CommissionTier> =
        serde_json::from_str(&raw).map_err(|source| ConfigError::TiersFormat {
            path: path.clone(),
            source,
        })?;
    validate_tiers(&tiers)?;
    Ok(tiers)
}
