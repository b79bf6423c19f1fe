// src/config.rs

use std::{env, fmt, net::SocketAddr, str::FromStr};

use jsonwebtoken::Algorithm;
use url::Url;

/// Default endpoint of the Generative Language REST API.
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upper bound for one AI round-trip, in seconds.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

/// Default page size for the unfiltered exam listing.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Hard cap on the page size a caller can request.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Process-wide settings, loaded once at startup and passed around by value.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_base_url: String,
    pub ai_timeout_secs: u64,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub rust_log: String,
}

/// Reason the environment could not be turned into a [`Config`].
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the process environment (after loading `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("SECRET_KEY")?;
        let jwt_algorithm = parse_algorithm(&required("ALGORITHM")?)?;

        let expire_minutes: u64 = parse_number("ACCESS_TOKEN_EXPIRE_MINUTES", &required("ACCESS_TOKEN_EXPIRE_MINUTES")?)?;
        if expire_minutes == 0 {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "must be greater than zero".to_string(),
            });
        }

        let ai_api_key = required("API_KEY")?;
        let ai_model = required("AI_MODEL")?;

        let ai_base_url = lookup("AI_BASE_URL").unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string());
        Url::parse(&ai_base_url).map_err(|e| ConfigError::Invalid {
            key: "AI_BASE_URL",
            reason: e.to_string(),
        })?;

        let ai_timeout_secs = match lookup("AI_TIMEOUT_SECS") {
            Some(raw) => parse_number("AI_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_addr = SocketAddr::from_str(&bind_addr).map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            reason: e.to_string(),
        })?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_algorithm,
            jwt_expiration: expire_minutes * 60,
            ai_api_key,
            ai_model,
            ai_base_url: ai_base_url.trim_end_matches('/').to_string(),
            ai_timeout_secs,
            bind_addr,
            cors_origins,
            rust_log,
        })
    }
}

/// Only HMAC algorithms are usable with a shared secret.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(raw).map_err(|e| ConfigError::Invalid {
        key: "ALGORITHM",
        reason: e.to_string(),
    })?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::Invalid {
            key: "ALGORITHM",
            reason: format!("{:?} needs a key pair, only HS256/HS384/HS512 are supported", other),
        }),
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
