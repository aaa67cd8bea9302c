//! Server configuration module.
//!
//! This module provides configuration loading for the authd server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `AUTHD_JWT_SECRET`: Secret used to sign session tokens (required; `JWT_SECRET` is
//!   accepted as a fallback)
//! - `AUTHD_LISTEN_PORT`: Port to listen on (default: `3000`)
//! - `AUTHD_TOKEN_TTL_SECS`: Lifetime of issued tokens in seconds (default: `86400`)
//! - `AUTHD_ROUTE_PREFIX`: Path prefix all routes are mounted under (default: none)
//! - `AUTHD_STORAGE`: User store backend, `file` or `memory` (default: `file`)
//! - `AUTHD_DATA_DIRECTORY`: Directory for the file backend (default: `./data`)
//!
//! # Invariants
//!
//! - `jwt_secret` is never empty
//! - `token_ttl` is never zero
//! - `route_prefix` is either empty or starts with `/` and has no trailing `/`

use std::path::PathBuf;
use std::time::Duration;

/// Which `UserStore` implementation the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Append-only log file in the data directory.
    File,
    /// Process-local map. Records are lost on restart.
    Memory,
}

/// Server configuration.
///
/// # Post-conditions
///
/// When constructed via `from_env()` or `new()`, all invariants listed at the
/// module level hold.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Secret used to sign and verify session tokens.
    pub jwt_secret: String,
    /// How long an issued token stays valid.
    pub token_ttl: Duration,
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
    /// Prefix for every route, e.g. `/auth`. Empty means routes sit at the root.
    pub route_prefix: String,
    /// User store backend.
    pub storage: StorageBackend,
    /// Directory where the file backend keeps `users.log`.
    pub data_directory: PathBuf,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default token lifetime: one day.
    pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
    /// Default data directory for the file backend.
    pub const DEFAULT_DATA_DIRECTORY: &'static str = "./data";

    const SECRET_VAR: &'static str = "AUTHD_JWT_SECRET";
    const LEGACY_SECRET_VAR: &'static str = "JWT_SECRET";
    const PORT_VAR: &'static str = "AUTHD_LISTEN_PORT";
    const TTL_VAR: &'static str = "AUTHD_TOKEN_TTL_SECS";
    const PREFIX_VAR: &'static str = "AUTHD_ROUTE_PREFIX";
    const STORAGE_VAR: &'static str = "AUTHD_STORAGE";
    const DATA_DIRECTORY_VAR: &'static str = "AUTHD_DATA_DIRECTORY";

    /// Build a configuration from a caller-supplied secret, with defaults for
    /// everything else.
    ///
    /// # Errors
    ///
    /// Returns an error if `jwt_secret` is empty.
    pub fn new(jwt_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::SECRET_VAR.to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            jwt_secret,
            token_ttl: Duration::from_secs(Self::DEFAULT_TOKEN_TTL_SECS),
            listen_port: Self::DEFAULT_PORT,
            route_prefix: String::new(),
            storage: StorageBackend::File,
            data_directory: PathBuf::from(Self::DEFAULT_DATA_DIRECTORY),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - neither `AUTHD_JWT_SECRET` nor `JWT_SECRET` is set, or the value is empty
    /// - any optional variable is set to a value that does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` passes the process environment; tests pass a map.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(Self::SECRET_VAR)
            .or_else(|| lookup(Self::LEGACY_SECRET_VAR))
            .ok_or_else(|| ConfigError::MissingEnvVar(Self::SECRET_VAR.to_string()))?;

        let mut config = Self::new(secret)?;
        if let Some(value) = lookup(Self::PORT_VAR) {
            config.listen_port = parse_port(&value)?;
        }
        if let Some(value) = lookup(Self::TTL_VAR) {
            config.token_ttl = parse_ttl(&value)?;
        }
        if let Some(value) = lookup(Self::PREFIX_VAR) {
            config.route_prefix = parse_prefix(&value)?;
        }
        if let Some(value) = lookup(Self::STORAGE_VAR) {
            config.storage = parse_storage(&value)?;
        }
        if let Some(value) = lookup(Self::DATA_DIRECTORY_VAR) {
            config.data_directory = PathBuf::from(value);
        }

        Ok(config)
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidValue {
            name: ServerConfig::PORT_VAR.to_string(),
            message: format!("'{value}' is not a valid port number (must be 1-65535)"),
        }),
    }
}

fn parse_ttl(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            name: ServerConfig::TTL_VAR.to_string(),
            message: format!("'{value}' is not a positive number of seconds"),
        }),
    }
}

fn parse_prefix(value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Ok(String::new());
    }
    if !value.starts_with('/') || value.ends_with('/') {
        return Err(ConfigError::InvalidValue {
            name: ServerConfig::PREFIX_VAR.to_string(),
            message: format!("'{value}' must start with '/' and must not end with '/'"),
        });
    }
    Ok(value.to_string())
}

fn parse_storage(value: &str) -> Result<StorageBackend, ConfigError> {
    match value {
        "file" => Ok(StorageBackend::File),
        "memory" => Ok(StorageBackend::Memory),
        other => Err(ConfigError::InvalidValue {
            name: ServerConfig::STORAGE_VAR.to_string(),
            message: format!("'{other}' is not one of: file, memory"),
        }),
    }
}
