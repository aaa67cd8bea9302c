//! Token signing configuration.
//!
//! # Pre-conditions
//! - The secret must be non-empty.
//! - The token lifetime must be non-zero.
//!
//! # Post-conditions
//! - `JwtConfig` instances are immutable once created.

use std::time::Duration;

/// Error returned when JWT configuration is invalid.
#[derive(Debug, PartialEq, Eq)]
pub enum JwtConfigError {
    /// The HS256 secret is empty.
    EmptySecret,
    /// The token lifetime is zero.
    ZeroTtl,
}

impl std::fmt::Display for JwtConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "HS256 secret must not be empty"),
            Self::ZeroTtl => write!(f, "token lifetime must be greater than zero"),
        }
    }
}

impl std::error::Error for JwtConfigError {}

/// JWT signing configuration.
///
/// Tokens are signed with HMAC-SHA256 using a single process-wide secret.
#[derive(Clone)]
pub struct JwtConfig {
    secret: Vec<u8>,
    ttl: Duration,
}

impl JwtConfig {
    /// Create a new HS256 JWT configuration.
    ///
    /// # Errors
    /// Returns `JwtConfigError::EmptySecret` if the secret is empty and
    /// `JwtConfigError::ZeroTtl` if `ttl` is zero.
    pub fn new_hs256(secret: Vec<u8>, ttl: Duration) -> Result<Self, JwtConfigError> {
        if secret.is_empty() {
            return Err(JwtConfigError::EmptySecret);
        }
        if ttl.is_zero() {
            return Err(JwtConfigError::ZeroTtl);
        }
        Ok(Self { secret, ttl })
    }

    /// The shared secret used for HMAC-SHA256.
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// How long an issued token stays valid.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
