//! Session token issuance and verification.
//!
//! Tokens are HS256-signed JSON Web Tokens carrying a single identity claim,
//! `username`, plus `iat` and `exp`.
//!
//! # Pre-conditions
//! - The `JwtConfig` holds a non-empty secret and a non-zero lifetime.
//!
//! # Post-conditions
//! - `issue` returns a token that `verify` accepts until `exp` passes.
//! - `verify` never reports why a token was rejected; the cause is only logged.
//!
//! # Invariants
//! - Verification is stateless: validity is a function of signature and expiry.
//! - No leeway is applied to `exp`.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::JwtConfig;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated identity.
    pub username: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Why a token failed to verify, or why signing failed.
///
/// Only used for logging and tests; callers of `TokenService::verify` see
/// `InvalidToken`.
#[derive(Debug)]
pub enum JwtError {
    /// The JWT signature is invalid.
    InvalidSignature,
    /// The JWT has expired.
    TokenExpired,
    /// The JWT is malformed or cannot be parsed.
    MalformedToken,
    /// The 'username' claim is missing or empty.
    MissingUsernameClaim,
    /// Encoding the token failed.
    Signing(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "invalid JWT signature"),
            Self::TokenExpired => write!(f, "JWT has expired"),
            Self::MalformedToken => write!(f, "malformed JWT"),
            Self::MissingUsernameClaim => write!(f, "missing 'username' claim in JWT"),
            Self::Signing(reason) => write!(f, "failed to sign JWT: {reason}"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Uniform rejection returned by `TokenService::verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidToken;

impl std::fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid token")
    }
}

impl std::error::Error for InvalidToken {}

/// Issues and verifies session tokens with a process-wide secret.
///
/// Holds only immutable key material, so it is shared across tasks behind an
/// `Arc` without locking.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            decoding_key: DecodingKey::from_secret(config.secret()),
            validation,
            ttl_secs: config.ttl().as_secs(),
        }
    }

    /// Sign a token for `username`, valid from now for the configured lifetime.
    ///
    /// # Errors
    /// Returns `JwtError::Signing` if encoding fails. This is a server fault.
    pub fn issue(&self, username: &str) -> Result<String, JwtError> {
        let iat = now_secs();
        let claims = Claims {
            username: username.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    /// Returns `InvalidToken` for any corruption, signature mismatch, expiry or
    /// missing claim.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.decode_claims(token).map_err(|e| {
            tracing::debug!("rejected token: {e}");
            InvalidToken
        })
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;

        if token_data.claims.username.is_empty() {
            return Err(JwtError::MissingUsernameClaim);
        }

        Ok(token_data.claims)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Maps jsonwebtoken errors to our `JwtError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        _ => JwtError::MalformedToken,
    }
}
