//! Account flows: registration, authentication and session lookup.
//!
//! Each flow is a method on `AccountService`, which owns handles to the user
//! store, the credential hasher and the token service. All three are injected
//! at construction and shared between concurrent requests.
//!
//! # Error Model
//!
//! Every flow returns `Result<_, AuthError>`. `UsernameTaken`,
//! `InvalidPassword`, `EmptyField` and `InvalidToken` are expected outcomes
//! the caller can recover from; `Fatal` is a server fault. Mapping to HTTP
//! status codes happens only in `crate::api`.
//!
//! # Invariants
//!
//! - No flow keeps state between calls. Every decision is re-derived from the
//!   store and the token signature.
//! - Plaintext passwords are only ever handed to the hasher.

mod authentication;
mod registration;
mod session;

use std::sync::Arc;

use crate::auth::{CredentialHasher, HashError, JwtError, TokenService};
use crate::storage::{StoreError, UserStore};

/// Input to `AccountService::register`.
#[derive(Clone)]
pub struct Registration {
    pub full_name: String,
    pub username: String,
    pub password: String,
}

/// Input to `AccountService::authenticate`.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A successful registration or sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub token: String,
}

/// The only user data session lookup returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicProfile {
    pub username: String,
}

/// Server-side failure underneath a flow.
#[derive(Debug)]
pub enum FatalError {
    /// The user store failed.
    Store(StoreError),
    /// The hashing primitive failed.
    Hash(HashError),
    /// Signing a token failed.
    Token(JwtError),
    /// A blocking task panicked or was cancelled.
    Task(String),
}

impl std::fmt::Display for FatalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::Hash(e) => write!(f, "{e}"),
            Self::Token(e) => write!(f, "{e}"),
            Self::Task(reason) => write!(f, "blocking task failed: {reason}"),
        }
    }
}

impl std::error::Error for FatalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Hash(e) => Some(e),
            Self::Token(e) => Some(e),
            Self::Task(_) => None,
        }
    }
}

/// Outcome of a failed flow.
#[derive(Debug)]
pub enum AuthError {
    /// Registration hit an existing username.
    UsernameTaken,
    /// Sign-in failed. Covers both a wrong password and an unknown username.
    InvalidPassword,
    /// A required input field was empty.
    EmptyField(&'static str),
    /// The presented token is corrupt, forged, expired, or names a user that
    /// no longer exists.
    InvalidToken,
    /// Server fault.
    Fatal(FatalError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameTaken => write!(f, "username already registered"),
            Self::InvalidPassword => write!(f, "Invalid password"),
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::InvalidToken => write!(f, "Authorization token is invalid"),
            Self::Fatal(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fatal(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FatalError> for AuthError {
    fn from(e: FatalError) -> Self {
        Self::Fatal(e)
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        Self::Fatal(FatalError::Store(e))
    }
}

impl From<HashError> for AuthError {
    fn from(e: HashError) -> Self {
        Self::Fatal(FatalError::Hash(e))
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        Self::Fatal(FatalError::Token(e))
    }
}

/// Entry point for all account flows.
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Hash on the blocking pool so slow hashing never stalls the executor.
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| FatalError::Task(e.to_string()))??;
        Ok(hash)
    }

    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    async fn verify_password(
        &self,
        password: String,
        stored_hash: String,
    ) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| FatalError::Task(e.to_string()))?;
        Ok(matches)
    }

    fn issue_session(&self, username: String) -> Result<Session, AuthError> {
        let token = self.tokens.issue(&username)?;
        Ok(Session { username, token })
    }
}
