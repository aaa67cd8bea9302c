//! Password hashing.
//!
//! Passwords are stored as Argon2id PHC strings with a fresh random salt per
//! call. Hashing is deliberately slow; callers on an async executor should run
//! it on the blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Error returned when the hashing primitive itself fails.
///
/// A wrong password is never an error; see `CredentialHasher::verify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The Argon2 parameters were rejected.
    InvalidParams(String),
    /// Producing the hash failed.
    Hashing(String),
}

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParams(reason) => write!(f, "invalid argon2 parameters: {reason}"),
            Self::Hashing(reason) => write!(f, "password hashing failed: {reason}"),
        }
    }
}

impl std::error::Error for HashError {}

/// One-way transform of a plaintext secret into a storable hash.
pub trait CredentialHasher: Send + Sync {
    /// Hash `plaintext` with a fresh salt.
    ///
    /// # Errors
    /// Returns `HashError` only on an internal failure of the primitive.
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Check `plaintext` against a stored hash.
    ///
    /// Returns `false` on mismatch and on a stored hash that does not parse.
    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool;
}

/// Argon2id implementation of `CredentialHasher`.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Hasher with the library's recommended Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Hasher with explicit cost parameters.
    ///
    /// # Errors
    /// Returns `HashError::InvalidParams` if Argon2 rejects the combination.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| HashError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt_bytes: [u8; SALT_LEN] = rand::random();
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| HashError::Hashing(e.to_string()))?;

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::Hashing(e.to_string()))
    }

    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
