//! Authentication primitives.
//!
//! This module provides the credential hasher, token signing configuration and
//! the token service used by the account flows.
//!
//! # Post-conditions
//! - Signing configuration is immutable once loaded.
//!
//! # Invariants
//! - The signing secret is never empty.
//! - Plaintext passwords never leave the hasher except as a one-way hash.

pub mod jwt;
pub mod jwt_config;
pub mod password;

pub use jwt::{Claims, InvalidToken, JwtError, TokenService};
pub use jwt_config::{JwtConfig, JwtConfigError};
pub use password::{Argon2Hasher, CredentialHasher, HashError};
