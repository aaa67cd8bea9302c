//! Sign-in: `Received -> Lookup -> Verifying -> {Authenticated | InvalidPassword}`.
//!
//! An unknown username is reported as `InvalidPassword`, and still pays for
//! one hash, so a caller cannot tell which usernames exist.

use super::{AccountService, AuthError, Credentials, Session};

impl AccountService {
    /// Check credentials against the stored hash and issue a token.
    ///
    /// # Errors
    /// - `AuthError::InvalidPassword` on a wrong password or unknown username.
    /// - `AuthError::Fatal` on store, hashing or signing failure.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Session, AuthError> {
        let Credentials { username, password } = credentials;

        let Some(user) = self.store.find_by_username(&username).await? else {
            self.hash_password(password).await?;
            tracing::debug!(username = %username, "sign-in for unknown username");
            return Err(AuthError::InvalidPassword);
        };

        if !self.verify_password(password, user.password_hash).await? {
            tracing::debug!(username = %username, "sign-in with wrong password");
            return Err(AuthError::InvalidPassword);
        }

        tracing::info!(username = %username, "user signed in");
        self.issue_session(user.username)
    }
}
