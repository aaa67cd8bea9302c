//! Session lookup: `TokenPresented -> {Resolved | Rejected}`.

use super::{AccountService, AuthError, PublicProfile};

impl AccountService {
    /// Resolve a bearer token to the profile of the user it names.
    ///
    /// The user is re-read from the store rather than trusted from the claim.
    ///
    /// # Errors
    /// - `AuthError::InvalidToken` if the token does not verify or its user
    ///   no longer exists.
    /// - `AuthError::Fatal` on store failure.
    pub async fn resolve_session(&self, token: &str) -> Result<PublicProfile, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::InvalidToken)?;

        let Some(user) = self.store.find_by_username(&claims.username).await? else {
            tracing::warn!(username = %claims.username, "valid token for missing user");
            return Err(AuthError::InvalidToken);
        };

        Ok(PublicProfile {
            username: user.username,
        })
    }
}
