//! Registration: `Received -> Hashing -> Inserting -> {Registered | Conflict}`.

use crate::storage::{InsertOutcome, UserRecord};

use super::{AccountService, AuthError, Registration, Session};

impl AccountService {
    /// Register a new identity and sign it in.
    ///
    /// The username is claimed by the store's atomic insert; there is no
    /// prior existence check.
    ///
    /// # Errors
    /// - `AuthError::EmptyField` if any field is empty.
    /// - `AuthError::UsernameTaken` if the username already exists.
    /// - `AuthError::Fatal` on store, hashing or signing failure.
    pub async fn register(&self, registration: Registration) -> Result<Session, AuthError> {
        let Registration {
            full_name,
            username,
            password,
        } = registration;

        for (field, value) in [
            ("fullName", &full_name),
            ("username", &username),
            ("password", &password),
        ] {
            if value.is_empty() {
                return Err(AuthError::EmptyField(field));
            }
        }

        let password_hash = self.hash_password(password).await?;
        let record = UserRecord {
            username: username.clone(),
            full_name,
            password_hash,
        };

        match self.store.insert_if_absent(record).await? {
            InsertOutcome::Created => {
                tracing::info!(username = %username, "registered user");
                self.issue_session(username)
            }
            InsertOutcome::Conflict => {
                tracing::debug!(username = %username, "registration conflict");
                Err(AuthError::UsernameTaken)
            }
        }
    }
}
