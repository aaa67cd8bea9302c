//! Fixtures shared by unit and end-to-end tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::{Argon2Hasher, JwtConfig, TokenService};
use crate::flows::AccountService;
use crate::storage::{InsertOutcome, MemoryUserStore, StoreError, UserRecord, UserStore};

/// Signing secret used by every test fixture.
pub const TEST_SECRET: &str = "thisisalongsecretjustfortests";

/// Argon2id with minimal cost so tests stay fast.
#[must_use]
pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(1024, 1, 1).expect("valid argon2 params")
}

/// Token service signing with `TEST_SECRET` and a one hour lifetime.
#[must_use]
pub fn test_token_service() -> TokenService {
    let config = JwtConfig::new_hs256(TEST_SECRET.as_bytes().to_vec(), Duration::from_secs(3600))
        .expect("valid jwt config");
    TokenService::new(&config)
}

/// Account service over a fresh in-memory store. The store handle is returned
/// so tests can inspect what was persisted.
#[must_use]
#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
pub fn test_account_service() -> (AccountService, Arc<MemoryUserStore>) {
    let store = Arc::new(MemoryUserStore::new());
    let service = AccountService::new(
        Arc::clone(&store) as Arc<dyn UserStore>,
        Arc::new(fast_hasher()),
        Arc::new(test_token_service()),
    );
    (service, store)
}

/// Account service whose store fails every call.
#[must_use]
pub fn failing_account_service() -> AccountService {
    AccountService::new(
        Arc::new(FailingUserStore),
        Arc::new(fast_hasher()),
        Arc::new(test_token_service()),
    )
}

/// A `UserStore` that behaves like an unreachable backend.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn insert_if_absent(&self, _record: UserRecord) -> Result<InsertOutcome, StoreError> {
        Err(StoreError::Io(std::io::Error::other("store unavailable")))
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("store unavailable")))
    }
}
