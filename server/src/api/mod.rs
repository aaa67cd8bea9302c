//! HTTP boundary.
//!
//! Parses and validates request bodies, calls into `AccountService`, and maps
//! `AuthError` to status codes and response shapes. No account logic lives
//! here.
//!
//! | Route         | Success              | Client error                           |
//! |---------------|----------------------|----------------------------------------|
//! | `POST /signup`| 200 `{token}`        | 400 `{message}`                        |
//! | `POST /signin`| 200 `{token}`        | 400 `{status: "Invalid password"}`     |
//! | `GET /me`     | 200 `{username}`     | 401 `{message}`                        |

mod body;
mod error;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::flows::AccountService;

pub use error::ApiError;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
}

impl AppState {
    #[must_use]
    pub fn new(accounts: AccountService) -> Self {
        Self {
            accounts: Arc::new(accounts),
        }
    }
}

/// Build the router, mounting every route under `prefix`.
///
/// Unknown paths and known paths with the wrong method both answer with a
/// JSON 404.
///
/// # Pre-conditions
/// - `prefix` is empty or starts with `/` and has no trailing `/`.
pub fn router(state: AppState, prefix: &str) -> Router {
    let routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/me", get(handlers::me))
        .method_not_allowed_fallback(handlers::not_found)
        .with_state(state);

    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };
    app.fallback(handlers::not_found)
}
