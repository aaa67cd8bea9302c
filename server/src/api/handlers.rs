//! Route handlers.

use axum::Json;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Method, header};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::body::{RequestSchema, ValidatedJson};
use super::error::ApiError;
use crate::flows::{Credentials, Registration};

/// `POST /signup` body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    full_name: String,
    username: String,
    password: String,
}

impl RequestSchema for SignupBody {
    const REQUIRED: &'static [&'static str] = &["fullName", "username", "password"];
}

/// `POST /signin` body.
#[derive(Deserialize)]
pub struct SigninBody {
    username: String,
    password: String,
}

impl RequestSchema for SigninBody {
    const REQUIRED: &'static [&'static str] = &["username", "password"];
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
}

pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SignupBody>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state
        .accounts
        .register(Registration {
            full_name: body.full_name,
            username: body.username,
            password: body.password,
        })
        .await?;
    Ok(Json(TokenResponse {
        token: session.token,
    }))
}

pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SigninBody>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state
        .accounts
        .authenticate(Credentials {
            username: body.username,
            password: body.password,
        })
        .await?;
    Ok(Json(TokenResponse {
        token: session.token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let profile = state.accounts.resolve_session(token).await?;
    Ok(Json(ProfileResponse {
        username: profile.username,
    }))
}

/// Reports the full request path, prefix included, even inside a nested router.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Route {method}:{} not found", uri.path()))
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::Unauthorized(
            "No Authorization was found in request.headers".to_string(),
        ));
    };

    let malformed =
        || ApiError::Unauthorized("Format is Authorization: Bearer [token]".to_string());

    let value = value.to_str().map_err(|_| malformed())?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(malformed()),
    }
}
