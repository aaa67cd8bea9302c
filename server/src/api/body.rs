//! JSON request bodies checked against a required-fields schema.
//!
//! Every field a schema lists must be present and a string. Fields are checked
//! in schema order and the first failure is reported.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;

/// A request body with a fixed set of required string properties.
pub trait RequestSchema: DeserializeOwned {
    /// Wire names of required properties, in reporting order.
    const REQUIRED: &'static [&'static str];
}

/// Extractor that validates the body against `T::REQUIRED` before
/// deserializing it.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        parse_body(&bytes).map(Self)
    }
}

/// Validate and deserialize raw body bytes.
pub fn parse_body<T: RequestSchema>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::BadRequest(format!("body is not valid JSON: {e}")))?
    };

    let Value::Object(fields) = &value else {
        return Err(ApiError::BadRequest("body should be object".to_string()));
    };

    for name in T::REQUIRED {
        match fields.get(*name) {
            None => return Err(ApiError::missing_property(name)),
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(ApiError::BadRequest(format!("body.{name} should be string")));
            }
        }
    }

    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}
