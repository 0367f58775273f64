//! Lenient JSON body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Like `axum::Json`, but an empty body decodes to `T::default()` and the
/// content type is not checked. Bodies that fail to decode reject with
/// [`ApiError::MalformedBody`]; bodies that cannot be read at all keep the
/// status axum assigns them (413 for an oversized body).
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|err| ApiError::UnreadableBody {
                status: err.status(),
                message: err.body_text(),
            })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|err| ApiError::MalformedBody(err.to_string()))
    }
}
