//! Errors returned by `TodoClient` parse and build methods.
//!
//! The service answers failures with `{"error": "..."}`. When a response
//! carries that body its message is surfaced; otherwise the raw body is kept.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: the todo does not exist for this tenant.
    #[error("not found: {0}")]
    NotFound(String),

    /// 400: missing tenant header, missing title, or an unreadable body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
