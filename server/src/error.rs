//! Request-level errors and their HTTP mapping.
//!
//! # Design
//! Every failure a handler can hit is an [`ApiError`]. Each variant maps to
//! one status code, and its `Display` text becomes the `error` field of the
//! JSON body. Storage failures keep their source for logging but render a
//! generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The `x-channel` header was absent or empty.
    #[error("x-channel header is required")]
    MissingTenant,

    /// A required field was missing from the request body.
    #[error("{0}")]
    Validation(String),

    /// The request body was not JSON of the expected shape.
    #[error("Invalid JSON body: {0}")]
    MalformedBody(String),

    /// No todo exists at the requested (tenant, id).
    #[error("Todo not found")]
    NotFound,

    /// No route matches the request path.
    #[error("Not found")]
    RouteNotFound,

    /// The path exists but does not accept the request method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The body could not be read, e.g. it exceeded the size limit.
    #[error("{message}")]
    UnreadableBody { status: StatusCode, message: String },

    #[error("Internal server error")]
    Storage(#[from] StoreError),
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingTenant | ApiError::Validation(_) | ApiError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnreadableBody { status, .. } => *status,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(err) = &self {
            tracing::error!(error = %err, "storage operation failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
