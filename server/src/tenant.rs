//! Tenant resolution from the `x-channel` header.
//!
//! [`require_tenant`] runs ahead of every route. It rejects requests without
//! a usable header and stores the resolved [`Tenant`] in the request
//! extensions, where handlers pick it up through the [`Tenant`] extractor.

use std::fmt;

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Header carrying the tenant identifier.
pub const TENANT_HEADER: &str = "x-channel";

/// A non-empty tenant identifier. Any non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tenant(String);

impl Tenant {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (!id.is_empty()).then_some(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads the tenant from `headers`. Any non-empty UTF-8 value is a
    /// tenant id.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        headers
            .get(TENANT_HEADER)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
            .and_then(Tenant::new)
            .ok_or(ApiError::MissingTenant)
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Middleware gate: short-circuits with 400 when the tenant header is
/// missing, otherwise forwards the request with the [`Tenant`] attached.
pub async fn require_tenant(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let tenant = match Tenant::from_headers(request.headers()) {
        Ok(tenant) => tenant,
        Err(err) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "rejecting request without tenant header"
            );
            return Err(err);
        }
    };
    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Tenant>() {
            Some(tenant) => Ok(tenant.clone()),
            None => Tenant::from_headers(&parts.headers),
        }
    }
}
