//! Synchronous client core for the multi-tenant todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. The caller executes the HTTP round-trip, so the
//! core stays deterministic and works with any transport.
//!
//! # Design
//! - A `TodoClient` is bound to one tenant and stamps `x-channel` on every
//!   request it builds. `with_tenant` derives a client for another tenant.
//! - Each operation is split into `build_*` and `parse_*`.
//! - `{"error": ...}` bodies are decoded into `ApiError::BadRequest` and
//!   `ApiError::NotFound` messages.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, TENANT_HEADER};
pub use types::{CreateTodo, ErrorBody, Todo, UpdateTodo};
