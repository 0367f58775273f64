//! Wire types for the todo API.
//!
//! # Design
//! Defined independently from the server crate so the client does not pull
//! in axum. The integration test drives the real server and catches schema
//! drift between the two.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A todo as returned by the service. `owner` is the tenant that created it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub owner: String,
}

/// Request payload for creating a todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for updating a todo. Only fields that are `Some` are sent;
/// the service keeps the stored value for the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Body of every error response: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
