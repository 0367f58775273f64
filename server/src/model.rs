//! Todo entity and request payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored todo. `id` and `owner` are fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub owner: String,
}

/// Body of `POST /todos`. Only `title` is read; anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `PUT /todos/{id}`. Absent or `null` fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl Todo {
    /// Applies a partial update, leaving `id` and `owner` untouched.
    pub fn merge(mut self, update: UpdateTodo) -> Self {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self
    }
}
