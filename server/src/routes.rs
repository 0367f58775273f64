use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::model::{CreateTodo, Todo, UpdateTodo};
use crate::repository::TodoRepository;
use crate::tenant::Tenant;

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoRepository,
}

pub async fn list_todos(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos: Vec<Todo> = state.todos.list(&tenant).try_collect().await?;
    tracing::debug!(%tenant, count = todos.len(), "listed todos");
    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    tenant: Tenant,
    JsonBody(input): JsonBody<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.todos.create(&tenant, input.title).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    state.todos.get(&tenant, &id).await.map(Json)
}

pub async fn update_todo(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateTodo>,
) -> Result<Json<Todo>, ApiError> {
    state.todos.update(&tenant, &id, input).await.map(Json)
}

pub async fn delete_todo(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.todos.delete(&tenant, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
