//! Multi-tenant todo HTTP service.
//!
//! # Overview
//! Tenants are named by the `x-channel` request header. Every route runs
//! behind [`tenant::require_tenant`], and every todo is stored under a
//! tenant-scoped key, so one tenant's todos are never visible to another.
//!
//! # Design
//! - [`store`] is the ordered key-value layer; [`store::MemoryStore`] is the
//!   bundled backend.
//! - [`repository::TodoRepository`] maps todos onto store keys.
//! - [`routes`] holds the axum handlers; [`error::ApiError`] renders every
//!   failure as `{"error": "..."}`.
//! - The store handle is built once by the caller and injected through
//!   [`router`]; nothing is global.

use std::future::Future;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod repository;
pub mod routes;
pub mod store;
pub mod telemetry;
pub mod tenant;

pub use config::Config;
pub use error::{ApiError, ErrorBody};
pub use model::{CreateTodo, Todo, UpdateTodo};
pub use repository::TodoRepository;
pub use store::{KvStore, MemoryStore};
pub use tenant::{Tenant, TENANT_HEADER};

use routes::AppState;

/// Builds the service over `store`.
pub fn router(store: Arc<dyn KvStore>) -> Router {
    let state = AppState {
        todos: TodoRepository::new(store),
    };
    Router::new()
        .route("/todos", get(routes::list_todos).post(routes::create_todo))
        .route(
            "/todos/{id}",
            get(routes::get_todo)
                .put(routes::update_todo)
                .delete(routes::delete_todo),
        )
        .fallback(routes::route_not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(middleware::from_fn(tenant::require_tenant))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds the service over a fresh in-memory store.
pub fn app() -> Router {
    router(Arc::new(MemoryStore::new()))
}

/// Serves `store` on `listener` until `shutdown` resolves.
pub async fn run<F>(
    listener: TcpListener,
    store: Arc<dyn KvStore>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}
