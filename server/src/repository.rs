//! Tenant-scoped todo persistence.
//!
//! # Design
//! A todo lives at `["todos", <tenant>, <id>]`, so a tenant's todos are a
//! prefix scan on `["todos", <tenant>]` and no operation can address a record
//! outside the caller's namespace. Ids are UUIDv7: their string form sorts by
//! creation time, so key order doubles as creation order.

use std::sync::Arc;

use futures::stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Todo, UpdateTodo};
use crate::store::{self, Key, KvStore, StoreError, DEFAULT_PAGE_SIZE};
use crate::tenant::Tenant;

const NAMESPACE: &str = "todos";

#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn KvStore>,
    page_size: usize,
}

impl TodoRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets how many records each backend scan fetches while listing.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn key(tenant: &Tenant, id: &str) -> Key {
        Key::new([NAMESPACE, tenant.as_str(), id])
    }

    fn prefix(tenant: &Tenant) -> Key {
        Key::new([NAMESPACE, tenant.as_str()])
    }

    pub async fn create(&self, tenant: &Tenant, title: Option<String>) -> Result<Todo, ApiError> {
        let title = title
            .filter(|title| !title.is_empty())
            .ok_or_else(|| ApiError::Validation("Title is required".to_string()))?;

        let todo = Todo {
            id: Uuid::now_v7(),
            title,
            completed: false,
            owner: tenant.as_str().to_string(),
        };
        self.put(tenant, &todo).await?;
        tracing::info!(%tenant, id = %todo.id, "todo created");
        Ok(todo)
    }

    /// Streams the tenant's todos in id order.
    pub fn list(
        &self,
        tenant: &Tenant,
    ) -> impl Stream<Item = Result<Todo, ApiError>> + Send + 'static {
        store::list(self.store.clone(), Self::prefix(tenant), self.page_size).map(
            |entry| -> Result<Todo, ApiError> {
                let entry = entry?;
                let todo = serde_json::from_value(entry.value).map_err(StoreError::from)?;
                Ok(todo)
            },
        )
    }

    pub async fn get(&self, tenant: &Tenant, id: &str) -> Result<Todo, ApiError> {
        let value = self
            .store
            .get(&Self::key(tenant, id))
            .await?
            .ok_or(ApiError::NotFound)?;
        let todo = serde_json::from_value(value).map_err(StoreError::from)?;
        Ok(todo)
    }

    pub async fn update(
        &self,
        tenant: &Tenant,
        id: &str,
        update: UpdateTodo,
    ) -> Result<Todo, ApiError> {
        let todo = self.get(tenant, id).await?.merge(update);
        self.put(tenant, &todo).await?;
        tracing::debug!(%tenant, %id, "todo updated");
        Ok(todo)
    }

    pub async fn delete(&self, tenant: &Tenant, id: &str) -> Result<(), ApiError> {
        let key = Self::key(tenant, id);
        if self.store.get(&key).await?.is_none() {
            return Err(ApiError::NotFound);
        }
        self.store.delete(&key).await?;
        tracing::info!(%tenant, %id, "todo deleted");
        Ok(())
    }

    async fn put(&self, tenant: &Tenant, todo: &Todo) -> Result<(), ApiError> {
        let value = serde_json::to_value(todo).map_err(StoreError::from)?;
        self.store
            .set(Self::key(tenant, &todo.id.to_string()), value)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use futures::TryStreamExt;

    fn tenant(id: &str) -> Tenant {
        Tenant::new(id).unwrap()
    }

    fn repo() -> (TodoRepository, MemoryStore) {
        let store = MemoryStore::new();
        (TodoRepository::new(Arc::new(store.clone())), store)
    }

    async fn list(repo: &TodoRepository, tenant: &Tenant) -> Vec<Todo> {
        repo.list(tenant).try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn create_stamps_owner_and_defaults() {
        let (repo, store) = repo();
        let alice = tenant("alice");

        let todo = repo.create(&alice, Some("Buy milk".into())).await.unwrap();
        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.owner, "alice");
        assert!(!todo.id.is_nil());

        let id = todo.id.to_string();
        let key = Key::new(["todos", "alice", id.as_str()]);
        let stored: Todo = serde_json::from_value(store.get(&key).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored, todo);
    }

    #[tokio::test]
    async fn create_without_title_writes_nothing() {
        let (repo, store) = repo();
        let alice = tenant("alice");

        for title in [None, Some(String::new())] {
            let err = repo.create(&alice, title).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(ref msg) if msg == "Title is required"));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn list_is_scoped_to_tenant() {
        let (repo, _) = repo();
        let alice = tenant("alice");
        let bob = tenant("bob");

        let mine = repo.create(&alice, Some("mine".into())).await.unwrap();
        repo.create(&bob, Some("theirs".into())).await.unwrap();

        assert_eq!(list(&repo, &alice).await, vec![mine]);
        assert_eq!(list(&repo, &bob).await.len(), 1);
        assert!(list(&repo, &tenant("carol")).await.is_empty());
    }

    #[tokio::test]
    async fn list_returns_creation_order_across_pages() {
        let (repo, _) = repo();
        let repo = repo.with_page_size(2);
        let alice = tenant("alice");

        let mut created = Vec::new();
        for i in 0..5 {
            created.push(repo.create(&alice, Some(format!("task {i}"))).await.unwrap());
        }
        assert_eq!(list(&repo, &alice).await, created);
    }

    #[tokio::test]
    async fn other_tenants_cannot_reach_a_todo() {
        let (repo, _) = repo();
        let alice = tenant("alice");
        let bob = tenant("bob");
        let todo = repo.create(&alice, Some("private".into())).await.unwrap();
        let id = todo.id.to_string();

        assert!(matches!(repo.get(&bob, &id).await, Err(ApiError::NotFound)));
        let hijack = UpdateTodo {
            title: Some("hijacked".into()),
            completed: None,
        };
        assert!(matches!(
            repo.update(&bob, &id, hijack).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(repo.delete(&bob, &id).await, Err(ApiError::NotFound)));
        assert_eq!(repo.get(&alice, &id).await.unwrap(), todo);
    }

    #[tokio::test]
    async fn update_merges_and_persists() {
        let (repo, _) = repo();
        let alice = tenant("alice");
        let todo = repo.create(&alice, Some("Walk dog".into())).await.unwrap();
        let id = todo.id.to_string();

        let updated = repo
            .update(&alice, &id, UpdateTodo { title: None, completed: Some(true) })
            .await
            .unwrap();
        assert_eq!(updated.title, "Walk dog");
        assert!(updated.completed);
        assert_eq!(repo.get(&alice, &id).await.unwrap(), updated);

        let unchanged = repo.update(&alice, &id, UpdateTodo::default()).await.unwrap();
        assert_eq!(unchanged, updated);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let (repo, store) = repo();
        let alice = tenant("alice");
        let todo = repo.create(&alice, Some("temp".into())).await.unwrap();
        let id = todo.id.to_string();

        repo.delete(&alice, &id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(repo.get(&alice, &id).await, Err(ApiError::NotFound)));
        assert!(matches!(repo.delete(&alice, &id).await, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn undecodable_record_is_a_storage_error() {
        let (repo, store) = repo();
        let alice = tenant("alice");
        store
            .set(Key::new(["todos", "alice", "broken"]), serde_json::json!({"title": 1}))
            .await
            .unwrap();

        assert!(matches!(
            repo.get(&alice, "broken").await,
            Err(ApiError::Storage(StoreError::Codec(_)))
        ));
        let listed: Result<Vec<Todo>, _> = repo.list(&alice).try_collect().await;
        assert!(matches!(listed, Err(ApiError::Storage(_))));
    }
}
