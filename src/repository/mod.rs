//! Todo repository
//!
//! Owner-scoped create/list/complete operations. Handlers only ever see the
//! [`TodoRepository`] trait, so the backend is chosen at startup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::store::{ClickHouseClient, StoreConfig};
use crate::types::{Todo, TodoId, TodoSummary};
use crate::Result;

pub mod memory;
pub mod store;

pub use memory::MemoryTodoRepository;
pub use store::StoreTodoRepository;

/// Todo repository trait
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Name of the backing store, reported by `/db-health`
    fn backend_name(&self) -> &str;

    /// Check the backing store is reachable
    async fn ping(&self, timeout: Duration) -> Result<()>;

    /// Persist a new, not yet completed todo and return it as constructed
    async fn create(&self, owner: &str, title: &str) -> Result<Todo>;

    /// All todos of `owner`, most recently created first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Todo>>;

    /// Mark the todo matching both `id` and `owner` as completed.
    ///
    /// Succeeds whether or not a row matched.
    async fn complete(&self, id: TodoId, owner: &str) -> Result<()>;

    async fn summarize(&self, owner: &str) -> Result<TodoSummary> {
        let todos = self.list_by_owner(owner).await?;
        Ok(TodoSummary::from_todos(owner, &todos))
    }
}

/// Settings the store-backed repository needs beyond the connection itself
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub store: StoreConfig,
    pub table: String,
    pub ensure_table: bool,
    pub ping_timeout: Duration,
}

/// Create the configured repository.
///
/// For ClickHouse this connects, pings and (optionally) creates the table;
/// any failure is returned immediately without retrying.
pub async fn create_repository(config: RepositoryConfig) -> Result<Arc<dyn TodoRepository>> {
    match config.store {
        StoreConfig::ClickHouse(ch) => {
            let client = ClickHouseClient::connect(ch)?;
            let repository = StoreTodoRepository::new(Arc::new(client), config.table);

            repository.ping(config.ping_timeout).await?;
            if config.ensure_table {
                repository.ensure_table().await?;
            }

            Ok(Arc::new(repository))
        }
        StoreConfig::Memory => Ok(Arc::new(MemoryTodoRepository::new())),
    }
}
