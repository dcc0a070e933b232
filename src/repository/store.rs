//! Repository backed by a [`StoreClient`]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::id::IdGenerator;
use crate::store::{Params, Row, StoreClient};
use crate::types::{Todo, TodoId};
use crate::Result;

use super::TodoRepository;

const DATETIME: &str = "DateTime64(9, 'UTC')";

/// Row layout of the todos table
#[derive(Debug, Deserialize)]
struct TodoRow {
    id: u64,
    owner: String,
    title: String,
    is_completed: u8,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            owner: row.owner,
            title: row.title,
            is_completed: row.is_completed == 1,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}

fn decode(row: Row) -> Result<Todo> {
    let row: TodoRow = serde_json::from_value(serde_json::Value::Object(row))?;
    Ok(row.into())
}

pub struct StoreTodoRepository {
    store: Arc<dyn StoreClient>,
    table: String,
    ids: IdGenerator,
}

impl StoreTodoRepository {
    /// `table` must be a plain identifier; it is interpolated into statements.
    pub fn new(store: Arc<dyn StoreClient>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            ids: IdGenerator::new(),
        }
    }

    /// Create the todos table if it does not exist yet
    pub async fn ensure_table(&self) -> Result<()> {
        let statement = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id UInt64,
                owner String,
                title String,
                is_completed UInt8,
                created_at {DATETIME},
                completed_at Nullable({DATETIME})
            ) ENGINE = MergeTree ORDER BY id",
            table = self.table,
        );

        self.store.execute(&statement, &Params::new()).await?;
        tracing::info!(table = %self.table, "Todos table ready");
        Ok(())
    }
}

#[async_trait]
impl TodoRepository for StoreTodoRepository {
    fn backend_name(&self) -> &str {
        self.store.name()
    }

    async fn ping(&self, timeout: Duration) -> Result<()> {
        self.store.ping(timeout).await
    }

    async fn create(&self, owner: &str, title: &str) -> Result<Todo> {
        let todo = Todo::new(self.ids.next_id(), owner, title, Utc::now());

        let statement = format!(
            "INSERT INTO {table} (id, owner, title, is_completed, created_at, completed_at)
             SELECT {{id:UInt64}}, {{owner:String}}, {{title:String}}, {{is_completed:UInt8}},
                    {{created_at:{DATETIME}}}, {{completed_at:Nullable({DATETIME})}}",
            table = self.table,
        );
        let params = Params::new()
            .bind("id", todo.id)
            .bind("owner", todo.owner.as_str())
            .bind("title", todo.title.as_str())
            .bind("is_completed", todo.is_completed)
            .bind("created_at", todo.created_at)
            .bind("completed_at", todo.completed_at);

        self.store.execute(&statement, &params).await?;

        tracing::debug!(id = todo.id, owner = %todo.owner, "Todo inserted");
        Ok(todo)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Todo>> {
        let statement = format!(
            "SELECT id, owner, title, is_completed, created_at, completed_at
             FROM {table}
             WHERE owner = {{owner:String}}
             ORDER BY created_at DESC, id DESC",
            table = self.table,
        );
        let params = Params::new().bind("owner", owner);

        let rows = self.store.query(&statement, &params).await?;
        rows.into_iter().map(decode).collect()
    }

    async fn complete(&self, id: TodoId, owner: &str) -> Result<()> {
        // Mutation: applied asynchronously by the store unless configured otherwise
        let statement = format!(
            "ALTER TABLE {table}
             UPDATE is_completed = 1, completed_at = {{completed_at:{DATETIME}}}
             WHERE id = {{id:UInt64}} AND owner = {{owner:String}}",
            table = self.table,
        );
        let params = Params::new()
            .bind("completed_at", Utc::now())
            .bind("id", id)
            .bind("owner", owner);

        self.store.execute(&statement, &params).await?;

        tracing::debug!(id, owner, "Completion mutation submitted");
        Ok(())
    }
}
