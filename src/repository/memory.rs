//! In-process repository
//!
//! Completion is visible immediately. Nothing survives a restart.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::id::IdGenerator;
use crate::types::{Todo, TodoId};
use crate::Result;

use super::TodoRepository;

#[derive(Default)]
pub struct MemoryTodoRepository {
    todos: DashMap<TodoId, Todo>,
    ids: IdGenerator,
}

impl MemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn ping(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn create(&self, owner: &str, title: &str) -> Result<Todo> {
        let todo = Todo::new(self.ids.next_id(), owner, title, Utc::now());
        self.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .todos
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.value().clone())
            .collect();

        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(todos)
    }

    async fn complete(&self, id: TodoId, owner: &str) -> Result<()> {
        if let Some(mut todo) = self.todos.get_mut(&id) {
            if todo.owner == owner {
                todo.mark_completed(Utc::now());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_list() {
        let repo = MemoryTodoRepository::new();
        assert!(repo.is_empty());

        let created = repo.create("alice", "buy milk").await.unwrap();
        let todos = repo.list_by_owner("alice").await.unwrap();

        assert_eq!(todos, vec![created]);
        assert_eq!(repo.len(), 1);
        assert!(!repo.is_empty());
        assert!(!todos[0].is_completed);
        assert!(todos[0].completed_at.is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_scoped() {
        let repo = MemoryTodoRepository::new();
        for title in ["one", "two", "three"] {
            repo.create("alice", title).await.unwrap();
        }
        repo.create("bob", "other").await.unwrap();

        let todos = repo.list_by_owner("alice").await.unwrap();
        assert_eq!(todos.len(), 3);
        assert_eq!(todos[0].title, "three");
        for pair in todos.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        assert!(todos.iter().all(|t| t.owner == "alice"));

        assert!(repo.list_by_owner("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_sets_flag_and_time() {
        let repo = MemoryTodoRepository::new();
        let todo = repo.create("alice", "buy milk").await.unwrap();

        repo.complete(todo.id, "alice").await.unwrap();

        let todos = repo.list_by_owner("alice").await.unwrap();
        assert!(todos[0].is_completed);
        assert!(todos[0].completed_at.unwrap() >= todos[0].created_at);
    }

    #[tokio::test]
    async fn test_complete_other_owner_is_silent_noop() {
        let repo = MemoryTodoRepository::new();
        let todo = repo.create("alice", "buy milk").await.unwrap();

        repo.complete(todo.id, "bob").await.unwrap();
        repo.complete(todo.id + 1_000, "alice").await.unwrap();

        let todos = repo.list_by_owner("alice").await.unwrap();
        assert!(!todos[0].is_completed);
    }

    #[tokio::test]
    async fn test_summarize() {
        let repo = MemoryTodoRepository::new();
        let todo = repo.create("alice", "buy milk").await.unwrap();
        repo.create("alice", "walk dog").await.unwrap();
        repo.complete(todo.id, "alice").await.unwrap();

        let summary = repo.summarize("alice").await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.pending, 1);
    }
}
