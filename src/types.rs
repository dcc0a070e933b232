//! Core types for todosvc

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Todo ID type
pub type TodoId = u64;

/// A single task owned by one actor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub owner: String,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Build a freshly created, not yet completed todo
    pub fn new(
        id: TodoId,
        owner: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            title: title.into(),
            is_completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Mark as completed at `at`. Re-applying moves `completed_at` forward.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }
}

/// Completion counts for one owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TodoSummary {
    pub owner: String,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TodoSummary {
    pub fn from_todos(owner: impl Into<String>, todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|t| t.is_completed).count();

        Self {
            owner: owner.into(),
            total,
            completed,
            pending: total - completed,
        }
    }
}
