//! API server state

use std::sync::Arc;
use std::time::Duration;

use crate::repository::TodoRepository;

const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Todo repository shared by every request
    pub repository: Arc<dyn TodoRepository>,

    /// Bound on the `/db-health` store ping
    pub ping_timeout: Duration,
}

impl AppState {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            repository,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }
}
