//! HTTP API server

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Build the API router using the provided application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/db-health", get(handlers::db_health))
        .nest(
            "/api",
            Router::new()
                .route(
                    "/todos",
                    get(handlers::list_todos).post(handlers::create_todo),
                )
                .route("/todos/summary", get(handlers::todo_summary))
                .route("/todos/:id/complete", patch(handlers::complete_todo)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
