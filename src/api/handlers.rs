//! API handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::types::{Todo, TodoId, TodoSummary};
use crate::Error;

/// Process liveness only; the store is not consulted
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok(None))
}

/// Ping the store within the configured timeout
pub async fn db_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ping = state.repository.ping(state.ping_timeout);

    let result = match tokio::time::timeout(state.ping_timeout, ping).await {
        Ok(result) => result,
        Err(_) => Err(Error::unavailable(format!(
            "ping timed out after {:?}",
            state.ping_timeout
        ))),
    };

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse::ok(Some(
                state.repository.backend_name().to_string(),
            ))),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Store health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse::error(err.to_string())),
            )
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    fn ok(db: Option<String>) -> Self {
        Self {
            status: "ok",
            db,
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: "error",
            db: None,
            error: Some(message),
        }
    }
}

/// Create a todo
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(payload) = payload?;
    let owner = required("owner", payload.owner)?;
    let title = required("title", payload.title)?;

    let todo = state.repository.create(&owner, &title).await?;
    tracing::info!(id = todo.id, owner = %todo.owner, "Todo created");

    Ok((StatusCode::CREATED, Json(todo)))
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default, alias = "username")]
    pub owner: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// List an owner's todos, newest first
pub async fn list_todos(
    State(state): State<AppState>,
    params: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(params) = params?;
    let owner = required("owner", params.owner)?;

    let todos = state.repository.list_by_owner(&owner).await?;
    Ok(Json(todos))
}

/// Completion counts for an owner
pub async fn todo_summary(
    State(state): State<AppState>,
    params: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<TodoSummary>, ApiError> {
    let Query(params) = params?;
    let owner = required("owner", params.owner)?;

    let summary = state.repository.summarize(&owner).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    #[serde(default, alias = "username")]
    pub owner: Option<String>,
}

/// Mark a todo completed
///
/// Answers 200 even when no todo matched the id/owner pair: the store's
/// update does not report affected rows.
pub async fn complete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CompleteTodoRequest>, JsonRejection>,
) -> Result<Json<CompleteTodoResponse>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::bad_request("invalid id format"))?;

    let Json(payload) = payload?;
    let owner = required("owner", payload.owner)?;

    state.repository.complete(id, &owner).await?;
    tracing::info!(id, owner = %owner, "Todo completed");

    Ok(Json(CompleteTodoResponse {
        status: "completed",
        id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CompleteTodoRequest {
    #[serde(default, alias = "username")]
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompleteTodoResponse {
    pub status: &'static str,
    pub id: TodoId,
}

/// Unsigned decimal digits only; `parse` alone would also take a leading `+`
fn parse_id(raw: &str) -> Option<TodoId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::validation(format!("{} is required", field)).into()),
    }
}
