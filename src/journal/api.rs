use crate::journal::{
    JournalEntry, JournalEntryUpdate, JournalService, JournalServiceError, NewJournalEntry,
};
use crate::web::api::{ErrorResponse, parse_datetime};
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct JournalState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// JSON representation of a JournalEntry for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JournalEntryJson {
    /// Unique identifier for the entry
    pub id: u32,
    /// Tag describing the kind of entry, e.g. "meal" or "mood"
    pub entry_type: String,
    /// JSON payload of the entry
    pub content: serde_json::Value,
    /// Timestamp of the entry
    pub timestamp: DateTime<Utc>,
}

impl From<JournalEntry> for JournalEntryJson {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id(),
            entry_type: entry.entry_type().to_string(),
            content: entry.content().clone(),
            timestamp: entry.timestamp(),
        }
    }
}

/// JSON request payload for creating a journal entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJournalEntryRequest {
    /// Tag describing the kind of entry (required)
    pub entry_type: Option<String>,
    /// JSON payload of the entry (required)
    pub content: Option<serde_json::Value>,
    /// Timestamp as an ISO-8601 datetime; defaults to now
    pub timestamp: Option<String>,
}

/// JSON request payload for updating a journal entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateJournalEntryRequest {
    /// New JSON payload
    pub content: Option<serde_json::Value>,
    /// New timestamp as an ISO-8601 datetime
    pub timestamp: Option<String>,
}

/// Custom error type for journal handler operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalApiError {
    /// Represents a request payload validation error.
    #[error("{0}")]
    Validation(String),
    /// Represents a journal service error.
    #[error(transparent)]
    Service(#[from] JournalServiceError),
}

impl IntoResponse for JournalApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, message) = match self {
            JournalApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            JournalApiError::Service(err @ JournalServiceError::EntryNotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            JournalApiError::Service(JournalServiceError::Database(err)) => {
                tracing::error!("Database error while handling journal request: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later.".to_string(),
                )
            }
        };
        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Handler for GET /journal - Returns all journal entries, most recent first.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/journal",
    responses(
        (status = 200, description = "Successfully retrieved journal entries", body = Vec<JournalEntryJson>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Journal"
)]
pub async fn get_journal_entries_handler(
    State(state): State<Arc<JournalState>>,
) -> Result<Json<Vec<JournalEntryJson>>, JournalApiError> {
    let service = JournalService::new(&state.db);
    let entries = service.get_all_entries().await?;
    Ok(Json(
        entries.into_iter().map(JournalEntryJson::from).collect(),
    ))
}

/// Handler for POST /journal - Creates a journal entry.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/journal",
    request_body = CreateJournalEntryRequest,
    responses(
        (status = 201, description = "Journal entry created", body = JournalEntryJson),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Journal"
)]
pub async fn create_journal_entry_handler(
    State(state): State<Arc<JournalState>>,
    Json(payload): Json<CreateJournalEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntryJson>), JournalApiError> {
    let entry_type = payload
        .entry_type
        .filter(|entry_type| !entry_type.trim().is_empty());
    let content = payload.content.filter(|content| !content.is_null());
    let (Some(entry_type), Some(content)) = (entry_type, content) else {
        return Err(JournalApiError::Validation(
            "entry_type and content are required".to_string(),
        ));
    };

    let timestamp = payload
        .timestamp
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_datetime(raw)
                .map_err(|_| JournalApiError::Validation(format!("Invalid timestamp: '{}'", raw)))
        })
        .transpose()?;

    let new_entry = NewJournalEntry {
        entry_type,
        content,
        timestamp,
    };

    let service = JournalService::new(&state.db);
    let created = service.create_entry(new_entry).await?;
    Ok((StatusCode::CREATED, Json(JournalEntryJson::from(created))))
}

/// Handler for PUT /journal/{id} - Updates a journal entry.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/journal/{id}",
    params(("id" = u32, Path, description = "Journal entry ID")),
    request_body = UpdateJournalEntryRequest,
    responses(
        (status = 200, description = "Journal entry updated", body = JournalEntryJson),
        (status = 404, description = "Journal entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Journal"
)]
pub async fn update_journal_entry_handler(
    State(state): State<Arc<JournalState>>,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateJournalEntryRequest>,
) -> Result<Json<JournalEntryJson>, JournalApiError> {
    let timestamp = payload
        .timestamp
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_datetime(raw)
                .map_err(|_| JournalApiError::Validation(format!("Invalid timestamp: '{}'", raw)))
        })
        .transpose()?;

    let update = JournalEntryUpdate {
        content: payload.content,
        timestamp,
    };
    let service = JournalService::new(&state.db);
    let updated = service.update_entry(id, update).await?;
    Ok(Json(JournalEntryJson::from(updated)))
}

/// Handler for DELETE /journal/{id} - Deletes a journal entry.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/journal/{id}",
    params(("id" = u32, Path, description = "Journal entry ID")),
    responses(
        (status = 204, description = "Journal entry deleted"),
        (status = 404, description = "Journal entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Journal"
)]
pub async fn delete_journal_entry_handler(
    State(state): State<Arc<JournalState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, JournalApiError> {
    let service = JournalService::new(&state.db);
    service.delete_entry_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the journal API router.
pub fn create_journal_router(state: Arc<JournalState>) -> Router {
    Router::new()
        .route(
            "/journal",
            get(get_journal_entries_handler).post(create_journal_entry_handler),
        )
        .route(
            "/journal/{id}",
            put(update_journal_entry_handler).delete(delete_journal_entry_handler),
        )
        .with_state(state)
}
