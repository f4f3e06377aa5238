use std::sync::Arc;

use crate::event::api::{EventState, create_event_router};
use crate::journal::api::{JournalState, create_journal_router};
use crate::task::api::{TaskState, create_task_router};

use axum::{Router, response::Json, routing::get};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// JSON body returned for every API error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable description of what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }
}

/// Parses a date that may arrive either as `YYYY-MM-DD` or as a full
/// ISO-8601 datetime, in which case its date part is taken.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    value
        .parse::<NaiveDate>()
        .or_else(|_| parse_datetime(value).map(|datetime| datetime.date_naive()))
}

/// Parses an ISO-8601 datetime, accepting a `Z` suffix or a UTC offset.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|datetime| datetime.with_timezone(&Utc))
}

/// Deserializes a field so an explicitly supplied `null` is distinguishable
/// from the key being absent: absent stays `None`, null becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::get_tasks_handler,
        crate::task::api::create_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
        crate::event::api::get_events_handler,
        crate::event::api::create_event_handler,
        crate::event::api::update_event_handler,
        crate::event::api::delete_event_handler,
        crate::journal::api::get_journal_entries_handler,
        crate::journal::api::create_journal_entry_handler,
        crate::journal::api::update_journal_entry_handler,
        crate::journal::api::delete_journal_entry_handler,
    ),
    tags(
        (name = "Tasks", description = "To-do items, optionally recurring"),
        (name = "Events", description = "Scheduled events"),
        (name = "Journal", description = "Free-form log entries"),
    )
)]
pub struct ApiDoc;

/// Handler for GET /api-docs/openapi.json - Serves the OpenAPI document.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the composed router for all JSON API endpoints.
pub fn create_api_router(db: Arc<sea_orm::DatabaseConnection>) -> Router {
    let task_router = create_task_router(Arc::new(TaskState { db: db.clone() }));
    let event_router = create_event_router(Arc::new(EventState { db: db.clone() }));
    let journal_router = create_journal_router(Arc::new(JournalState { db }));

    Router::new()
        .merge(task_router)
        .merge(event_router)
        .merge(journal_router)
        .route("/api-docs/openapi.json", get(openapi_handler))
}
