use crate::event::{Event, EventService, EventServiceError, EventUpdate, NewEvent};
use crate::web::api::{ErrorResponse, double_option, parse_datetime};
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
pub struct EventState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// JSON representation of an Event for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventJson {
    /// Unique identifier for the event
    pub id: u32,
    /// Title of the event
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// Start time of the event
    pub start_time: DateTime<Utc>,
    /// End time of the event, if one is defined
    pub end_time: Option<DateTime<Utc>>,
    /// Creation time of the event
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventJson {
    fn from(event: Event) -> Self {
        Self {
            id: event.id(),
            title: event.title().to_string(),
            description: event.description().map(str::to_string),
            start_time: event.start_time(),
            end_time: event.end_time(),
            created_at: event.created_at(),
        }
    }
}

/// JSON request payload for creating an event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Title of the event (required)
    pub title: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Start time as an ISO-8601 datetime (required)
    pub start_time: Option<String>,
    /// End time as an ISO-8601 datetime
    pub end_time: Option<String>,
}

/// JSON request payload for updating an event.
///
/// `start_time` is applied only when a non-null value is supplied. `end_time`
/// is applied whenever the key is present, so an explicit null clears it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New start time as an ISO-8601 datetime
    pub start_time: Option<String>,
    /// New end time as an ISO-8601 datetime, or null to clear it
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub end_time: Option<Option<String>>,
}

/// Custom error type for event handler operations.
#[derive(Debug, thiserror::Error)]
pub enum EventApiError {
    /// Represents a request payload validation error.
    #[error("{0}")]
    Validation(String),
    /// Represents an event service error.
    #[error(transparent)]
    Service(#[from] EventServiceError),
}

impl IntoResponse for EventApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, message) = match self {
            EventApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            EventApiError::Service(err @ EventServiceError::EventNotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            EventApiError::Service(EventServiceError::Database(err)) => {
                tracing::error!("Database error while handling event request: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later.".to_string(),
                )
            }
        };
        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Handler for GET /events - Returns all events in JSON format.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "Successfully retrieved events", body = Vec<EventJson>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Events"
)]
pub async fn get_events_handler(
    State(state): State<Arc<EventState>>,
) -> Result<Json<Vec<EventJson>>, EventApiError> {
    let service = EventService::new(&state.db);
    let events = service.get_all_events().await?;
    Ok(Json(events.into_iter().map(EventJson::from).collect()))
}

/// Handler for POST /events - Creates an event.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventJson),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Events"
)]
pub async fn create_event_handler(
    State(state): State<Arc<EventState>>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventJson>), EventApiError> {
    let start_time = payload
        .start_time
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_datetime(raw)
                .map_err(|_| EventApiError::Validation(format!("Invalid start_time: '{}'", raw)))
        })
        .transpose()?;
    let title = payload.title.filter(|title| !title.trim().is_empty());
    let (Some(title), Some(start_time)) = (title, start_time) else {
        return Err(EventApiError::Validation(
            "Title and start_time are required".to_string(),
        ));
    };

    let end_time = payload
        .end_time
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_datetime(raw)
                .map_err(|_| EventApiError::Validation(format!("Invalid end_time: '{}'", raw)))
        })
        .transpose()?;

    let new_event = NewEvent {
        title,
        description: payload.description,
        start_time,
        end_time,
    };

    let service = EventService::new(&state.db);
    let created = service.create_event(new_event).await?;
    Ok((StatusCode::CREATED, Json(EventJson::from(created))))
}

/// Handler for PUT /events/{id} - Updates an event.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/events/{id}",
    params(("id" = u32, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventJson),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Events"
)]
pub async fn update_event_handler(
    State(state): State<Arc<EventState>>,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<EventJson>, EventApiError> {
    let start_time = payload
        .start_time
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_datetime(raw)
                .map_err(|_| EventApiError::Validation(format!("Invalid start_time: '{}'", raw)))
        })
        .transpose()?;
    let end_time = match payload.end_time {
        Some(Some(raw)) if !raw.is_empty() => Some(Some(parse_datetime(&raw).map_err(|_| {
            EventApiError::Validation(format!("Invalid end_time: '{}'", raw))
        })?)),
        // An explicit null (or empty string) clears the stored end time.
        Some(_) => Some(None),
        None => None,
    };

    let update = EventUpdate {
        title: payload.title,
        description: payload.description,
        start_time,
        end_time,
    };
    let service = EventService::new(&state.db);
    let updated = service.update_event(id, update).await?;
    Ok(Json(EventJson::from(updated)))
}

/// Handler for DELETE /events/{id} - Deletes an event.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/events/{id}",
    params(("id" = u32, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Events"
)]
pub async fn delete_event_handler(
    State(state): State<Arc<EventState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, EventApiError> {
    let service = EventService::new(&state.db);
    service.delete_event_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the events API router.
pub fn create_event_router(state: Arc<EventState>) -> Router {
    Router::new()
        .route("/events", get(get_events_handler).post(create_event_handler))
        .route(
            "/events/{id}",
            put(update_event_handler).delete(delete_event_handler),
        )
        .with_state(state)
}
