use crate::task::{
    DeleteScope, NewTask, RecurrenceType, Task, TaskService, TaskServiceError, TaskUpdate,
};
use crate::web::api::{ErrorResponse, parse_date, parse_datetime};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    pub id: u32,
    /// Title of the task
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// Whether the task belongs to a recurring series
    pub is_recurring: bool,
    /// Cadence of the recurring series, if any
    pub recurrence_type: Option<RecurrenceType>,
    /// Whether the task has been completed
    pub is_completed: bool,
    /// Due date of the task
    pub due_date: Option<NaiveDate>,
    /// Scheduled start time
    pub start_time: Option<DateTime<Utc>>,
    /// Scheduled end time
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds of work tracked against the task
    pub time_tracked_seconds: i32,
    /// Creation time of the task
    pub created_at: DateTime<Utc>,
    /// Identifier shared by all instances of one recurring series
    pub recurrence_group_id: Option<String>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            is_recurring: task.is_recurring(),
            recurrence_type: task.recurrence_type(),
            is_completed: task.is_completed(),
            due_date: task.due_date(),
            start_time: task.start_time(),
            end_time: task.end_time(),
            time_tracked_seconds: task.time_tracked_seconds(),
            created_at: task.created_at(),
            recurrence_group_id: task.recurrence_group_id().map(str::to_string),
        }
    }
}

/// JSON request payload for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Title of the task (required)
    pub title: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Whether to materialize a recurring series
    #[serde(default)]
    pub is_recurring: bool,
    /// Cadence of the series; required when `is_recurring` is set
    pub recurrence_type: Option<RecurrenceType>,
    /// Due date as `YYYY-MM-DD` or an ISO-8601 datetime (required)
    pub due_date: Option<String>,
    /// Scheduled start time as an ISO-8601 datetime
    pub start_time: Option<String>,
    /// Scheduled end time as an ISO-8601 datetime
    pub end_time: Option<String>,
}

/// JSON request payload for updating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New completion state
    pub is_completed: Option<bool>,
    /// New tracked-time total in seconds
    pub time_tracked_seconds: Option<i32>,
}

/// Query parameters for deleting a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteTaskQuery {
    /// Pass `all_future` to delete the whole future series of a recurring
    /// task instead of the single instance
    #[serde(default)]
    pub apply_to: Option<String>,
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// Represents a request payload validation error.
    #[error("{0}")]
    Validation(String),
    /// Represents a task service error.
    #[error(transparent)]
    Service(#[from] TaskServiceError),
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, message) = match self {
            TaskApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            TaskApiError::Service(err @ TaskServiceError::TaskNotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            TaskApiError::Service(err @ TaskServiceError::MissingRecurrenceType) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            TaskApiError::Service(TaskServiceError::Database(err)) => {
                tracing::error!("Database error while handling task request: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later.".to_string(),
                )
            }
        };
        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Handler for GET /tasks - Returns all tasks in JSON format.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = Vec<TaskJson>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let service = TaskService::new(&state.db);
    let tasks = service.get_all_tasks().await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for POST /tasks - Creates a task, materializing the future
/// instances of a recurring series when requested.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskJson>), TaskApiError> {
    let due_date = payload
        .due_date
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_date(raw)
                .map_err(|_| TaskApiError::Validation(format!("Invalid due_date: '{}'", raw)))
        })
        .transpose()?;
    let title = payload.title.filter(|title| !title.trim().is_empty());
    let (Some(title), Some(due_date)) = (title, due_date) else {
        return Err(TaskApiError::Validation(
            "Title and due_date are required".to_string(),
        ));
    };

    let new_task = NewTask {
        title,
        description: payload.description,
        is_recurring: payload.is_recurring,
        recurrence_type: payload.recurrence_type,
        due_date,
        start_time: parse_optional_datetime(payload.start_time.as_deref(), "start_time")?,
        end_time: parse_optional_datetime(payload.end_time.as_deref(), "end_time")?,
    };

    let service = TaskService::new(&state.db);
    let created = service.create_task(new_task).await?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(created))))
}

/// Handler for PUT /tasks/{id} - Updates the mutable fields of a single task
/// instance.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<u32>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let update = TaskUpdate {
        title: payload.title,
        description: payload.description,
        is_completed: payload.is_completed,
        time_tracked_seconds: payload.time_tracked_seconds,
    };
    let service = TaskService::new(&state.db);
    let updated = service.update_task(id, update).await?;
    Ok(Json(TaskJson::from(updated)))
}

/// Handler for DELETE /tasks/{id} - Deletes a task instance, or with
/// `apply_to=all_future` the whole future series of its recurrence group.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(
        ("id" = u32, Path, description = "Task ID"),
        ("apply_to" = Option<String>, Query, description = "Pass 'all_future' to delete the future series")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<u32>,
    Query(query): Query<DeleteTaskQuery>,
) -> Result<StatusCode, TaskApiError> {
    let scope = match query.apply_to.as_deref() {
        Some("all_future") => DeleteScope::AllFuture,
        _ => DeleteScope::Single,
    };
    let service = TaskService::new(&state.db);
    service.delete_task(id, scope).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_optional_datetime(
    value: Option<&str>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, TaskApiError> {
    value
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_datetime(raw)
                .map_err(|_| TaskApiError::Validation(format!("Invalid {}: '{}'", field, raw)))
        })
        .transpose()
}

/// Creates and returns the tasks API router.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            put(update_task_handler).delete(delete_task_handler),
        )
        .with_state(state)
}
