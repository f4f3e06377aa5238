use crate::entities::*;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod api;

/// Cadence of a recurring task series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
}

impl RecurrenceType {
    /// Parses the database representation of a recurrence type.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(RecurrenceType::Daily),
            "weekly" => Some(RecurrenceType::Weekly),
            _ => None,
        }
    }

    /// Returns the database representation of the recurrence type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
        }
    }

    /// Interval between consecutive instances of a series.
    pub fn step(&self) -> chrono::Duration {
        match self {
            RecurrenceType::Daily => chrono::Duration::days(1),
            RecurrenceType::Weekly => chrono::Duration::weeks(1),
        }
    }

    /// Number of future instances materialized when a recurring task is
    /// created. Both cadences cover roughly a three month window.
    pub fn default_horizon(&self) -> u32 {
        match self {
            RecurrenceType::Daily => 90,
            RecurrenceType::Weekly => 12,
        }
    }
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope of a task deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Delete only the addressed task instance.
    Single,
    /// Delete the addressed instance and every later instance of its
    /// recurrence group. Tasks without a group fall back to `Single`.
    AllFuture,
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: u32,
    title: String,
    description: Option<String>,
    is_recurring: bool,
    is_completed: bool,
    due_date: Option<NaiveDate>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    time_tracked_seconds: i32,
    created_at: DateTime<Utc>,
    recurrence_type: Option<RecurrenceType>,
    recurrence_group_id: Option<String>,
}

impl Task {
    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the task belongs to a recurring series.
    pub fn is_recurring(&self) -> bool {
        self.is_recurring
    }

    /// Returns whether the task has been completed.
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns the due date of the task, if any.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the scheduled start time of the task, if any.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Returns the scheduled end time of the task, if any.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Returns the number of seconds tracked against the task.
    pub fn time_tracked_seconds(&self) -> i32 {
        self.time_tracked_seconds
    }

    /// Returns the creation time of the task.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the recurrence cadence of the task, if any.
    pub fn recurrence_type(&self) -> Option<RecurrenceType> {
        self.recurrence_type
    }

    /// Returns the identifier shared by all instances of the task's
    /// recurrence group, if any.
    pub fn recurrence_group_id(&self) -> Option<&str> {
        self.recurrence_group_id.as_deref()
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task {
            id: model.id as u32,
            title: model.title,
            description: model.description,
            is_recurring: model.is_recurring,
            is_completed: model.is_completed,
            due_date: model.due_date,
            start_time: model.start_time,
            end_time: model.end_time,
            time_tracked_seconds: model.time_tracked_seconds,
            created_at: model.created_at,
            recurrence_type: model
                .recurrence_type
                .as_deref()
                .and_then(RecurrenceType::parse),
            recurrence_group_id: model.recurrence_group_id,
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub is_recurring: bool,
    pub recurrence_type: Option<RecurrenceType>,
    pub due_date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Partial update of a task's mutable per-instance fields.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub time_tracked_seconds: Option<i32>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(u32),
    /// A task was marked recurring without a usable cadence.
    #[error("recurrence_type must be 'daily' or 'weekly' for recurring tasks")]
    MissingRecurrenceType,
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

/// Due dates for the generated instances of a recurring series, starting one
/// step after the base date.
fn series_due_dates(base: NaiveDate, recurrence: RecurrenceType, horizon: u32) -> Vec<NaiveDate> {
    (1..=horizon as i32).map(|i| base + recurrence.step() * i).collect()
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService {
        TaskService { db }
    }

    /// Creates a new task.
    ///
    /// A recurring task additionally materializes its future instances: every
    /// instance shares a freshly generated recurrence group ID with the base
    /// row, and due dates advance by the cadence step per instance.
    ///
    /// # Arguments
    ///
    /// * `new_task` - The validated task fields.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created base `Task` if successful, or an
    /// error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, TaskServiceError> {
        let recurrence = if new_task.is_recurring {
            Some(
                new_task
                    .recurrence_type
                    .ok_or(TaskServiceError::MissingRecurrenceType)?,
            )
        } else {
            None
        };
        let recurrence_group_id = recurrence.map(|_| Uuid::new_v4().to_string());

        let active_model = task::ActiveModel {
            title: ActiveValue::Set(new_task.title),
            description: ActiveValue::Set(new_task.description),
            is_recurring: ActiveValue::Set(new_task.is_recurring),
            is_completed: ActiveValue::Set(false),
            due_date: ActiveValue::Set(Some(new_task.due_date)),
            start_time: ActiveValue::Set(new_task.start_time),
            end_time: ActiveValue::Set(new_task.end_time),
            time_tracked_seconds: ActiveValue::Set(0),
            created_at: ActiveValue::Set(Utc::now()),
            recurrence_type: ActiveValue::Set(recurrence.map(|r| r.to_string())),
            recurrence_group_id: ActiveValue::Set(recurrence_group_id),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;

        if let Some(recurrence) = recurrence {
            self.materialize_series(&created_model, recurrence, recurrence.default_horizon())
                .await?;
        }
        Ok(Task::from(created_model))
    }

    /// Inserts the future instances of a recurring series. Instances copy the
    /// base row's title, description, cadence and group ID; completion state
    /// and tracked time start fresh per instance.
    #[tracing::instrument(skip(self, base))]
    async fn materialize_series(
        &self,
        base: &task::Model,
        recurrence: RecurrenceType,
        horizon: u32,
    ) -> Result<(), TaskServiceError> {
        let Some(base_due) = base.due_date else {
            return Ok(());
        };

        let due_dates = series_due_dates(base_due, recurrence, horizon);
        if due_dates.is_empty() {
            return Ok(());
        }

        let instances: Vec<task::ActiveModel> = due_dates
            .into_iter()
            .map(|due_date| task::ActiveModel {
                title: ActiveValue::Set(base.title.clone()),
                description: ActiveValue::Set(base.description.clone()),
                is_recurring: ActiveValue::Set(true),
                is_completed: ActiveValue::Set(false),
                due_date: ActiveValue::Set(Some(due_date)),
                start_time: ActiveValue::Set(base.start_time),
                end_time: ActiveValue::Set(base.end_time),
                time_tracked_seconds: ActiveValue::Set(0),
                created_at: ActiveValue::Set(Utc::now()),
                recurrence_type: ActiveValue::Set(base.recurrence_type.clone()),
                recurrence_group_id: ActiveValue::Set(base.recurrence_group_id.clone()),
                ..Default::default()
            })
            .collect();
        task::Entity::insert_many(instances).exec(self.db).await?;
        Ok(())
    }

    /// Retrieves all tasks from the database.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Task` if successful, or an error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: u32) -> Result<Task, TaskServiceError> {
        let task_model = task::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        Ok(Task::from(task_model))
    }

    /// Applies a partial update to a task by its ID. Fields left `None` keep
    /// their stored values.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `update` - The fields to change.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(&self, id: u32, update: TaskUpdate) -> Result<Task, TaskServiceError> {
        let task_to_update = task::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        if let Some(title) = update.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = update.description {
            active_model.description = ActiveValue::Set(Some(description));
        }
        if let Some(is_completed) = update.is_completed {
            active_model.is_completed = ActiveValue::Set(is_completed);
        }
        if let Some(time_tracked_seconds) = update.time_tracked_seconds {
            active_model.time_tracked_seconds = ActiveValue::Set(time_tracked_seconds);
        }
        let updated_model = active_model.update(self.db).await?;

        Ok(Task::from(updated_model))
    }

    /// Deletes a task by its ID.
    ///
    /// With `DeleteScope::AllFuture`, a task that belongs to a recurrence
    /// group takes every instance of that group due on or after its own due
    /// date with it. In every other case only the addressed row is removed.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    /// * `scope` - Whether to delete the single instance or the future series.
    ///
    /// # Returns
    ///
    /// A `Result` containing the number of deleted rows if successful, or an
    /// error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: u32, scope: DeleteScope) -> Result<u64, TaskServiceError> {
        let task_to_delete = task::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        if scope == DeleteScope::AllFuture {
            if let (Some(group_id), Some(due_date)) =
                (&task_to_delete.recurrence_group_id, task_to_delete.due_date)
            {
                let result = task::Entity::delete_many()
                    .filter(task::Column::RecurrenceGroupId.eq(group_id.clone()))
                    .filter(task::Column::DueDate.gte(due_date))
                    .exec(self.db)
                    .await?;
                return Ok(result.rows_affected);
            }
        }

        task::Entity::delete_by_id(task_to_delete.id)
            .exec(self.db)
            .await?;
        Ok(1)
    }
}
