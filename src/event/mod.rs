use crate::entities::*;
use chrono::{DateTime, Utc};
use sea_orm::*;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Event {
    id: u32,
    title: String,
    description: Option<String>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Event {
    /// Returns the ID of the event.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the title of the event.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the event, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the start time of the event.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns the end time of the event, if one is defined.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Returns the creation time of the event.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<event::Model> for Event {
    fn from(model: event::Model) -> Self {
        Event {
            id: model.id as u32,
            title: model.title,
            description: model.description,
            start_time: model.start_time,
            end_time: model.end_time,
            created_at: model.created_at,
        }
    }
}

/// Input for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Partial update of an event.
///
/// `start_time` is only applied when a value is supplied, the column being
/// required. `end_time` uses a double option so an explicitly supplied null
/// clears the stored value while an absent key leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
}

/// Error type for EventService operations.
#[derive(Debug, thiserror::Error)]
pub enum EventServiceError {
    /// Represents an event not found error.
    #[error("Event with ID {0} not found")]
    EventNotFound(u32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct EventService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl EventService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> EventService {
        EventService { db }
    }

    /// Creates a new event in the database.
    ///
    /// # Arguments
    ///
    /// * `new_event` - The validated event fields.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Event` if successful, or an error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_event(&self, new_event: NewEvent) -> Result<Event, EventServiceError> {
        let active_model = event::ActiveModel {
            title: ActiveValue::Set(new_event.title),
            description: ActiveValue::Set(new_event.description),
            start_time: ActiveValue::Set(new_event.start_time),
            end_time: ActiveValue::Set(new_event.end_time),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Event::from(created_model))
    }

    /// Retrieves all events from the database.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Event` if successful, or an error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_events(&self) -> Result<Vec<Event>, EventServiceError> {
        let events = event::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(Event::from)
            .collect();
        Ok(events)
    }

    /// Applies a partial update to an event by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the event to update.
    /// * `update` - The fields to change.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Event` if successful, or an error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_event(
        &self,
        id: u32,
        update: EventUpdate,
    ) -> Result<Event, EventServiceError> {
        let event_to_update = event::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(EventServiceError::EventNotFound(id))?;

        let mut active_model: event::ActiveModel = event_to_update.into();
        if let Some(title) = update.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = update.description {
            active_model.description = ActiveValue::Set(Some(description));
        }
        if let Some(start_time) = update.start_time {
            active_model.start_time = ActiveValue::Set(start_time);
        }
        if let Some(end_time) = update.end_time {
            active_model.end_time = ActiveValue::Set(end_time);
        }
        let updated_model = active_model.update(self.db).await?;

        Ok(Event::from(updated_model))
    }

    /// Deletes an event by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the event to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Event` if successful, or an error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event_by_id(&self, id: u32) -> Result<Event, EventServiceError> {
        let event_to_delete = event::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(EventServiceError::EventNotFound(id))?;

        let event_copy = Event::from(event_to_delete.clone());
        event::Entity::delete_by_id(event_to_delete.id)
            .exec(self.db)
            .await?;
        Ok(event_copy)
    }
}
