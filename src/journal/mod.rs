use crate::entities::*;
use chrono::{DateTime, Utc};
use sea_orm::*;

pub mod api;

#[derive(Debug, PartialEq, Clone)]
pub struct JournalEntry {
    id: u32,
    entry_type: String,
    content: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl JournalEntry {
    /// Returns the ID of the journal entry.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the tag describing what kind of entry this is, e.g. "meal" or
    /// "mood".
    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    /// Returns the JSON payload of the entry.
    pub fn content(&self) -> &serde_json::Value {
        &self.content
    }

    /// Returns the timestamp of the entry.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl From<journal_entry::Model> for JournalEntry {
    fn from(model: journal_entry::Model) -> Self {
        JournalEntry {
            id: model.id as u32,
            entry_type: model.entry_type,
            content: model.content,
            timestamp: model.timestamp,
        }
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub entry_type: String,
    pub content: serde_json::Value,
    /// Defaults to the current time when not supplied.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Partial update of a journal entry. The timestamp is only applied when a
/// value is supplied, the column being required.
#[derive(Debug, Clone, Default)]
pub struct JournalEntryUpdate {
    pub content: Option<serde_json::Value>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Error type for JournalService operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalServiceError {
    /// Represents a journal entry not found error.
    #[error("Journal entry with ID {0} not found")]
    EntryNotFound(u32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct JournalService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl JournalService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> JournalService {
        JournalService { db }
    }

    /// Creates a new journal entry in the database.
    ///
    /// # Arguments
    ///
    /// * `new_entry` - The validated entry fields.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `JournalEntry` if successful, or an
    /// error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_entry(
        &self,
        new_entry: NewJournalEntry,
    ) -> Result<JournalEntry, JournalServiceError> {
        let active_model = journal_entry::ActiveModel {
            entry_type: ActiveValue::Set(new_entry.entry_type),
            content: ActiveValue::Set(new_entry.content),
            timestamp: ActiveValue::Set(new_entry.timestamp.unwrap_or_else(Utc::now)),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(JournalEntry::from(created_model))
    }

    /// Retrieves all journal entries, most recent first.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `JournalEntry` if successful, or an
    /// error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_entries(&self) -> Result<Vec<JournalEntry>, JournalServiceError> {
        let entries = journal_entry::Entity::find()
            .order_by_desc(journal_entry::Column::Timestamp)
            .all(self.db)
            .await?
            .into_iter()
            .map(JournalEntry::from)
            .collect();
        Ok(entries)
    }

    /// Applies a partial update to a journal entry by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the entry to update.
    /// * `update` - The fields to change.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `JournalEntry` if successful, or an
    /// error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_entry(
        &self,
        id: u32,
        update: JournalEntryUpdate,
    ) -> Result<JournalEntry, JournalServiceError> {
        let entry_to_update = journal_entry::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(JournalServiceError::EntryNotFound(id))?;

        let mut active_model: journal_entry::ActiveModel = entry_to_update.into();
        if let Some(content) = update.content {
            active_model.content = ActiveValue::Set(content);
        }
        if let Some(timestamp) = update.timestamp {
            active_model.timestamp = ActiveValue::Set(timestamp);
        }
        let updated_model = active_model.update(self.db).await?;

        Ok(JournalEntry::from(updated_model))
    }

    /// Deletes a journal entry by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the entry to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `JournalEntry` if successful, or an
    /// error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_entry_by_id(&self, id: u32) -> Result<JournalEntry, JournalServiceError> {
        let entry_to_delete = journal_entry::Entity::find_by_id(id as i32)
            .one(self.db)
            .await?
            .ok_or(JournalServiceError::EntryNotFound(id))?;

        let entry_copy = JournalEntry::from(entry_to_delete.clone());
        journal_entry::Entity::delete_by_id(entry_to_delete.id)
            .exec(self.db)
            .await?;
        Ok(entry_copy)
    }
}
