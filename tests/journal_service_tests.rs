use chrono::{TimeZone, Utc};
use planner_server::journal::{
    JournalEntryUpdate, JournalService, JournalServiceError, NewJournalEntry,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

mod common;

async fn setup() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    common::setup_db().await
}

#[tokio::test]
async fn can_create_entry_with_default_timestamp() {
    let db = setup().await.expect("Failed to setup test context");
    let journal_service = JournalService::new(&db);

    let created = journal_service
        .create_entry(NewJournalEntry {
            entry_type: "meal".to_string(),
            content: json!({"dish": "ramen", "calories": 550}),
            timestamp: None,
        })
        .await
        .expect("Failed to create journal entry");

    assert_eq!(created.entry_type(), "meal");
    assert_eq!(created.content(), &json!({"dish": "ramen", "calories": 550}));
    let age = Utc::now() - created.timestamp();
    assert!(age.num_seconds().abs() < 60);
}

#[tokio::test]
async fn entries_are_listed_most_recent_first() {
    let db = setup().await.expect("Failed to setup test context");
    let journal_service = JournalService::new(&db);

    for (entry_type, day) in [("meal", 1), ("mood", 3), ("sleep", 2)] {
        journal_service
            .create_entry(NewJournalEntry {
                entry_type: entry_type.to_string(),
                content: json!({"note": entry_type}),
                timestamp: Some(Utc.with_ymd_and_hms(2025, 9, day, 12, 0, 0).unwrap()),
            })
            .await
            .expect("Failed to create journal entry");
    }

    let entries = journal_service
        .get_all_entries()
        .await
        .expect("Failed to get all entries");
    let order: Vec<&str> = entries.iter().map(|entry| entry.entry_type()).collect();
    assert_eq!(order, vec!["mood", "sleep", "meal"]);
}

#[tokio::test]
async fn can_update_entry_content() {
    let db = setup().await.expect("Failed to setup test context");
    let journal_service = JournalService::new(&db);

    let created = journal_service
        .create_entry(NewJournalEntry {
            entry_type: "mood".to_string(),
            content: json!({"rating": 3}),
            timestamp: None,
        })
        .await
        .expect("Failed to create journal entry");

    let updated = journal_service
        .update_entry(
            created.id(),
            JournalEntryUpdate {
                content: Some(json!({"rating": 5, "note": "good run"})),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update journal entry");

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.content(), &json!({"rating": 5, "note": "good run"}));
    // The entry type is immutable through updates.
    assert_eq!(updated.entry_type(), "mood");
}

#[tokio::test]
async fn updating_missing_entry_returns_not_found() {
    let db = setup().await.expect("Failed to setup test context");
    let journal_service = JournalService::new(&db);

    let result = journal_service
        .update_entry(
            7,
            JournalEntryUpdate {
                content: Some(json!({})),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(JournalServiceError::EntryNotFound(7))));
}

#[tokio::test]
async fn can_delete_entry() {
    let db = setup().await.expect("Failed to setup test context");
    let journal_service = JournalService::new(&db);

    let created = journal_service
        .create_entry(NewJournalEntry {
            entry_type: "meal".to_string(),
            content: json!({"dish": "toast"}),
            timestamp: None,
        })
        .await
        .expect("Failed to create journal entry");

    let deleted = journal_service
        .delete_entry_by_id(created.id())
        .await
        .expect("Failed to delete journal entry");
    assert_eq!(deleted, created);

    let all = journal_service
        .get_all_entries()
        .await
        .expect("Failed to get all entries");
    assert!(all.is_empty());
}
