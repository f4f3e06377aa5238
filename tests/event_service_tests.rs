use chrono::{DateTime, TimeZone, Utc};
use planner_server::event::{EventService, EventServiceError, EventUpdate, NewEvent};
use sea_orm::DatabaseConnection;

mod common;

async fn setup() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    common::setup_db().await
}

fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

fn new_event(title: &str, start_time: DateTime<Utc>) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: None,
        start_time,
        end_time: None,
    }
}

#[tokio::test]
async fn can_create_event() {
    let db = setup().await.expect("Failed to setup test context");
    let event_service = EventService::new(&db);

    let start = datetime(2025, 9, 1, 10, 0);
    let created = event_service
        .create_event(NewEvent {
            title: "Dentist".to_string(),
            description: Some("bring the referral".to_string()),
            start_time: start,
            end_time: Some(datetime(2025, 9, 1, 11, 0)),
        })
        .await
        .expect("Failed to create event");

    assert_eq!(created.title(), "Dentist");
    assert_eq!(created.description(), Some("bring the referral"));
    assert_eq!(created.start_time(), start);
    assert_eq!(created.end_time(), Some(datetime(2025, 9, 1, 11, 0)));
}

#[tokio::test]
async fn created_event_round_trips_through_listing() {
    let db = setup().await.expect("Failed to setup test context");
    let event_service = EventService::new(&db);

    let created = event_service
        .create_event(new_event("Standup", datetime(2025, 9, 1, 9, 30)))
        .await
        .expect("Failed to create event");

    let all = event_service
        .get_all_events()
        .await
        .expect("Failed to get all events");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], created);
}

#[tokio::test]
async fn can_update_event_fields() {
    let db = setup().await.expect("Failed to setup test context");
    let event_service = EventService::new(&db);

    let created = event_service
        .create_event(new_event("Standup", datetime(2025, 9, 1, 9, 30)))
        .await
        .expect("Failed to create event");

    let moved = datetime(2025, 9, 1, 10, 0);
    let updated = event_service
        .update_event(
            created.id(),
            EventUpdate {
                title: Some("Late standup".to_string()),
                start_time: Some(moved),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update event");

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.title(), "Late standup");
    assert_eq!(updated.start_time(), moved);
}

#[tokio::test]
async fn explicit_null_clears_event_end_time() {
    let db = setup().await.expect("Failed to setup test context");
    let event_service = EventService::new(&db);

    let created = event_service
        .create_event(NewEvent {
            title: "Workshop".to_string(),
            description: None,
            start_time: datetime(2025, 9, 1, 13, 0),
            end_time: Some(datetime(2025, 9, 1, 17, 0)),
        })
        .await
        .expect("Failed to create event");

    let updated = event_service
        .update_event(
            created.id(),
            EventUpdate {
                end_time: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update event");

    assert_eq!(updated.end_time(), None);
    // The required start time is untouched.
    assert_eq!(updated.start_time(), created.start_time());
}

#[tokio::test]
async fn updating_missing_event_returns_not_found() {
    let db = setup().await.expect("Failed to setup test context");
    let event_service = EventService::new(&db);

    let result = event_service
        .update_event(
            99,
            EventUpdate {
                title: Some("Ghost".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(EventServiceError::EventNotFound(99))));
}

#[tokio::test]
async fn can_delete_event() {
    let db = setup().await.expect("Failed to setup test context");
    let event_service = EventService::new(&db);

    let created = event_service
        .create_event(new_event("Standup", datetime(2025, 9, 1, 9, 30)))
        .await
        .expect("Failed to create event");

    let deleted = event_service
        .delete_event_by_id(created.id())
        .await
        .expect("Failed to delete event");
    assert_eq!(deleted, created);

    let all = event_service
        .get_all_events()
        .await
        .expect("Failed to get all events");
    assert!(all.is_empty());
}
