use chrono::NaiveDate;
use planner_server::task::{
    DeleteScope, NewTask, RecurrenceType, TaskService, TaskServiceError, TaskUpdate,
};
use sea_orm::DatabaseConnection;

mod common;

async fn setup() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    common::setup_db().await
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn new_task(title: &str, due_date: NaiveDate) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        is_recurring: false,
        recurrence_type: None,
        due_date,
        start_time: None,
        end_time: None,
    }
}

fn new_recurring_task(title: &str, due_date: NaiveDate, recurrence: RecurrenceType) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: Some("every so often".to_string()),
        is_recurring: true,
        recurrence_type: Some(recurrence),
        due_date,
        start_time: None,
        end_time: None,
    }
}

#[tokio::test]
async fn can_create_single_task() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let created = task_service
        .create_task(new_task("Water plants", date(2025, 9, 1)))
        .await
        .expect("Failed to create task");

    assert_eq!(created.title(), "Water plants");
    assert_eq!(created.due_date(), Some(date(2025, 9, 1)));
    assert!(!created.is_recurring());
    assert!(!created.is_completed());
    assert_eq!(created.time_tracked_seconds(), 0);
    assert_eq!(created.recurrence_type(), None);
    assert_eq!(created.recurrence_group_id(), None);

    let all = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn daily_recurring_task_materializes_daily_series() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let base = task_service
        .create_task(new_recurring_task(
            "Stretch",
            date(2025, 9, 1),
            RecurrenceType::Daily,
        ))
        .await
        .expect("Failed to create recurring task");
    let group_id = base
        .recurrence_group_id()
        .expect("recurring base task must carry a group id")
        .to_string();

    let all = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    // Base instance plus the materialized horizon.
    assert_eq!(all.len(), 91);

    let mut due_dates = Vec::new();
    for task in &all {
        assert_eq!(task.recurrence_group_id(), Some(group_id.as_str()));
        assert_eq!(task.title(), "Stretch");
        assert_eq!(task.description(), Some("every so often"));
        assert_eq!(task.recurrence_type(), Some(RecurrenceType::Daily));
        assert!(task.is_recurring());
        assert!(!task.is_completed());
        due_dates.push(task.due_date().expect("series instances carry due dates"));
    }

    due_dates.sort();
    assert_eq!(due_dates.first(), Some(&date(2025, 9, 1)));
    for pair in due_dates.windows(2) {
        assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
    }
}

#[tokio::test]
async fn weekly_recurring_task_materializes_weekly_series() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    task_service
        .create_task(new_recurring_task(
            "Review the week",
            date(2025, 9, 1),
            RecurrenceType::Weekly,
        ))
        .await
        .expect("Failed to create recurring task");

    let all = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert_eq!(all.len(), 13);

    let mut due_dates: Vec<NaiveDate> = all
        .iter()
        .map(|task| task.due_date().expect("series instances carry due dates"))
        .collect();
    due_dates.sort();
    for pair in due_dates.windows(2) {
        assert_eq!(pair[1] - pair[0], chrono::Duration::days(7));
    }
}

#[tokio::test]
async fn recurring_task_without_cadence_is_rejected() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let mut request = new_task("Stretch", date(2025, 9, 1));
    request.is_recurring = true;

    let result = task_service.create_task(request).await;
    assert!(matches!(
        result,
        Err(TaskServiceError::MissingRecurrenceType)
    ));

    let all = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert!(all.is_empty());
}

#[tokio::test]
async fn deleting_single_instance_leaves_rest_of_group() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    task_service
        .create_task(new_recurring_task(
            "Stretch",
            date(2025, 9, 1),
            RecurrenceType::Daily,
        ))
        .await
        .expect("Failed to create recurring task");

    let all = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    let victim = all
        .iter()
        .find(|task| task.due_date() == Some(date(2025, 9, 15)))
        .expect("instance due on the 15th exists");

    let deleted = task_service
        .delete_task(victim.id(), DeleteScope::Single)
        .await
        .expect("Failed to delete instance");
    assert_eq!(deleted, 1);

    let remaining = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert_eq!(remaining.len(), 90);
    assert!(
        remaining
            .iter()
            .all(|task| task.due_date() != Some(date(2025, 9, 15)))
    );
}

#[tokio::test]
async fn deleting_all_future_removes_exactly_the_series_tail() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    task_service
        .create_task(new_recurring_task(
            "Stretch",
            date(2025, 9, 1),
            RecurrenceType::Daily,
        ))
        .await
        .expect("Failed to create recurring task");

    let all = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    let cutoff = date(2025, 9, 11);
    let target = all
        .iter()
        .find(|task| task.due_date() == Some(cutoff))
        .expect("instance due at the cutoff exists");

    let deleted = task_service
        .delete_task(target.id(), DeleteScope::AllFuture)
        .await
        .expect("Failed to delete future series");
    // Instances due 2025-09-11 through 2025-11-30 inclusive.
    assert_eq!(deleted, 81);

    let remaining = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert_eq!(remaining.len(), 10);
    assert!(
        remaining
            .iter()
            .all(|task| task.due_date().expect("due date set") < cutoff)
    );
}

#[tokio::test]
async fn all_future_scope_on_non_recurring_task_deletes_only_that_task() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let first = task_service
        .create_task(new_task("Water plants", date(2025, 9, 1)))
        .await
        .expect("Failed to create task");
    let second = task_service
        .create_task(new_task("Buy groceries", date(2025, 9, 2)))
        .await
        .expect("Failed to create task");

    let deleted = task_service
        .delete_task(first.id(), DeleteScope::AllFuture)
        .await
        .expect("Failed to delete task");
    assert_eq!(deleted, 1);

    let remaining = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), second.id());
}

#[tokio::test]
async fn can_update_task_fields() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let created = task_service
        .create_task(new_task("Water plants", date(2025, 9, 1)))
        .await
        .expect("Failed to create task");

    let updated = task_service
        .update_task(
            created.id(),
            TaskUpdate {
                title: Some("Water all plants".to_string()),
                is_completed: Some(true),
                time_tracked_seconds: Some(600),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update task");

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.title(), "Water all plants");
    assert!(updated.is_completed());
    assert_eq!(updated.time_tracked_seconds(), 600);
    // Untouched fields keep their stored values.
    assert_eq!(updated.due_date(), Some(date(2025, 9, 1)));
}

#[tokio::test]
async fn updating_missing_task_returns_not_found_without_mutation() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let created = task_service
        .create_task(new_task("Water plants", date(2025, 9, 1)))
        .await
        .expect("Failed to create task");

    let missing_id = created.id() + 1;
    let result = task_service
        .update_task(
            missing_id,
            TaskUpdate {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(
            e.to_string(),
            format!("Task with ID {} not found", missing_id)
        );
    }

    let all = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title(), "Water plants");
}

#[tokio::test]
async fn deleting_missing_task_returns_not_found() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let result = task_service.delete_task(42, DeleteScope::Single).await;
    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(42))));
}

#[tokio::test]
async fn created_task_round_trips_through_lookup() {
    let db = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&db);

    let mut request = new_task("Water plants", date(2025, 9, 1));
    request.description = Some("the ones on the balcony".to_string());

    let created = task_service
        .create_task(request)
        .await
        .expect("Failed to create task");
    let fetched = task_service
        .get_task_by_id(created.id())
        .await
        .expect("Failed to fetch task");

    assert_eq!(fetched, created);
}
