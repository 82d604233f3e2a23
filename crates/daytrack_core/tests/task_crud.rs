use chrono::{DateTime, Duration, TimeZone, Utc};
use daytrack_core::db::open_db_in_memory;
use daytrack_core::{
    NewTaskRequest, RepoError, SqliteTaskRepository, Task, TaskKind, TaskListQuery, TaskPatch,
    TaskRepository, TaskService, TaskServiceError,
};
use uuid::Uuid;

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
}

fn fixed_id(n: u8) -> Uuid {
    Uuid::parse_str(&format!("00000000-0000-4000-8000-0000000000{n:02x}")).unwrap()
}

fn new_task_request(owner: &str, title: &str) -> NewTaskRequest {
    NewTaskRequest {
        owner_id: owner.to_string(),
        title: title.to_string(),
        description: String::new(),
        start: at(2025, 5, 1, 9),
        end: at(2025, 5, 1, 17),
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let mut request = new_task_request("user-1", "  Write report  ");
    request.description = "  quarterly numbers  ".to_string();
    let created = service.create_task(&request).unwrap();

    let loaded = service.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded.title, "Write report");
    assert_eq!(loaded.description, "quarterly numbers");
    assert_eq!(loaded.kind, TaskKind::Standard);
    assert_eq!(loaded.owner_id, "user-1");
    assert!(!loaded.completed);
    assert!(loaded.countdown_days.is_none());
    assert!(loaded.recurrence.is_none());
}

#[test]
fn create_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let result = service.create_task(&new_task_request("user-1", "   "));
    assert!(matches!(
        result,
        Err(TaskServiceError::Repo(RepoError::Validation(_)))
    ));
}

#[test]
fn create_rejects_reversed_window() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let mut request = new_task_request("user-1", "bad window");
    request.end = request.start - Duration::hours(1);
    let result = service.create_task(&request);
    assert!(matches!(
        result,
        Err(TaskServiceError::Repo(RepoError::Validation(_)))
    ));
}

#[test]
fn list_filters_by_owner_kind_and_completion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    repo.insert_task(&Task::with_id(
        fixed_id(1),
        "alice",
        "plain",
        at(2025, 5, 1, 9),
        at(2025, 5, 1, 17),
    ))
    .unwrap();

    let mut countdown = Task::with_id(
        fixed_id(2),
        "alice",
        "launch",
        at(2025, 5, 2, 9),
        at(2025, 6, 1, 9),
    );
    countdown.kind = TaskKind::Countdown;
    countdown.countdown_days = Some(30);
    repo.insert_task(&countdown).unwrap();

    repo.insert_task(&Task::with_id(
        fixed_id(3),
        "bob",
        "other owner",
        at(2025, 5, 1, 9),
        at(2025, 5, 1, 17),
    ))
    .unwrap();
    repo.set_task_completed(fixed_id(1), true).unwrap();

    let alice = repo
        .list_tasks(&TaskListQuery {
            owner_id: Some("alice".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(alice.len(), 2);

    let countdowns = repo
        .list_tasks(&TaskListQuery {
            owner_id: Some("alice".to_string()),
            kind: Some(TaskKind::Countdown),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(countdowns.len(), 1);
    assert_eq!(countdowns[0].id, fixed_id(2));

    let open = repo
        .list_tasks(&TaskListQuery {
            owner_id: Some("alice".to_string()),
            completed: Some(false),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, fixed_id(2));
}

#[test]
fn list_orders_by_start_then_id_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    // Insert out of order; ties on start_at resolve by id.
    for (n, day) in [(3u8, 2u32), (1, 1), (2, 1)] {
        repo.insert_task(&Task::with_id(
            fixed_id(n),
            "alice",
            format!("task {n}"),
            at(2025, 5, day, 9),
            at(2025, 5, day, 17),
        ))
        .unwrap();
    }

    let all = repo
        .list_tasks(&TaskListQuery::default())
        .unwrap()
        .iter()
        .map(|task| task.id)
        .collect::<Vec<_>>();
    assert_eq!(all, vec![fixed_id(1), fixed_id(2), fixed_id(3)]);

    let page = repo
        .list_tasks(&TaskListQuery {
            limit: Some(1),
            offset: 1,
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, fixed_id(2));

    let tail = repo
        .list_tasks(&TaskListQuery {
            offset: 2,
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].id, fixed_id(3));
}

#[test]
fn patch_updates_only_provided_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let created = service
        .create_task(&new_task_request("user-1", "original"))
        .unwrap();

    let updated = service
        .update_task(
            created.id,
            &TaskPatch {
                title: Some("  renamed  ".to_string()),
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "renamed");
    assert!(updated.completed);
    assert_eq!(updated.start, created.start);
    assert_eq!(updated.end, created.end);
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn update_missing_task_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let missing = fixed_id(0x42);
    let result = service.update_task(missing, &TaskPatch::default());
    assert!(matches!(
        result,
        Err(TaskServiceError::TaskNotFound(id)) if id == missing
    ));
}

#[test]
fn toggle_flips_completion_both_ways() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let created = service
        .create_task(&new_task_request("user-1", "flip me"))
        .unwrap();

    assert!(service.toggle_completed(created.id).unwrap());
    assert!(!service.toggle_completed(created.id).unwrap());
    assert!(!service.get_task(created.id).unwrap().unwrap().completed);
}

#[test]
fn set_completed_on_missing_row_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let missing = fixed_id(0x99);
    let result = repo.set_task_completed(missing, true);
    assert!(matches!(result, Err(RepoError::NotFound(id)) if id == missing));
}

#[test]
fn delete_is_hard_and_idempotence_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let created = service
        .create_task(&new_task_request("user-1", "short lived"))
        .unwrap();

    service.delete_task(created.id).unwrap();
    assert!(service.get_task(created.id).unwrap().is_none());
    assert!(service
        .list_tasks(&TaskListQuery::default())
        .unwrap()
        .is_empty());

    let second = service.delete_task(created.id);
    assert!(matches!(
        second,
        Err(TaskServiceError::TaskNotFound(id)) if id == created.id
    ));
}

#[test]
fn delete_many_tolerates_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    for n in 1..=2u8 {
        repo.insert_task(&Task::with_id(
            fixed_id(n),
            "alice",
            format!("member {n}"),
            at(2025, 5, u32::from(n), 9),
            at(2025, 5, u32::from(n), 17),
        ))
        .unwrap();
    }

    let deleted = repo
        .delete_tasks(&[fixed_id(1), fixed_id(2), fixed_id(0x77)])
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(repo.delete_tasks(&[]).unwrap(), 0);
    assert!(repo.list_tasks(&TaskListQuery::default()).unwrap().is_empty());
}

#[test]
fn task_serde_shape_matches_external_schema() {
    let task = Task::with_id(
        fixed_id(1),
        "alice",
        "shape check",
        at(2025, 5, 1, 9),
        at(2025, 5, 1, 17),
    );

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["type"], "standard");
    assert_eq!(value["owner_id"], "alice");
    assert!(value.get("kind").is_none());
}
