//! End-to-end checks for series and countdown creation: the schedule math
//! and the rows it leaves behind.

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use daytrack_core::db::open_db_in_memory;
use daytrack_core::{
    CountdownRepeat, CountdownRequest, ExpansionError, RecurrenceFrequency, RepeatRule,
    SeriesRequest, SqliteTaskRepository, TaskKind, TaskListQuery, TaskService, TaskServiceError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
}

fn series_request(owner: &str, start: NaiveDate, end: NaiveDate, rule: RepeatRule) -> SeriesRequest {
    SeriesRequest {
        owner_id: owner.to_string(),
        title: "Standup".to_string(),
        description: "sync".to_string(),
        start_date: start,
        end_date: end,
        rule,
    }
}

#[test]
fn daily_series_persists_one_row_per_day() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let rule = RepeatRule {
        frequency: Some(RecurrenceFrequency::Daily),
        interval: 1,
    };
    let ids = service
        .create_series(&series_request("alice", date(2025, 1, 1), date(2025, 1, 5), rule))
        .unwrap();
    assert_eq!(ids.len(), 5);

    let tasks = service
        .list_tasks(&TaskListQuery {
            owner_id: Some("alice".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(tasks.len(), 5);

    // Instances anchor at 09:00/17:00 UTC and come back oldest first.
    assert_eq!(tasks[0].start, at(2025, 1, 1, 9));
    assert_eq!(tasks[0].end, at(2025, 1, 1, 17));
    assert_eq!(tasks[4].start.date_naive(), date(2025, 1, 5));
    assert!(tasks.iter().all(|task| task.kind == TaskKind::Standard));
    assert!(tasks.iter().all(|task| task.recurrence.is_none()));
    assert!(tasks.iter().all(|task| !task.completed));
    assert_eq!(
        tasks.iter().map(|task| task.id).collect::<Vec<_>>(),
        ids,
        "list order matches creation order"
    );
}

#[test]
fn monthly_series_clamps_short_months_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let rule = RepeatRule {
        frequency: Some(RecurrenceFrequency::Monthly),
        interval: 1,
    };
    service
        .create_series(&series_request("alice", date(2025, 1, 31), date(2025, 3, 31), rule))
        .unwrap();

    let tasks = service
        .list_tasks(&TaskListQuery::default())
        .unwrap();
    let days = tasks
        .iter()
        .map(|task| task.start.date_naive())
        .collect::<Vec<_>>();
    assert_eq!(days, vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 28)]);
}

#[test]
fn reversed_range_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let result = service.create_series(&series_request(
        "alice",
        date(2025, 1, 5),
        date(2025, 1, 1),
        RepeatRule::default(),
    ));
    assert!(matches!(
        result,
        Err(TaskServiceError::Expansion(ExpansionError::EndBeforeStart { .. }))
    ));
    assert!(service
        .list_tasks(&TaskListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn preview_does_not_persist() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let rule = RepeatRule {
        frequency: Some(RecurrenceFrequency::Daily),
        interval: 1,
    };
    let preview = service
        .preview_series(
            &series_request("alice", date(2025, 1, 1), date(2025, 1, 10), rule),
            5,
        )
        .unwrap();

    assert_eq!(preview.total, 10);
    assert_eq!(preview.dates.len(), 5);
    assert!(service
        .list_tasks(&TaskListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn single_countdown_targets_days_ahead() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let ids = service
        .create_countdown(&CountdownRequest {
            owner_id: "alice".to_string(),
            title: "Launch".to_string(),
            description: String::new(),
            start: at(2025, 1, 1, 9),
            days: Some(10),
            repeat: None,
        })
        .unwrap();
    assert_eq!(ids.len(), 1);

    let task = service.get_task(ids[0]).unwrap().unwrap();
    assert_eq!(task.kind, TaskKind::Countdown);
    assert_eq!(task.countdown_days, Some(10));
    assert_eq!(task.end, at(2025, 1, 11, 9));
    assert!(task.recurrence.is_none());
}

#[test]
fn countdown_defaults_to_thirty_days() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let ids = service
        .create_countdown(&CountdownRequest {
            owner_id: "alice".to_string(),
            title: "Default".to_string(),
            description: String::new(),
            start: at(2025, 1, 1, 9),
            days: None,
            repeat: None,
        })
        .unwrap();

    let task = service.get_task(ids[0]).unwrap().unwrap();
    assert_eq!(task.countdown_days, Some(30));
    assert_eq!(task.end, at(2025, 1, 31, 9));
}

#[test]
fn countdown_series_stamps_rule_on_every_member() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let ids = service
        .create_countdown(&CountdownRequest {
            owner_id: "alice".to_string(),
            title: "Anniversary".to_string(),
            description: String::new(),
            start: at(2025, 1, 1, 9),
            days: Some(7),
            repeat: Some(CountdownRepeat {
                frequency: RecurrenceFrequency::Yearly,
                interval: 1,
                total_occurrences: 3,
            }),
        })
        .unwrap();
    assert_eq!(ids.len(), 3);

    let members = service
        .list_tasks(&TaskListQuery {
            kind: Some(TaskKind::Countdown),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(members.len(), 3);

    for (index, member) in members.iter().enumerate() {
        let rule = member.recurrence.expect("series member keeps its rule");
        assert_eq!(rule.frequency, RecurrenceFrequency::Yearly);
        assert_eq!(rule.occurrence, Some(index as u32 + 1));
        assert_eq!(rule.total_occurrences, Some(3));
        assert_eq!(member.countdown_days, Some(7));
        assert_eq!(member.start.hour(), 9);
    }
    assert_eq!(members[1].start, at(2026, 1, 1, 9));
    assert_eq!(members[2].start, at(2027, 1, 1, 9));
}

#[test]
fn delete_series_removes_every_member() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let ids = service
        .create_countdown(&CountdownRequest {
            owner_id: "alice".to_string(),
            title: "Weekly check".to_string(),
            description: String::new(),
            start: at(2025, 1, 1, 9),
            days: Some(3),
            repeat: Some(CountdownRepeat {
                frequency: RecurrenceFrequency::Weekly,
                interval: 1,
                total_occurrences: 4,
            }),
        })
        .unwrap();

    let deleted = service.delete_series(&ids).unwrap();
    assert_eq!(deleted, 4);
    assert!(service
        .list_tasks(&TaskListQuery::default())
        .unwrap()
        .is_empty());
}
