#![allow(missing_docs)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use time::macros::datetime;
use time::{Date, Duration};

use kanban_core::{
    FilterOptions, SortDirection, SortField, SortOptions, Task, TaskId, TaskPriority, TaskStatus,
    filter_tasks, sort_tasks,
};

fn make_task(index: usize, title: &str, status: TaskStatus, priority: TaskPriority, due: Date) -> Task {
    let created = datetime!(2026-02-01 00:00 UTC) + Duration::hours(i64::try_from(index).unwrap_or(0));
    Task {
        id: TaskId::new(format!("task-{index}")),
        title: title.to_owned(),
        description: String::new(),
        status,
        priority,
        due_date: due,
        created_at: created,
        updated_at: created,
        assignees: Vec::new(),
        checklists: Vec::new(),
        comments: Vec::new(),
        attachments: 0,
        tags: Vec::new(),
    }
}

fn date(raw: &str) -> Date {
    kanban_core::iso_date::parse(raw).unwrap_or_else(|err| panic!("date {raw}: {err}"))
}

fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|task| task.id.to_string()).collect()
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn priority_strategy() -> impl Strategy<Value = TaskPriority> {
    prop::sample::select(TaskPriority::ALL.to_vec())
}

fn tasks_strategy() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (status_strategy(), priority_strategy(), 0_i64..60, "[a-zA-Z ]{0,12}"),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (status, priority, offset, title))| {
                let due = date("2026-03-01") + Duration::days(offset);
                make_task(idx, &title, status, priority, due)
            })
            .collect()
    })
}

fn sort_strategy() -> impl Strategy<Value = SortOptions> {
    (
        prop::sample::select(vec![SortField::DueDate, SortField::CreatedAt, SortField::Priority]),
        prop::sample::select(vec![SortDirection::Asc, SortDirection::Desc]),
    )
        .prop_map(|(field, direction)| SortOptions::new(field, direction))
}

proptest! {
    #[test]
    fn combined_filter_equals_intersection(tasks in tasks_strategy(), status in status_strategy(), priority in priority_strategy()) {
        let combined = filter_tasks(&tasks, &FilterOptions::default().with_status([status]).with_priority([priority]));
        let by_status = ids(&filter_tasks(&tasks, &FilterOptions::default().with_status([status])));
        let by_priority = ids(&filter_tasks(&tasks, &FilterOptions::default().with_priority([priority])));

        let intersection: Vec<String> = by_status.into_iter().filter(|id| by_priority.contains(id)).collect();
        prop_assert_eq!(ids(&combined), intersection);
    }

    #[test]
    fn filter_preserves_relative_order(tasks in tasks_strategy(), status in status_strategy()) {
        let filtered = filter_tasks(&tasks, &FilterOptions::default().with_status([status]));
        let positions: Vec<usize> = filtered
            .iter()
            .map(|task| tasks.iter().position(|candidate| candidate.id == task.id).unwrap_or(usize::MAX))
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn sort_is_pure_and_deterministic(tasks in tasks_strategy(), options in sort_strategy()) {
        let before = tasks.clone();
        let first = sort_tasks(&tasks, options);
        let second = sort_tasks(&tasks, options);
        prop_assert_eq!(&tasks, &before);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn sort_is_a_permutation_ordered_by_key(tasks in tasks_strategy(), options in sort_strategy()) {
        let sorted = sort_tasks(&tasks, options);
        prop_assert_eq!(sorted.len(), tasks.len());

        let key = |task: &Task| -> i64 {
            match options.field {
                SortField::DueDate => i64::from(task.due_date.to_julian_day()),
                SortField::CreatedAt => task.created_at.unix_timestamp(),
                SortField::Priority => i64::from(task.priority.rank()),
            }
        };
        for pair in sorted.windows(2) {
            match options.direction {
                SortDirection::Asc => prop_assert!(key(&pair[0]) <= key(&pair[1])),
                SortDirection::Desc => prop_assert!(key(&pair[0]) >= key(&pair[1])),
            }
        }
    }
}

#[test]
fn priority_ascending_puts_urgent_first() {
    let due = date("2026-03-01");
    let tasks = vec![
        make_task(1, "low", TaskStatus::Todo, TaskPriority::Low, due),
        make_task(2, "urgent", TaskStatus::Todo, TaskPriority::Urgent, due),
        make_task(3, "high", TaskStatus::Todo, TaskPriority::High, due),
    ];
    let sorted = sort_tasks(&tasks, SortOptions::asc(SortField::Priority));
    let priorities: Vec<TaskPriority> = sorted.iter().map(|task| task.priority).collect();
    assert_eq!(
        priorities,
        vec![TaskPriority::Urgent, TaskPriority::High, TaskPriority::Low]
    );
}

#[test]
fn due_date_ascending_orders_chronologically() {
    let tasks = vec![
        make_task(1, "first", TaskStatus::Todo, TaskPriority::Low, date("2026-03-10")),
        make_task(2, "second", TaskStatus::Todo, TaskPriority::Low, date("2026-03-01")),
        make_task(3, "third", TaskStatus::Todo, TaskPriority::Low, date("2026-03-05")),
    ];
    let sorted = sort_tasks(&tasks, SortOptions::default());
    assert_eq!(ids(&sorted), vec!["task-2", "task-3", "task-1"]);

    let reversed = sort_tasks(&tasks, SortOptions::desc(SortField::DueDate));
    assert_eq!(ids(&reversed), vec!["task-1", "task-3", "task-2"]);
}

#[test]
fn search_is_case_insensitive_on_title() {
    let due = date("2026-03-01");
    let tasks = vec![
        make_task(1, "Deploy app", TaskStatus::Todo, TaskPriority::Low, due),
        make_task(2, "Write changelog", TaskStatus::Todo, TaskPriority::Low, due),
    ];
    let filtered = filter_tasks(&tasks, &FilterOptions::default().with_search("deploy"));
    assert_eq!(ids(&filtered), vec!["task-1"]);
}
