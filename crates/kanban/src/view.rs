//! Plain-text rendering of tasks for the terminal.

use kanban_app::BoardColumn;
use kanban_core::Task;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

const RELATIVE_WINDOW_DAYS: i64 = 30;

/// Human due date relative to `today`: `Today`, `Tomorrow`, a weekday within
/// the current Sunday-based week, `Mar 5` within the next 30 days, else
/// `Mar 5, 2026`.
pub fn format_due(date: Date, today: Date) -> String {
    if date == today {
        return "Today".to_owned();
    }
    if today.next_day() == Some(date) {
        return "Tomorrow".to_owned();
    }
    if week_start(date) == week_start(today) {
        return date.weekday().to_string();
    }

    let days_until = (date - today).whole_days();
    let formatted = if days_until > 0 && days_until <= RELATIVE_WINDOW_DAYS {
        date.format(format_description!("[month repr:short] [day padding:none]"))
    } else {
        date.format(format_description!("[month repr:short] [day padding:none], [year]"))
    };
    formatted.unwrap_or_else(|_| date.to_string())
}

/// `Mar 5, 2026 14:30`.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[month repr:short] [day padding:none], [year] [hour]:[minute]"
    ))
    .unwrap_or_else(|_| at.to_string())
}

fn week_start(date: Date) -> Date {
    let offset = i64::from(date.weekday().number_days_from_sunday());
    date.saturating_sub(Duration::days(offset))
}

fn assignee_names(task: &Task) -> String {
    if task.assignees.is_empty() {
        "-".to_owned()
    } else {
        task.assignees
            .iter()
            .map(|assignee| assignee.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn checklist_progress(task: &Task) -> Option<(u32, u32)> {
    let (done, total) = task
        .checklists
        .iter()
        .fold((0, 0), |(done, total), list| (done + list.completed, total + list.total));
    (total > 0).then_some((done, total))
}

/// Table of tasks in the given order.
pub fn render_list(tasks: &[Task], today: Date) -> String {
    let mut lines = vec![
        "ID | Status | Priority | Title | Due | Assignees".to_owned(),
        "-- | ------ | -------- | ----- | --- | ---------".to_owned(),
    ];
    lines.extend(tasks.iter().map(|task| {
        format!(
            "{} | {} | {} | {} | {} | {}",
            task.id,
            task.status.label(),
            task.priority.label(),
            task.title,
            format_due(task.due_date, today),
            assignee_names(task),
        )
    }));
    lines.join("\n")
}

/// One block per kanban column.
pub fn render_board(columns: &[BoardColumn], today: Date) -> String {
    let mut lines = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            lines.push(String::new());
        }
        lines.push(format!("{} ({})", column.status.label(), column.tasks.len()));
        if column.tasks.is_empty() {
            lines.push("  No tasks".to_owned());
        }
        for task in &column.tasks {
            let mut card = format!(
                "  {}  {}  [{}]  due {}",
                task.id,
                task.title,
                task.priority.label(),
                format_due(task.due_date, today)
            );
            if let Some((done, total)) = checklist_progress(task) {
                card.push_str(&format!("  {done}/{total}"));
            }
            lines.push(card);
        }
    }
    lines.join("\n")
}

/// Full detail view of one task.
pub fn render_detail(task: &Task, today: Date) -> String {
    let mut lines = vec![
        format!("{} ({})", task.title, task.id),
        format!("Status:      {}", task.status.label()),
        format!("Priority:    {}", task.priority.label()),
        format!("Due:         {}", format_due(task.due_date, today)),
    ];

    if task.assignees.is_empty() {
        lines.push("Assignees:   -".to_owned());
    }
    for assignee in &task.assignees {
        lines.push(format!("Assignees:   {} <{}>", assignee.name, assignee.email));
    }
    if !task.tags.is_empty() {
        lines.push(format!("Tags:        {}", task.tags.join(", ")));
    }
    for checklist in &task.checklists {
        lines.push(format!(
            "Checklist:   {} {}/{}",
            checklist.title, checklist.completed, checklist.total
        ));
    }
    lines.push(format!("Attachments: {}", task.attachments));
    lines.push(format!("Created:     {}", format_timestamp(task.created_at)));
    lines.push(format!("Updated:     {}", format_timestamp(task.updated_at)));

    if !task.description.is_empty() {
        lines.push(String::new());
        lines.push(task.description.clone());
    }

    lines.push(String::new());
    lines.push(format!("Comments ({})", task.comments.len()));
    for comment in &task.comments {
        lines.push(format!(
            "  - {} ({}): {}",
            comment.author.name,
            format_timestamp(comment.created_at),
            comment.content
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::{Assignee, Checklist, TaskId, TaskPriority, TaskStatus};
    use pretty_assertions::assert_eq;
    use time::macros::{date, datetime};

    // A Wednesday; its week runs Sunday Mar 1 to Saturday Mar 7.
    const TODAY: Date = date!(2026 - 03 - 04);

    fn sample() -> Task {
        Task {
            id: TaskId::new("task-2"),
            title: "Deploy app".into(),
            description: "Task description for Deploy app".into(),
            status: TaskStatus::InProgress,
            priority: TaskPriority::Urgent,
            due_date: date!(2026 - 03 - 05),
            created_at: datetime!(2026-03-01 09:05 UTC),
            updated_at: datetime!(2026-03-04 17:30 UTC),
            assignees: vec![Assignee {
                id: "user-3".into(),
                name: "Team Member 3".into(),
                avatar: String::new(),
                email: "user2@example.com".into(),
            }],
            checklists: vec![Checklist::new("checklist-2", "Subtasks", 1, 4)],
            comments: Vec::new(),
            attachments: 2,
            tags: vec!["important".into(), "review".into()],
        }
    }

    #[test]
    fn due_dates_render_relative_to_today() {
        let cases = [
            (date!(2026 - 03 - 04), "Today"),
            (date!(2026 - 03 - 05), "Tomorrow"),
            (date!(2026 - 03 - 06), "Friday"),
            (date!(2026 - 03 - 02), "Monday"),
            (date!(2026 - 03 - 08), "Mar 8"),
            (date!(2026 - 04 - 03), "Apr 3"),
            (date!(2026 - 04 - 04), "Apr 4, 2026"),
            (date!(2026 - 02 - 20), "Feb 20, 2026"),
        ];
        for (due, expected) in cases {
            assert_eq!(format_due(due, TODAY), expected, "due {due}");
        }
    }

    #[test]
    fn timestamps_use_short_month() {
        assert_eq!(format_timestamp(datetime!(2026-03-01 09:05 UTC)), "Mar 1, 2026 09:05");
    }

    #[test]
    fn list_renders_one_row_per_task() {
        let rendered = render_list(&[sample()], TODAY);
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[2],
            "task-2 | In Progress | Urgent | Deploy app | Tomorrow | Team Member 3"
        );
    }

    #[test]
    fn board_marks_empty_columns() {
        let columns = vec![
            BoardColumn {
                status: TaskStatus::Todo,
                tasks: Vec::new(),
            },
            BoardColumn {
                status: TaskStatus::InProgress,
                tasks: vec![sample()],
            },
        ];
        let rendered = render_board(&columns, TODAY);
        assert_eq!(
            rendered,
            "To-do (0)\n  No tasks\n\nIn Progress (1)\n  task-2  Deploy app  [Urgent]  due Tomorrow  1/4"
        );
    }

    #[test]
    fn detail_lists_every_section() {
        let rendered = render_detail(&sample(), TODAY);
        assert!(rendered.starts_with("Deploy app (task-2)\nStatus:      In Progress\n"));
        assert!(rendered.contains("Assignees:   Team Member 3 <user2@example.com>"));
        assert!(rendered.contains("Tags:        important, review"));
        assert!(rendered.contains("Checklist:   Subtasks 1/4"));
        assert!(rendered.contains("Attachments: 2"));
        assert!(rendered.contains("Updated:     Mar 4, 2026 17:30"));
        assert!(rendered.ends_with("Comments (0)"));
    }
}
