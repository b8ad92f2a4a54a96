use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Task;

/// Field a task collection is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Calendar due date.
    DueDate,
    /// Creation timestamp.
    CreatedAt,
    /// Priority rank (urgent first when ascending).
    Priority,
}

impl SortField {
    /// Wire name used in configuration and CLI arguments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DueDate => "dueDate",
            Self::CreatedAt => "createdAt",
            Self::Priority => "priority",
        }
    }
}

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Earliest / most urgent first.
    #[default]
    Asc,
    /// Latest / least urgent first.
    Desc,
}

impl SortDirection {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Single active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOptions {
    /// Key to order by.
    pub field: SortField,
    /// Ascending or descending.
    #[serde(default)]
    pub direction: SortDirection,
}

impl Default for SortOptions {
    /// Due date ascending.
    fn default() -> Self {
        Self::new(SortField::DueDate, SortDirection::Asc)
    }
}

impl SortOptions {
    /// Construct sort options.
    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Ascending order on `field`.
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending order on `field`.
    #[must_use]
    pub const fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.field {
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.as_str(), self.direction.as_str())
    }
}

/// Return a newly ordered copy of `tasks`. Ties keep their input order in both
/// directions.
#[must_use]
pub fn sort_tasks(tasks: &[Task], options: SortOptions) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| options.compare(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaskId, TaskPriority, TaskStatus};
    use time::macros::datetime;
    use time::{Date, OffsetDateTime};

    fn task(id: &str, priority: TaskPriority, due: Date, created: OffsetDateTime) -> Task {
        Task {
            id: TaskId::new(id),
            title: id.into(),
            description: String::new(),
            status: TaskStatus::Todo,
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

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    fn d(raw: &str) -> Date {
        crate::iso_date::parse(raw).unwrap_or_else(|err| panic!("date {raw}: {err}"))
    }

    #[test]
    fn created_at_sorts_by_instant_not_offset() {
        let tasks = vec![
            task("late", TaskPriority::Low, d("2026-03-01"), datetime!(2026-02-01 10:00 +09:00)),
            task("early", TaskPriority::Low, d("2026-03-01"), datetime!(2026-02-01 02:00 UTC)),
        ];
        // 10:00+09:00 is 01:00 UTC, earlier than 02:00 UTC.
        let sorted = sort_tasks(&tasks, SortOptions::asc(SortField::CreatedAt));
        assert_eq!(ids(&sorted), vec!["late", "early"]);
    }

    #[test]
    fn descending_priority_keeps_ties_in_input_order() {
        let created = datetime!(2026-02-01 00:00 UTC);
        let tasks = vec![
            task("a", TaskPriority::High, d("2026-03-01"), created),
            task("b", TaskPriority::Low, d("2026-03-01"), created),
            task("c", TaskPriority::High, d("2026-03-01"), created),
        ];
        let sorted = sort_tasks(&tasks, SortOptions::desc(SortField::Priority));
        assert_eq!(ids(&sorted), vec!["b", "a", "c"]);
    }

    #[test]
    fn display_uses_wire_names() {
        assert_eq!(SortOptions::default().to_string(), "dueDate:asc");
        assert_eq!(SortOptions::desc(SortField::CreatedAt).to_string(), "createdAt:desc");
    }
}
