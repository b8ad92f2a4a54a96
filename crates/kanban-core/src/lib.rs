//! Domain types and the filter/sort engine for the kanban board.

/// Filter criteria and the filtering half of the engine.
pub mod filter;
/// Identifier types.
pub mod id;
/// Partial task payloads (create drafts and updates).
pub mod patch;
/// Sort options and the ordering half of the engine.
pub mod sort;
/// Status and priority enumerations.
pub mod status;
/// Case-insensitive title matching.
pub mod text_matcher;

pub use filter::{FieldPatch, FilterOptions, FilterPatch, filter_tasks};
pub use id::{AsRemoteId, InvalidTaskId, LOCAL_ID_PREFIX, RemoteId, TaskId};
pub use patch::{TaskDraft, TaskUpdate};
pub use sort::{SortDirection, SortField, SortOptions, sort_tasks};
pub use status::{TaskPriority, TaskStatus, UnknownVariant};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// The unit of work tracked by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Local identifier (`task-<remote id>`); never changes after creation.
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Free text, may be empty.
    pub description: String,
    /// Current column.
    pub status: TaskStatus,
    /// Current urgency.
    pub priority: TaskPriority,
    /// Calendar due date.
    #[serde(with = "iso_date")]
    pub due_date: Date,
    /// Creation timestamp, set by the system.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification timestamp, set by the system.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// People working on the task, in display order.
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    /// Progress checklists.
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    /// Discussion thread.
    #[serde(default)]
    pub comments: Vec<TaskComment>,
    /// Number of attached files.
    #[serde(default)]
    pub attachments: u32,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// Whether any assignee carries the given id.
    #[must_use]
    pub fn is_assigned_to(&self, assignee_id: &str) -> bool {
        self.assignees.iter().any(|assignee| assignee.id == assignee_id)
    }
}

/// Reference to a person assigned to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar image URL.
    pub avatar: String,
    /// Contact email.
    pub email: String,
}

/// Checklist progress summary (`completed <= total`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    /// Identifier.
    pub id: String,
    /// Checklist heading.
    pub title: String,
    /// Items ticked off.
    pub completed: u32,
    /// Items in total.
    pub total: u32,
}

impl Checklist {
    /// Build a checklist, clamping `completed` to `total`.
    pub fn new(id: impl Into<String>, title: impl Into<String>, completed: u32, total: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: completed.min(total),
            total,
        }
    }
}

/// Comment left on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    /// Identifier.
    pub id: String,
    /// Who wrote it.
    pub author: Assignee,
    /// Body text.
    pub content: String,
    /// When it was written.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// `YYYY-MM-DD` (de)serialization for [`Date`].
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;
    use time::macros::format_description;

    /// Format a date as `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns an error if the date cannot be formatted.
    pub fn format(date: Date) -> Result<String, time::error::Format> {
        date.format(format_description!("[year]-[month]-[day]"))
    }

    /// Parse a `YYYY-MM-DD` string.
    ///
    /// # Errors
    /// Returns an error if the input is not a calendar date.
    pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
        Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
    }

    /// Serde serializer.
    ///
    /// # Errors
    /// Propagates formatting failures as serializer errors.
    pub fn serialize<S>(date: &Date, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = format(*date).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&formatted)
    }

    /// Serde deserializer.
    ///
    /// # Errors
    /// Returns an error when the string is not a `YYYY-MM-DD` date.
    pub fn deserialize<'de, D>(d: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
