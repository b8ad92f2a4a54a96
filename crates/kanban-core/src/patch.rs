use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Assignee, Checklist, Task, TaskComment, TaskPriority, TaskStatus};

/// Payload for creating a task: everything but the system-owned fields.
///
/// Titles are validated by the form that builds the draft; nothing below the
/// presentation layer re-checks them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Display title.
    pub title: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Initial column.
    pub status: TaskStatus,
    /// Initial urgency.
    pub priority: TaskPriority,
    /// Due date.
    #[serde(with = "crate::iso_date")]
    pub due_date: Date,
    /// Assignees.
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    /// Checklists.
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    /// Comments.
    #[serde(default)]
    pub comments: Vec<TaskComment>,
    /// Attachment count.
    #[serde(default)]
    pub attachments: u32,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TaskDraft {
    /// Minimal draft with empty collections.
    pub fn new(title: impl Into<String>, status: TaskStatus, priority: TaskPriority, due_date: Date) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status,
            priority,
            due_date,
            assignees: Vec::new(),
            checklists: Vec::new(),
            comments: Vec::new(),
            attachments: 0,
            tags: Vec::new(),
        }
    }

    /// Overwrite the client-owned fields of `task` with the draft's values.
    ///
    /// The id, title and timestamps stay as the upstream reported them.
    pub fn overlay_onto(&self, task: &mut Task) {
        task.description.clone_from(&self.description);
        task.status = self.status;
        task.priority = self.priority;
        task.due_date = self.due_date;
        task.assignees.clone_from(&self.assignees);
        task.checklists.clone_from(&self.checklists);
        task.comments.clone_from(&self.comments);
        task.attachments = self.attachments;
        task.tags.clone_from(&self.tags);
    }
}

/// Partial task; only present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New urgency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// New due date.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_iso_date")]
    pub due_date: Option<Date>,
    /// Replacement assignee list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<Assignee>>,
    /// Replacement checklists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklists: Option<Vec<Checklist>>,
    /// New attachment count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<u32>,
    /// Replacement tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    /// Returns true when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.assignees.is_none()
            && self.checklists.is_none()
            && self.attachments.is_none()
            && self.tags.is_none()
    }

    /// Change the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Change the status.
    #[must_use]
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Change the priority.
    #[must_use]
    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Change the due date.
    #[must_use]
    pub fn due_date(mut self, due_date: Date) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Overwrite the present fields onto `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(assignees) = &self.assignees {
            task.assignees.clone_from(assignees);
        }
        if let Some(checklists) = &self.checklists {
            task.checklists.clone_from(checklists);
        }
        if let Some(attachments) = self.attachments {
            task.attachments = attachments;
        }
        if let Some(tags) = &self.tags {
            task.tags.clone_from(tags);
        }
    }
}

mod optional_iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => crate::iso_date::serialize(date, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(d)?
            .map(|raw| crate::iso_date::parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
