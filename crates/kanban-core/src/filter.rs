use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::text_matcher::TextMatcher;
use crate::{Task, TaskPriority, TaskStatus};

/// Declarative criteria narrowing a task collection.
///
/// Every field is optional; an absent field imposes no constraint and present
/// fields compose with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Allowed statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BTreeSet<TaskStatus>>,
    /// Allowed priorities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<BTreeSet<TaskPriority>>,
    /// Case-insensitive title substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Assignee id that must be among the task's assignees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl FilterOptions {
    /// Returns true when no field constrains the result.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.search.is_none() && self.assignee.is_none()
    }

    /// Restrict to the given statuses.
    #[must_use]
    pub fn with_status(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.status = Some(statuses.into_iter().collect());
        self
    }

    /// Restrict to the given priorities.
    #[must_use]
    pub fn with_priority(mut self, priorities: impl IntoIterator<Item = TaskPriority>) -> Self {
        self.priority = Some(priorities.into_iter().collect());
        self
    }

    /// Restrict to titles containing `search`.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Restrict to tasks assigned to `assignee`.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Evaluate every present criterion against one task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.compile().matches(task)
    }

    fn compile(&self) -> CompiledFilter<'_> {
        CompiledFilter {
            options: self,
            text: self.search.as_deref().and_then(TextMatcher::new),
        }
    }
}

struct CompiledFilter<'a> {
    options: &'a FilterOptions,
    text: Option<TextMatcher>,
}

impl CompiledFilter<'_> {
    fn matches(&self, task: &Task) -> bool {
        if let Some(statuses) = &self.options.status
            && !statuses.contains(&task.status)
        {
            return false;
        }
        if let Some(priorities) = &self.options.priority
            && !priorities.contains(&task.priority)
        {
            return false;
        }
        if let Some(matcher) = &self.text
            && !matcher.matches(task)
        {
            return false;
        }
        if let Some(assignee) = self.options.assignee.as_deref()
            && !task.is_assigned_to(assignee)
        {
            return false;
        }
        true
    }
}

/// Keep the tasks that pass every present criterion, preserving input order.
#[must_use]
pub fn filter_tasks(tasks: &[Task], filters: &FilterOptions) -> Vec<Task> {
    if filters.is_empty() {
        return tasks.to_vec();
    }
    let compiled = filters.compile();
    tasks.iter().filter(|task| compiled.matches(task)).cloned().collect()
}

/// Tri-state update for a single filter field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Leave the current value untouched.
    #[default]
    Keep,
    /// Remove the constraint.
    Clear,
    /// Replace the constraint.
    Set(T),
}

impl<T> FieldPatch<T> {
    fn apply(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    /// `Some` sets the field, `None` clears it.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

/// Partial filter update shallow-merged into the current [`FilterOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    /// Status criterion change.
    pub status: FieldPatch<BTreeSet<TaskStatus>>,
    /// Priority criterion change.
    pub priority: FieldPatch<BTreeSet<TaskPriority>>,
    /// Search criterion change.
    pub search: FieldPatch<String>,
    /// Assignee criterion change.
    pub assignee: FieldPatch<String>,
}

impl FilterPatch {
    /// Patch that leaves every field untouched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status criterion.
    #[must_use]
    pub fn status(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.status = FieldPatch::Set(statuses.into_iter().collect());
        self
    }

    /// Set the priority criterion.
    #[must_use]
    pub fn priority(mut self, priorities: impl IntoIterator<Item = TaskPriority>) -> Self {
        self.priority = FieldPatch::Set(priorities.into_iter().collect());
        self
    }

    /// Set the search criterion.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = FieldPatch::Set(search.into());
        self
    }

    /// Set the assignee criterion.
    #[must_use]
    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = FieldPatch::Set(assignee.into());
        self
    }

    /// Merge into `filters`.
    pub fn apply(self, filters: &mut FilterOptions) {
        let Self {
            status,
            priority,
            search,
            assignee,
        } = self;
        status.apply(&mut filters.status);
        priority.apply(&mut filters.priority);
        search.apply(&mut filters.search);
        assignee.apply(&mut filters.assignee);
    }
}

impl From<FilterOptions> for FilterPatch {
    /// Every field of `filters` is written, absent ones are cleared.
    fn from(filters: FilterOptions) -> Self {
        Self {
            status: filters.status.into(),
            priority: filters.priority.into(),
            search: filters.search.into(),
            assignee: filters.assignee.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Assignee, TaskId};
    use time::macros::{date, datetime};

    fn task(id: &str, title: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: TaskId::new(id),
            title: title.into(),
            description: String::new(),
            status,
            priority,
            due_date: date!(2026 - 03 - 01),
            created_at: datetime!(2026-02-01 00:00 UTC),
            updated_at: datetime!(2026-02-01 00:00 UTC),
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

    #[test]
    fn empty_filter_keeps_everything() {
        let tasks = vec![
            task("a", "One", TaskStatus::Todo, TaskPriority::Low),
            task("b", "Two", TaskStatus::Done, TaskPriority::High),
        ];
        assert_eq!(filter_tasks(&tasks, &FilterOptions::default()), tasks);
    }

    #[test]
    fn status_and_priority_compose_with_and() {
        let tasks = vec![
            task("a", "One", TaskStatus::Todo, TaskPriority::High),
            task("b", "Two", TaskStatus::Todo, TaskPriority::Low),
            task("c", "Three", TaskStatus::Done, TaskPriority::High),
        ];
        let filters = FilterOptions::default()
            .with_status([TaskStatus::Todo])
            .with_priority([TaskPriority::High]);
        assert_eq!(ids(&filter_tasks(&tasks, &filters)), vec!["a"]);
    }

    #[test]
    fn empty_search_imposes_no_constraint() {
        let tasks = vec![task("a", "One", TaskStatus::Todo, TaskPriority::High)];
        let filters = FilterOptions::default().with_search("");
        assert_eq!(filter_tasks(&tasks, &filters).len(), 1);
    }

    #[test]
    fn empty_status_set_rejects_everything() {
        let tasks = vec![task("a", "One", TaskStatus::Todo, TaskPriority::High)];
        let filters = FilterOptions::default().with_status([]);
        assert!(filter_tasks(&tasks, &filters).is_empty());
    }

    #[test]
    fn assignee_filter_matches_by_id() {
        let mut assigned = task("a", "One", TaskStatus::Todo, TaskPriority::High);
        assigned.assignees.push(Assignee {
            id: "user-2".into(),
            name: "Team Member 2".into(),
            avatar: String::new(),
            email: String::new(),
        });
        let tasks = vec![assigned, task("b", "Two", TaskStatus::Todo, TaskPriority::High)];
        let filters = FilterOptions::default().with_assignee("user-2");
        assert_eq!(ids(&filter_tasks(&tasks, &filters)), vec!["a"]);
    }

    #[test]
    fn patch_keeps_clears_and_sets_independently() {
        let mut filters = FilterOptions::default()
            .with_status([TaskStatus::Todo])
            .with_search("deploy");

        FilterPatch {
            search: FieldPatch::Clear,
            priority: FieldPatch::Set([TaskPriority::Urgent].into_iter().collect()),
            ..FilterPatch::default()
        }
        .apply(&mut filters);

        assert_eq!(filters.status, Some([TaskStatus::Todo].into_iter().collect()));
        assert_eq!(filters.priority, Some([TaskPriority::Urgent].into_iter().collect()));
        assert_eq!(filters.search, None);
        assert_eq!(filters.assignee, None);
    }

    #[test]
    fn patch_from_options_overwrites_every_field() {
        let mut filters = FilterOptions::default().with_search("deploy");
        FilterPatch::from(FilterOptions::default().with_assignee("user-1")).apply(&mut filters);
        assert_eq!(filters, FilterOptions::default().with_assignee("user-1"));
    }
}
