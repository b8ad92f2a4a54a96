use std::fmt::{self, Display};

use kanban_core::{FilterOptions, SortDirection, SortField, SortOptions, TaskPriority, TaskStatus, iso_date};
use thiserror::Error;
use time::Date;

/// Error type returned while turning user-facing tokens into filter and sort values.
#[derive(Debug, Error)]
pub enum FilterBuildError {
    #[error("invalid status: {token}")]
    InvalidStatus { token: String },
    #[error("invalid priority: {token}")]
    InvalidPriority { token: String },
    #[error("invalid sort field: {token}")]
    InvalidSortField { token: String },
    #[error("invalid sort direction: {token}")]
    InvalidSortDirection { token: String },
    #[error("invalid date {token}: {source}")]
    InvalidDate {
        token: String,
        #[source]
        source: time::error::Parse,
    },
}

/// Result alias for filter construction helpers.
pub type FilterBuildResult<T> = Result<T, FilterBuildError>;

/// Builder that accepts user-facing strings and normalizes them into [`FilterOptions`].
#[derive(Debug, Clone, Default)]
pub struct TaskFilterBuilder {
    statuses: Vec<TaskStatus>,
    priorities: Vec<TaskPriority>,
    search: Option<String>,
    assignee: Option<String>,
}

impl TaskFilterBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the status criterion (logical OR).
    ///
    /// # Errors
    /// Returns an error if any token is not a known status.
    pub fn with_statuses(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        self.statuses.extend(parse_status_tokens(tokens)?);
        Ok(self)
    }

    /// Extend the priority criterion (logical OR).
    ///
    /// # Errors
    /// Returns an error if any token is not a known priority.
    pub fn with_priorities(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        self.priorities.extend(parse_priority_tokens(tokens)?);
        Ok(self)
    }

    /// Configure the search text (whitespace-only inputs become `None`).
    #[must_use]
    pub fn with_search(mut self, text: Option<String>) -> Self {
        self.search = non_blank(text);
        self
    }

    /// Configure the assignee id.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = non_blank(assignee);
        self
    }

    /// Build the final [`FilterOptions`]; empty lists impose no constraint.
    #[must_use]
    pub fn build(self) -> FilterOptions {
        let mut filters = FilterOptions::default();
        if !self.statuses.is_empty() {
            filters = filters.with_status(self.statuses);
        }
        if !self.priorities.is_empty() {
            filters = filters.with_priority(self.priorities);
        }
        if let Some(search) = self.search {
            filters = filters.with_search(search);
        }
        if let Some(assignee) = self.assignee {
            filters = filters.with_assignee(assignee);
        }
        filters
    }
}

/// Convert tokens such as `in-progress` or `Need Review` into statuses.
///
/// # Errors
/// Returns an error naming the first unknown token.
pub fn parse_status_tokens(tokens: &[String]) -> FilterBuildResult<Vec<TaskStatus>> {
    tokens
        .iter()
        .map(|token| {
            token
                .parse()
                .map_err(|_| FilterBuildError::InvalidStatus { token: token.clone() })
        })
        .collect()
}

/// Convert tokens such as `urgent` or `HIGH` into priorities.
///
/// # Errors
/// Returns an error naming the first unknown token.
pub fn parse_priority_tokens(tokens: &[String]) -> FilterBuildResult<Vec<TaskPriority>> {
    tokens
        .iter()
        .map(|token| {
            token
                .parse()
                .map_err(|_| FilterBuildError::InvalidPriority { token: token.clone() })
        })
        .collect()
}

/// Parse `field[:direction]`, e.g. `priority:desc` or `due_date`.
/// The direction defaults to ascending.
///
/// # Errors
/// Returns an error if the field or direction is unknown.
pub fn parse_sort(raw: &str) -> FilterBuildResult<SortOptions> {
    let (field, direction) = raw.trim().split_once(':').unwrap_or((raw.trim(), ""));

    let normalized = field.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
    let field = match normalized.as_str() {
        "duedate" | "due" => SortField::DueDate,
        "createdat" | "created" => SortField::CreatedAt,
        "priority" => SortField::Priority,
        _ => {
            return Err(FilterBuildError::InvalidSortField {
                token: field.to_owned(),
            });
        }
    };

    let direction = match direction.trim().to_ascii_lowercase().as_str() {
        "" | "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        _ => {
            return Err(FilterBuildError::InvalidSortDirection {
                token: direction.to_owned(),
            });
        }
    };

    Ok(SortOptions::new(field, direction))
}

/// Parse a `YYYY-MM-DD` due date.
///
/// # Errors
/// Returns an error if the string is not a calendar date in that form.
pub fn parse_due_date(token: &str) -> FilterBuildResult<Date> {
    iso_date::parse(token.trim()).map_err(|source| FilterBuildError::InvalidDate {
        token: token.to_owned(),
        source,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl FilterBuildError {
    /// Convert the error into a message that is friendly for end-users.
    #[must_use]
    pub fn describe_user_facing(&self) -> String {
        match self {
            Self::InvalidStatus { token } => {
                format!("unknown status '{token}' (expected todo, in_progress, need_review or done)")
            }
            Self::InvalidPriority { token } => {
                format!("unknown priority '{token}' (expected low, medium, high or urgent)")
            }
            Self::InvalidSortField { token } => {
                format!("unknown sort field '{token}' (expected dueDate, createdAt or priority)")
            }
            Self::InvalidSortDirection { token } => {
                format!("unknown sort direction '{token}' (expected asc or desc)")
            }
            Self::InvalidDate { token, .. } => format!("date '{token}' must be written as YYYY-MM-DD"),
        }
    }
}

impl Display for TaskFilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFilterBuilder")
            .field("statuses", &self.statuses)
            .field("priorities", &self.priorities)
            .field("search", &self.search)
            .field("assignee", &self.assignee)
            .finish()
    }
}
