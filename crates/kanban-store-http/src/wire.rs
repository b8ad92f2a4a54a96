//! Upstream record shapes and their checked decoding.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Upstream todo record (`{id, todo, completed, userId}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRecord {
    /// Upstream numeric id.
    pub id: u64,
    /// Todo text, used as the task title.
    pub todo: String,
    /// Completion flag.
    pub completed: bool,
    /// Owning user, when reported.
    pub user_id: Option<u64>,
}

impl TodoRecord {
    /// Decode a single record from raw JSON bytes.
    ///
    /// # Errors
    /// Returns [`DecodeError`] naming the first missing or malformed field.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value, "")
    }

    /// Decode a record from an already parsed JSON value. `path` prefixes the
    /// field names reported in errors.
    ///
    /// # Errors
    /// Returns [`DecodeError`] naming the first missing or malformed field.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, DecodeError> {
        let object = as_object(value, path)?;

        let id = required(object, path, "id")?;
        let id = id.as_u64().ok_or_else(|| invalid(path, "id", "a non-negative integer"))?;

        let todo = required(object, path, "todo")?;
        let todo = todo
            .as_str()
            .ok_or_else(|| invalid(path, "todo", "a string"))?
            .to_owned();

        let completed = match optional(object, "completed") {
            None => false,
            Some(value) => value
                .as_bool()
                .ok_or_else(|| invalid(path, "completed", "a boolean"))?,
        };

        let user_id = match optional(object, "userId") {
            None => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .ok_or_else(|| invalid(path, "userId", "a non-negative integer"))?,
            ),
        };

        Ok(Self {
            id,
            todo,
            completed,
            user_id,
        })
    }
}

/// One page of upstream records (`{todos, total, skip, limit}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPage {
    /// Records in upstream order.
    pub todos: Vec<TodoRecord>,
    /// Total number of records upstream, when reported.
    pub total: Option<u64>,
}

impl TodoPage {
    /// Decode a page from raw JSON bytes.
    ///
    /// # Errors
    /// Returns [`DecodeError`] naming the first missing or malformed field.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(body)?;
        let object = as_object(&value, "")?;

        let todos = required(object, "", "todos")?
            .as_array()
            .ok_or_else(|| invalid("", "todos", "an array"))?
            .iter()
            .enumerate()
            .map(|(idx, item)| TodoRecord::from_value(item, &format!("todos[{idx}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let total = optional(object, "total").and_then(Value::as_u64);

        Ok(Self { todos, total })
    }
}

/// Body of `POST /todos/add`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoBody<'a> {
    /// Task title.
    pub todo: &'a str,
    /// Always false for new records.
    pub completed: bool,
    /// Placeholder owner.
    pub user_id: u64,
}

/// Body of `PUT /todos/{id}`.
#[derive(Debug, Serialize)]
pub struct UpdateTodoBody<'a> {
    /// New title, omitted when unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<&'a str>,
    /// Whether the task is now done.
    pub completed: bool,
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_owned()
    } else {
        format!("{path}.{field}")
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| DecodeError::InvalidField {
        path: if path.is_empty() { "<root>".to_owned() } else { path.to_owned() },
        expected: "an object",
    })
}

fn optional<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|value| !value.is_null())
}

fn required<'a>(object: &'a Map<String, Value>, path: &str, field: &str) -> Result<&'a Value, DecodeError> {
    optional(object, field).ok_or_else(|| DecodeError::MissingField {
        path: join(path, field),
    })
}

fn invalid(path: &str, field: &str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidField {
        path: join(path, field),
        expected,
    }
}
