use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Prefix that namespaces local ids against the upstream numeric id space.
pub const LOCAL_ID_PREFIX: &str = "task-";

/// Identifier that could not be mapped to an upstream record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task id: {0:?}")]
pub struct InvalidTaskId(pub String);

/// Numeric identifier assigned by the upstream todo API.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct RemoteId(pub u64);

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for RemoteId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for RemoteId {
    type Err = InvalidTaskId;

    /// Accepts both the prefixed local form (`task-5`) and a bare number (`5`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix(LOCAL_ID_PREFIX).unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidTaskId(s.to_owned()))
    }
}

/// Identifier of a task inside the board (`task-<remote id>`).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap an arbitrary local identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build the local identifier for an upstream record.
    #[must_use]
    pub fn from_remote(remote: RemoteId) -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{remote}"))
    }

    /// Recover the upstream id by stripping the local prefix.
    ///
    /// # Errors
    /// Returns [`InvalidTaskId`] when the id does not end in a number.
    pub fn remote_id(&self) -> Result<RemoteId, InvalidTaskId> {
        self.0.parse()
    }

    /// Canonical local form: `5` and `task-5` both become `task-5`. Ids with
    /// no recoverable number are returned unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        self.remote_id().map_or_else(|_| self.clone(), Self::from_remote)
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RemoteId> for TaskId {
    fn from(remote: RemoteId) -> Self {
        Self::from_remote(remote)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(d).map(Self)
    }
}

/// Anything that can name an upstream record: local ids, raw strings or numbers.
pub trait AsRemoteId {
    /// Normalize into the upstream numeric id.
    ///
    /// # Errors
    /// Returns [`InvalidTaskId`] when no numeric id can be recovered.
    fn as_remote_id(&self) -> Result<RemoteId, InvalidTaskId>;
}

impl AsRemoteId for RemoteId {
    fn as_remote_id(&self) -> Result<RemoteId, InvalidTaskId> {
        Ok(*self)
    }
}

impl AsRemoteId for u64 {
    fn as_remote_id(&self) -> Result<RemoteId, InvalidTaskId> {
        Ok(RemoteId(*self))
    }
}

impl AsRemoteId for TaskId {
    fn as_remote_id(&self) -> Result<RemoteId, InvalidTaskId> {
        self.remote_id()
    }
}

impl AsRemoteId for str {
    fn as_remote_id(&self) -> Result<RemoteId, InvalidTaskId> {
        self.parse()
    }
}

impl AsRemoteId for String {
    fn as_remote_id(&self) -> Result<RemoteId, InvalidTaskId> {
        self.parse()
    }
}

impl<T: AsRemoteId + ?Sized> AsRemoteId for &T {
    fn as_remote_id(&self) -> Result<RemoteId, InvalidTaskId> {
        (**self).as_remote_id()
    }
}
