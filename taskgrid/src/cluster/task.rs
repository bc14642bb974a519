//! Task identity.
//!
//! A task is an opaque identifier: it has no internal structure, is created
//! once by the task source, and is never mutated. Everything the cluster
//! does with a task is carry it from the dispatcher to a worker or park it
//! on the shared backlog.

use std::fmt;

/// Opaque identifier for a task.
///
/// Task IDs are strings that uniquely identify a unit of work. They can be
/// constructed from any meaningful data; the cluster never inspects them.
///
/// # Example
///
/// ```ignore
/// use taskgrid::cluster::TaskId;
///
/// let id = TaskId::new("task-42");
/// assert_eq!(id.as_str(), "task-42");
/// ```
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new task ID with the given string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string value of this task ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
