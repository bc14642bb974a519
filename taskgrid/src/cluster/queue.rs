//! Shared task backlog.
//!
//! A single FIFO shared by reference across the dispatcher and every worker.
//! Two producers feed it: the dispatcher (when a targeted network has no
//! available worker) and any worker whose task execution fails. Idle workers
//! drain it via self-service pulls.
//!
//! No priority, no deduplication, no capacity bound, no expiry. Insertion
//! order is pop order.

use super::task::TaskId;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Thread-safe unbounded FIFO of pending tasks.
///
/// Supports concurrent push/pop with no lost updates and no duplicate pops;
/// the lock is only held for the queue operation itself.
#[derive(Debug, Default)]
pub struct TaskBacklog {
    entries: Mutex<VecDeque<TaskId>>,
}

impl TaskBacklog {
    /// Creates a new empty backlog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task at the tail of the backlog.
    pub fn push(&self, task: TaskId) {
        self.entries.lock().push_back(task);
    }

    /// Removes and returns the task at the head of the backlog, if any.
    pub fn pop(&self) -> Option<TaskId> {
        self.entries.lock().pop_front()
    }

    /// Returns the number of tasks currently waiting.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if no tasks are waiting.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_backlog_starts_empty() {
        let backlog = TaskBacklog::new();
        assert!(backlog.is_empty());
        assert_eq!(backlog.len(), 0);
        assert_eq!(backlog.pop(), None);
    }

    #[test]
    fn test_backlog_is_fifo() {
        let backlog = TaskBacklog::new();
        backlog.push(TaskId::new("a"));
        backlog.push(TaskId::new("b"));
        backlog.push(TaskId::new("c"));

        assert_eq!(backlog.len(), 3);
        assert_eq!(backlog.pop(), Some(TaskId::new("a")));
        assert_eq!(backlog.pop(), Some(TaskId::new("b")));
        assert_eq!(backlog.pop(), Some(TaskId::new("c")));
        assert_eq!(backlog.pop(), None);
    }

    #[test]
    fn test_backlog_concurrent_pops_never_duplicate() {
        let backlog = Arc::new(TaskBacklog::new());
        for i in 0..1000 {
            backlog.push(TaskId::new(format!("task-{i}")));
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let backlog = Arc::clone(&backlog);
            handles.push(std::thread::spawn(move || {
                let mut popped = Vec::new();
                while let Some(task) = backlog.pop() {
                    popped.push(task);
                }
                popped
            }));
        }

        let mut all: Vec<TaskId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        all.dedup();

        // Every task popped exactly once
        assert_eq!(all.len(), 1000);
        assert!(backlog.is_empty());
    }
}
