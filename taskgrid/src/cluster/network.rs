//! Worker networks.
//!
//! A network is a named, fixed-size ordered collection of workers, created
//! once at startup with immutable membership. It is purely a logical
//! grouping label; no real transport is involved.

use super::worker::Worker;
use std::sync::Arc;

/// A named, ordered group of workers.
#[derive(Debug)]
pub struct Network {
    name: String,
    workers: Vec<Arc<Worker>>,
}

impl Network {
    /// Creates a network from its name and member workers.
    ///
    /// Membership order is significant: the dispatcher scans workers in
    /// index order and the lowest available index wins.
    pub fn new(name: impl Into<String>, workers: Vec<Arc<Worker>>) -> Self {
        Self {
            name: name.into(),
            workers,
        }
    }

    /// Returns the network's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the member workers in index order.
    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    /// Returns the number of member workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns true if the network has no workers.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
