//! Per-task outcomes and the end-of-run tally

use crate::queue::target::Target;
use crate::utils::error::TaskError;
use std::fmt;

/// Outcome of one download. Produced exactly once per scheduled target.
#[derive(Debug)]
pub struct TaskResult {
    pub target: Target,
    pub error: Option<TaskError>,
}

impl TaskResult {
    pub fn success(target: Target) -> Self {
        Self {
            target,
            error: None,
        }
    }

    pub fn failure(target: Target, error: TaskError) -> Self {
        Self {
            target,
            error: Some(error),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Running success/failure counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished task
    pub fn record(&mut self, result: &TaskResult) {
        if result.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Successfully downloaded: {}", self.succeeded)?;
        write!(f, "Failed downloads:      {}", self.failed)
    }
}
