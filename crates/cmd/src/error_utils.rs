// Shared context messages for task file errors

use anyhow::{Result, anyhow};
use std::path::Path;

/// Extension trait adding task-file context to library errors
pub trait TaskContext<T> {
    /// "Failed to <operation> <path>: <error>"
    fn task_context(self, operation: &str, path: &Path) -> Result<T>;
}

impl<T, E> TaskContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn task_context(self, operation: &str, path: &Path) -> Result<T> {
        self.map_err(|e| anyhow!("Failed to {} {}: {}", operation, path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_context_message() {
        let result: std::result::Result<(), &str> = Err("boom");
        let err = result
            .task_context("load", Path::new("tasks/load.yaml"))
            .expect_err("error");
        assert_eq!(err.to_string(), "Failed to load tasks/load.yaml: boom");
    }
}
