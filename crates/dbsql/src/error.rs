/// Errors raised while building, executing or persisting a task
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid task configuration, raised before any statement runs
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the execution hook or connector
    #[error("Execution error: {0}")]
    Execution(Box<dyn std::error::Error + Send + Sync>),

    /// CSV row carried columns that are not part of the result schema
    #[error("Row contains fields not in the schema: {}", .0.join(", "))]
    ExtraFields(Vec<String>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML task file error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Wrap an error coming out of a hook implementation
    pub fn execution<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Execution(err.into())
    }

    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Result type for task operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_wraps_strings() {
        let err = Error::execution("warehouse is stopped");
        assert_eq!(err.to_string(), "Execution error: warehouse is stopped");
        assert!(!err.is_config());
    }

    #[test]
    fn test_extra_fields_message() {
        let err = Error::ExtraFields(vec!["c".to_string(), "d".to_string()]);
        assert_eq!(err.to_string(), "Row contains fields not in the schema: c, d");
    }
}
