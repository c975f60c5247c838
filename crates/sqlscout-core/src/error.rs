//! Error types for SQLScout

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Engine call that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineOperation {
    /// Opening the database
    Open,
    /// `EXPLAIN QUERY PLAN` for a query
    Explain,
    /// Applying a single DDL statement
    ApplyDdl,
    /// Executing a schema script
    LoadSchema,
}

impl EngineOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Explain => "explain",
            Self::ApplyDdl => "apply_ddl",
            Self::LoadSchema => "load_schema",
        }
    }
}

impl fmt::Display for EngineOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by the relational engine, tagged with the call that failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct EngineError {
    pub operation: EngineOperation,
    pub message: String,
}

impl EngineError {
    pub fn new(operation: EngineOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Top-level error type for SQLScout front ends
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for SQLScout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_error_names_operation() {
        let err = EngineError::new(EngineOperation::ApplyDdl, "near \"INDX\": syntax error");
        assert_eq!(
            err.to_string(),
            "apply_ddl failed: near \"INDX\": syntax error"
        );
    }

    #[test]
    fn test_scout_error_is_transparent_for_engine_errors() {
        let err: ScoutError = EngineError::new(EngineOperation::Explain, "no such table: t").into();
        assert_eq!(err.to_string(), "explain failed: no such table: t");
    }

    #[test]
    fn test_operation_serialization() {
        let json = serde_json::to_string(&EngineOperation::LoadSchema).unwrap();
        assert_eq!(json, "\"load_schema\"");
    }
}
