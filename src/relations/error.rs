use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelationError {
    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    InvalidRequest(String),

    /// Raised by the underlying store, surfaced as-is.
    #[error("{0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl RelationError {
    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RelationError::NotFound(_) => "not_found",
            RelationError::Unauthorized => "unauthorized",
            RelationError::InvalidRequest(_) => "invalid_request",
            RelationError::Persistence(_) => "persistence_error",
        }
    }
}

/// Result of a relation write as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationOutcome {
    pub fn ok() -> Self {
        OperationOutcome {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        OperationOutcome {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl<T> From<Result<T, RelationError>> for OperationOutcome {
    fn from(result: Result<T, RelationError>) -> Self {
        match result {
            Ok(_) => OperationOutcome::ok(),
            Err(e) => OperationOutcome::failed(e.to_string()),
        }
    }
}
