//! Error types for Drainwatch

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrainError {
    // Input errors
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Status {status} cannot be set manually on report {report}: it is derived from its drainage links")]
    DerivedStatus { report: i64, status: String },

    // Lookup errors
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    // Authorization errors
    #[error("Actor is not allowed to {action}")]
    Unauthorized { action: String },

    // Reconciliation errors
    #[error("Reconciliation aborted, no changes were committed: {0}")]
    Reconciliation(String),

    // Adapter errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("File store error: {0}")]
    FileStore(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of errors surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    Reconciliation,
    Internal,
}

impl DrainError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), reason: reason.into() }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized { action: action.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DrainError::Validation { .. } | DrainError::DerivedStatus { .. } => {
                ErrorKind::Validation
            }
            DrainError::NotFound { .. } => ErrorKind::NotFound,
            DrainError::Unauthorized { .. } => ErrorKind::Authorization,
            DrainError::Reconciliation(_) => ErrorKind::Reconciliation,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for DrainError {
    fn from(err: serde_json::Error) -> Self {
        DrainError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(DrainError::validation("title", "required").kind(), ErrorKind::Validation);
        assert_eq!(
            DrainError::DerivedStatus { report: 1, status: "Fixed".into() }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(DrainError::not_found("report", 4).kind(), ErrorKind::NotFound);
        assert_eq!(DrainError::unauthorized("delete report 4").kind(), ErrorKind::Authorization);
        assert_eq!(DrainError::Reconciliation("boom".into()).kind(), ErrorKind::Reconciliation);
        assert_eq!(DrainError::Storage("down".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_messages() {
        let err = DrainError::not_found("drainage segment", 9);
        assert_eq!(err.to_string(), "drainage segment not found: 9");
    }
}
