//! Error types for medgraph operations.
//!
//! This module provides the error hierarchy shared by the merge engine, the
//! document stores and the graph exporter, with structured error codes and
//! suggestions for resolution.

use thiserror::Error;

/// Result type alias for medgraph operations.
pub type MedGraphResult<T> = Result<T, MedGraphError>;

/// Main error type for all medgraph operations.
#[derive(Error, Debug)]
pub enum MedGraphError {
    /// A record failed validation before reaching the store.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        collection: Option<String>,
    },

    /// A column holds values of more than one type.
    #[error("Type inconsistency in column '{column}': {message}")]
    TypeInconsistency {
        column: String,
        message: String,
        code: ErrorCode,
    },

    /// Document store operation failed.
    #[error("Store error: {message}")]
    Store {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing bulk-import files failed.
    #[error("Export error: {message}")]
    Export {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The external bulk loader failed.
    #[error("Bulk loader error: {message}")]
    Loader {
        message: String,
        code: ErrorCode,
        exit_status: Option<i32>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingKey,
    ValUnknownField,
    ValInvalidValue,

    // Store (STORE_xxx)
    StoreConnectionFailed,
    StoreOperationFailed,
    StoreWriteFailed,

    // Export (EXP_xxx)
    ExpTypeInconsistency,
    ExpWriteFailed,
    ExpLoaderFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingKey => "VAL_002",
            ErrorCode::ValUnknownField => "VAL_003",
            ErrorCode::ValInvalidValue => "VAL_004",
            ErrorCode::StoreConnectionFailed => "STORE_001",
            ErrorCode::StoreOperationFailed => "STORE_002",
            ErrorCode::StoreWriteFailed => "STORE_003",
            ErrorCode::ExpTypeInconsistency => "EXP_001",
            ErrorCode::ExpWriteFailed => "EXP_002",
            ErrorCode::ExpLoaderFailed => "EXP_003",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl MedGraphError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            collection: None,
        }
    }

    /// Create a validation error for an empty key field or required attribute.
    pub fn missing_key(collection: impl Into<String>, field: &str) -> Self {
        let collection = collection.into();
        Self::Validation {
            message: format!("required field '{}' is missing or empty for a '{}' record", field, collection),
            code: ErrorCode::ValMissingKey,
            collection: Some(collection),
        }
    }

    /// Create a validation error for an attribute the schema does not declare.
    pub fn unknown_field(collection: impl Into<String>, field: &str) -> Self {
        let collection = collection.into();
        Self::Validation {
            message: format!("field '{}' is not declared for collection '{}'", field, collection),
            code: ErrorCode::ValUnknownField,
            collection: Some(collection),
        }
    }

    /// Create a validation error for a value that does not fit its merge rule.
    pub fn invalid_value(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidValue,
            collection: Some(collection.into()),
        }
    }

    /// Create a type inconsistency error.
    pub fn type_inconsistency(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeInconsistency {
            column: column.into(),
            message: message.into(),
            code: ErrorCode::ExpTypeInconsistency,
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoreOperationFailed,
            source: None,
        }
    }

    /// Create a store connection error.
    pub fn store_connection(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoreConnectionFailed,
            source: None,
        }
    }

    /// Create an error for a write the store did not acknowledge.
    pub fn store_write(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoreWriteFailed,
            source: None,
        }
    }

    /// Create a store error wrapping the driver error.
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoreOperationFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create an export error wrapping the underlying writer error.
    pub fn export_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Export {
            message: message.into(),
            code: ErrorCode::ExpWriteFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create a bulk loader error.
    pub fn loader(message: impl Into<String>, exit_status: Option<i32>) -> Self {
        Self::Loader {
            message: message.into(),
            code: ErrorCode::ExpLoaderFailed,
            exit_status,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::TypeInconsistency { code, .. } => *code,
            Self::Store { code, .. } => *code,
            Self::Export { code, .. } => *code,
            Self::Loader { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the error concerns a single record and the batch may continue.
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { .. } => Some("Populate every key field before submitting the record"),
            Self::Store { .. } => {
                Some("Check the document store connection; re-running the batch is safe")
            }
            Self::Loader { .. } => Some("Check the bulk loader command and that the graph store is stopped"),
            Self::Configuration(_) => Some("Check the configuration file and MEDGRAPH_* variables"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_error() {
        let err = MedGraphError::missing_key("protein", "primaryDomainId");
        assert_eq!(err.code(), ErrorCode::ValMissingKey);
        assert!(err.is_record_level());
        assert!(err.to_string().contains("primaryDomainId"));
    }

    #[test]
    fn test_store_error_is_not_record_level() {
        let err = MedGraphError::store("connection reset");
        assert_eq!(err.code(), ErrorCode::StoreOperationFailed);
        assert!(!err.is_record_level());
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_store_write_error_code() {
        let err = MedGraphError::store_write("write concern failed");
        assert_eq!(err.code(), ErrorCode::StoreWriteFailed);
        assert_eq!(err.code().as_str(), "STORE_003");
        assert!(!err.is_record_level());
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValMissingKey.as_str(), "VAL_002");
        assert_eq!(ErrorCode::ExpTypeInconsistency.as_str(), "EXP_001");
    }
}
