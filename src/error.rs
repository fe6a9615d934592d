//! Error types for the type model

use thiserror::Error;

/// Result type for type model operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Type model errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Bad precision/scale, duplicate names at construction, unknown default symbol
    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),

    #[error("Naming conflict: '{name}' is already used in {scope}")]
    NamingConflict { name: String, scope: String },

    /// An external schema construct without a mapping onto the type model
    #[error("Unsupported schema shape: {0}")]
    UnsupportedShape(String),

    #[error("Cannot parse '{input}' as {kind}: {reason}")]
    ValueSyntax {
        kind: String,
        input: String,
        reason: String,
    },

    #[error("Cannot represent '{input}' as {kind} without loss: {reason}")]
    ValuePrecision {
        kind: String,
        input: String,
        reason: String,
    },

    /// Write-once and ownership violations
    #[error("Invalid state: {0}")]
    StructuralState(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Type has no name or documentation: {0}")]
    UnnamedType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    pub(crate) fn syntax(kind: impl ToString, input: &str, reason: impl ToString) -> Self {
        SchemaError::ValueSyntax {
            kind: kind.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn precision(kind: impl ToString, input: &str, reason: impl ToString) -> Self {
        SchemaError::ValuePrecision {
            kind: kind.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn conflict(name: &str, scope: impl Into<String>) -> Self {
        SchemaError::NamingConflict {
            name: name.to_string(),
            scope: scope.into(),
        }
    }

    /// The input was not a valid literal for its type
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, SchemaError::ValueSyntax { .. })
    }

    /// The input was a valid literal, but too precise or out of range
    pub fn is_precision_error(&self) -> bool {
        matches!(self, SchemaError::ValuePrecision { .. })
    }
}
