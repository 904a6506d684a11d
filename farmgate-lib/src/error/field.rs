//! Typed access to record fields

/// Why a typed getter on [`Record`](crate::model::Record) failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("record has no field '{field}'")]
    Missing { field: String },

    #[error("field '{field}' is {actual}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Amounts sent as strings (`"31.95"`) that do not parse.
    #[error("field '{field}' holds '{text}', which is not a number")]
    InvalidNumber { field: String, text: String },
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// The field the error is about.
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field } | Self::TypeMismatch { field, .. } | Self::InvalidNumber { field, .. } => field,
        }
    }
}
