//! Validation error types

use std::fmt;

/// Error information for a specific field that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Human-readable validation error message.
    pub message: String,
}

impl FieldValidationError {
    /// Creates a new field validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field errors collected for one form submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<FieldValidationError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldValidationError::new(field, message));
    }

    /// Returns `true` when no field failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of failed checks.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the errors in the order they were found.
    pub fn errors(&self) -> &[FieldValidationError] {
        &self.errors
    }

    /// Returns the messages for one field, for inline display next to it.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
