//! Field-level validation errors shared by request normalization and
//! review submission.

use serde::{Deserialize, Serialize};

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name (None for request-level errors).
    pub field: Option<String>,

    /// Error message.
    pub message: String,
}

impl ValidationError {
    /// Create a field-level error.
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            message: message.into(),
        }
    }

    /// Create a request-level error.
    pub fn request(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Collects errors while a request is checked field by field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn field(&mut self, name: &str, message: impl Into<String>) {
        self.push(ValidationError::field(name, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// `Ok(value)` if nothing was reported.
    pub fn finish<T>(self, value: T) -> Result<T, Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

/// Check a trimmed text field's length in characters.
pub fn check_length(
    validator: &mut Validator,
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) -> Option<String> {
    let Some(value) = value.map(str::trim) else {
        validator.field(field, format!("{field} is required"));
        return None;
    };

    let len = value.chars().count();
    if len < min || len > max {
        validator.field(
            field,
            format!("{field} must be between {min} and {max} characters, got {len}"),
        );
        return None;
    }

    Some(value.to_string())
}
