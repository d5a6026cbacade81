//! Domain error model.
//!
//! `ValidationError` is the shared vocabulary for malformed or out-of-range
//! input. It always names the offending field so adapters can report it.

use thiserror::Error;

/// Domain-level error for failures that are not tied to one component.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// A single input validation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Value must be strictly greater than zero.
    #[error("{field} must be a positive number")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value exceeds its upper bound.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Value has more decimal places than allowed.
    #[error("{field} must have at most {max_scale} decimal places")]
    TooPrecise { field: String, max_scale: u32 },

    /// Value has the wrong shape.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not.
    #[error("{field} does not match {other}")]
    Mismatch { field: String, other: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        Self::Required { field: field.into() }
    }

    pub fn too_long(field: impl Into<String>, max: usize) -> Self {
        Self::TooLong { field: field.into(), max }
    }

    pub fn too_short(field: impl Into<String>, min: usize) -> Self {
        Self::TooShort { field: field.into(), min }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        Self::MustBePositive { field: field.into() }
    }

    pub fn negative(field: impl Into<String>) -> Self {
        Self::Negative { field: field.into() }
    }

    pub fn too_large(field: impl Into<String>, max: impl ToString) -> Self {
        Self::TooLarge {
            field: field.into(),
            max: max.to_string(),
        }
    }

    pub fn too_precise(field: impl Into<String>, max_scale: u32) -> Self {
        Self::TooPrecise {
            field: field.into(),
            max_scale,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn mismatch(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::Mismatch {
            field: field.into(),
            other: other.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::TooShort { field, .. }
            | Self::MustBePositive { field }
            | Self::Negative { field }
            | Self::TooLarge { field, .. }
            | Self::TooPrecise { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::Mismatch { field, .. } => field,
        }
    }
}

/// Every validation failure found in one input, in discovery order.
///
/// Used where the caller benefits from seeing all problems at once (forms).
#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
#[error("{}", summary(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn summary(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(value: ValidationError) -> Self {
        Self(vec![value])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");
        assert_eq!(
            ValidationError::must_be_positive("price").to_string(),
            "price must be a positive number"
        );
        assert_eq!(
            ValidationError::too_precise("price", 2).to_string(),
            "price must have at most 2 decimal places"
        );
        assert_eq!(ValidationError::negative("quantity_in_stock").field(), "quantity_in_stock");
    }

    #[test]
    fn collected_errors_join_into_one_message() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::required("username"));
        errors.push(ValidationError::too_short("password", 8));

        assert_eq!(
            errors.to_string(),
            "username is required; password must be at least 8 characters"
        );
        assert!(errors.into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
