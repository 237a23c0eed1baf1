//! Field validation errors raised before a record reaches the store.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is mandatory")]
    MissingField(String),

    #[error("{field} must contain at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be {max} characters or less")]
    TooLong { field: String, max: usize },

    #[error("{field} has no value named '{value}'")]
    UnknownVariant { field: String, value: String },

    #[error("{0} cannot be set to Default")]
    DefaultNotAllowed(String),

    #[error("{field} must be a positive node id, got {value}")]
    InvalidReference { field: String, value: i64 },
}

impl ValidationError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn unknown_variant(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn default_not_allowed(field: impl Into<String>) -> Self {
        Self::DefaultNotAllowed(field.into())
    }

    pub fn invalid_reference(field: impl Into<String>, value: i64) -> Self {
        Self::InvalidReference {
            field: field.into(),
            value,
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField(field) | Self::DefaultNotAllowed(field) => field,
            Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::UnknownVariant { field, .. }
            | Self::InvalidReference { field, .. } => field,
        }
    }
}
