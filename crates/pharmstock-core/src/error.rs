//! # Error Types
//!
//! Domain-specific error types for pharmstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmstock-core errors (this file)                                    │
//! │  ├── CoreError        - Bad arguments, wrapped validation failures     │
//! │  └── ValidationError  - A single field violated a constraint           │
//! │                                                                         │
//! │  pharmstock-db errors (separate crate)                                 │
//! │  └── DbError          - NotFound, UniqueViolation, unavailability      │
//! │                                                                         │
//! │  pharmstock-api errors (in app)                                        │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                           DbError ──┴──► ApiError → JSON response      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised before a request reaches the record store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A non-field argument is malformed.
    ///
    /// ## When This Occurs
    /// - Negative `limit` or `offset` on a list request
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidArgument error.
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending field; the variant itself is the
/// violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is below zero (or not a number).
    #[error("{field} must be greater than or equal to 0")]
    Negative { field: String },
}

impl ValidationError {
    /// Returns the name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::Negative { field } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");

        let err = ValidationError::TooLong {
            field: "units".to_string(),
            max: 50,
        };
        assert_eq!(err.to_string(), "units must be at most 50 characters");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must be greater than or equal to 0");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::TooLong {
            field: "drug_name".to_string(),
            max: 255,
        };
        assert_eq!(err.field(), "drug_name");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "manufacturer".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = CoreError::invalid_argument("limit", "must not be negative");
        assert_eq!(err.to_string(), "Invalid argument limit: must not be negative");
    }
}
