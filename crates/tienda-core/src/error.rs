//! # Error Types
//!
//! Domain-specific error types for tienda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tienda-core errors (this file)                                        │
//! │  ├── CoreError        - Domain failures (empty cart, bad contact, ...) │
//! │  ├── ValidationError  - One checkout field that failed its rule        │
//! │  └── StorageError     - Storage backend failures                       │
//! │                                                                         │
//! │  tienda-client errors (separate crate)                                 │
//! │  ├── FetchError       - Timeout / HTTP / transport / cancelled         │
//! │  └── ClientError      - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → user message        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cart Operations Never Fail
//! `CartStore` recovers every error locally: a corrupt snapshot degrades to
//! an empty cart and a failed write is logged. `SnapshotDecode` and
//! `StorageError` exist so those paths have a typed value to log.

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Core storefront errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the loaded catalog.
    ///
    /// ## When This Occurs
    /// - A stale "add" button refers to a product no longer in the listing
    /// - A typo in a product id passed on the command line
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Checkout was attempted with nothing in the cart.
    #[error("The cart is empty")]
    EmptyCart,

    /// One or more contact fields failed validation.
    ///
    /// Every failing field is reported so the form can mark all of them at
    /// once instead of one per submit.
    #[error("Invalid contact details: {}", join_errors(.0))]
    InvalidContact(Vec<ValidationError>),

    /// The stored cart snapshot could not be decoded.
    #[error("Cart snapshot is not valid: {0}")]
    SnapshotDecode(String),

    /// Unknown order status value.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when checkout input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value or digit count is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the field this error is about.
    ///
    /// Used by the presentation layer to attach the message to the right
    /// input.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Storage Error
// =============================================================================

/// Failures reported by a `Storage` backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not read or write its medium.
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// The backend's own data could not be (de)serialized.
    #[error("Storage serialization failed: {0}")]
    Serialization(String),

    /// The backend's lock was poisoned by a panicking writer.
    #[error("Storage is unavailable")]
    Unavailable,
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
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
    fn test_error_messages() {
        let err = CoreError::ProductNotFound(42);
        assert_eq!(err.to_string(), "Product not found: 42");
        assert_eq!(CoreError::EmptyCart.to_string(), "The cart is empty");
    }

    #[test]
    fn test_invalid_contact_lists_every_field() {
        let err = CoreError::InvalidContact(vec![
            ValidationError::TooShort {
                field: "name".to_string(),
                min: 3,
            },
            ValidationError::InvalidFormat {
                field: "email".to_string(),
                reason: "must look like user@example.com".to_string(),
            },
        ]);
        let message = err.to_string();
        assert!(message.contains("name must be at least 3 characters"));
        assert!(message.contains("email has invalid format"));
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::OutOfRange {
            field: "phone".to_string(),
            min: 9,
            max: 15,
        };
        assert_eq!(err.field(), "phone");
        assert_eq!(err.to_string(), "phone must be between 9 and 15");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "address".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
