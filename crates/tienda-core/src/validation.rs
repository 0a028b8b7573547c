//! # Validation Module
//!
//! Checkout contact-form rules.
//!
//! ## Validation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Validation                                │
//! │                                                                         │
//! │  Form input (name, email, phone, address)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  validate_contact ← THIS MODULE                                        │
//! │  ├── every field checked, every failure collected                      │
//! │  └── OK → trimmed CustomerContact                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  OrderRequest::from_lines → POST /api/pedidos                          │
//! │                                                                         │
//! │  The API validates again; these rules only spare a round trip.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tienda_core::validation::{validate_email, validate_phone};
//!
//! assert!(validate_email("ana@example.com").is_ok());
//! assert!(validate_phone("+34 600-111-222").is_ok());
//! assert!(validate_phone("12345").is_err());
//! ```

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::CustomerContact;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;
pub const ADDRESS_MIN_CHARS: usize = 10;
pub const ADDRESS_MAX_CHARS: usize = 500;
pub const PHONE_MIN_DIGITS: usize = 9;
pub const PHONE_MAX_DIGITS: usize = 15;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

// =============================================================================
// Field Validators
// =============================================================================

/// Checks a trimmed text field against a character-count range.
fn validate_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    // Characters, not bytes: "Íñigo" is five
    let chars = value.chars().count();
    if chars < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if chars > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates the customer's name.
///
/// ## Rules
/// - Trimmed, between 3 and 100 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_length("name", name, NAME_MIN_CHARS, NAME_MAX_CHARS)
}

/// Validates an email address.
///
/// ## Rules
/// - Something before `@`, a dot somewhere after it, no whitespace
///
/// Deliberately loose; deliverability is the mail server's problem.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if !email_pattern().is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like user@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Whitespace (spaces, tabs, newlines), hyphens and `+` are ignored
/// - What remains must be 9 to 15 digits
///
/// ## Example
/// ```text
/// "+34 600-111-222"  →  "34600111222"  (11 digits) ✓
/// "600 11"           →  "60011"        (5 digits)  ✗
/// "600-ABC-222"      →  contains letters           ✗
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let digits: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '+'))
        .collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "may only contain digits, spaces, hyphens and +".to_string(),
        });
    }

    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::OutOfRange {
            field: "phone".to_string(),
            min: PHONE_MIN_DIGITS as i64,
            max: PHONE_MAX_DIGITS as i64,
        });
    }

    Ok(())
}

/// Validates the delivery address.
///
/// ## Rules
/// - Trimmed, between 10 and 500 characters
pub fn validate_address(address: &str) -> ValidationResult<()> {
    validate_length("address", address, ADDRESS_MIN_CHARS, ADDRESS_MAX_CHARS)
}

// =============================================================================
// Whole Form
// =============================================================================

/// Validates every contact field and returns the trimmed contact.
///
/// All failures are collected into one `CoreError::InvalidContact` so the
/// caller can flag each bad field at once.
pub fn validate_contact(contact: &CustomerContact) -> CoreResult<CustomerContact> {
    let errors: Vec<ValidationError> = [
        validate_customer_name(&contact.name),
        validate_email(&contact.email),
        validate_phone(&contact.phone),
        validate_address(&contact.address),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    if errors.is_empty() {
        Ok(contact.trimmed())
    } else {
        Err(CoreError::InvalidContact(errors))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
