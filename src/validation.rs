// 📐 Field Validation - constraint checks shared by both registries
// Every violated field is collected; nothing short-circuits on the first error.

use crate::error::{RegistryError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// ============================================================================
// PATTERNS
// ============================================================================

/// Category values: lowercase letters, digits and hyphens
static VALUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9-]+$").unwrap_or_else(|e| panic!("invalid value pattern: {e}"))
});

/// local@domain.tld, no whitespace, exactly one @
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

pub fn is_valid_value(value: &str) -> bool {
    VALUE_PATTERN.is_match(value)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

// ============================================================================
// FIELD ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Accumulates field errors; `finish` turns them into one `ValidationFailed`
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Validator::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Required text: non-blank and at most `max` characters
    pub fn required_text(&mut self, field: &str, label: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(field, format!("{label} is required"));
        } else {
            self.max_chars(field, label, value, max);
        }
    }

    /// Optional text: only the length is checked when present
    pub fn optional_text(&mut self, field: &str, label: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.max_chars(field, label, value, max);
        }
    }

    pub fn category_value(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.push(field, "Value is required");
        } else if !is_valid_value(value) {
            self.push(
                field,
                "Value may only contain lowercase letters, digits and hyphens",
            );
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        match value {
            Some(email) if !email.is_empty() && !is_valid_email(email) => {
                self.push(field, "Email must be a valid email address");
            }
            _ => {}
        }
    }

    fn max_chars(&mut self, field: &str, label: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("{label} must be at most {max} characters"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::ValidationFailed(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_pattern() {
        assert!(is_valid_value("frozen-products"));
        assert!(is_valid_value("a1-b2"));
        assert!(!is_valid_value("Has Spaces"));
        assert!(!is_valid_value("UPPER"));
        assert!(!is_valid_value("under_score"));
        assert!(!is_valid_value(""));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("main@example.com"));
        assert!(is_valid_email("first.last+tag@shop.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn test_validator_collects_every_error() {
        let mut v = Validator::new();
        v.required_text("name", "Name", "   ", 100);
        v.category_value("value", "UPPER");
        v.optional_text("description", "Description", Some(&"x".repeat(501)), 500);

        let err = v.finish().unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "value", "description"]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut v = Validator::new();
        v.required_text("name", "Name", &"é".repeat(100), 100);
        assert!(v.is_empty());

        v.required_text("name", "Name", &"é".repeat(101), 100);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_empty_value_reports_required_once() {
        let mut v = Validator::new();
        v.category_value("value", "");
        let err = v.finish().unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].message, "Value is required");
    }
}
