//! Explicit request validation.
//!
//! Every request type implements [`Validate`] by hand and collects all
//! problems into a [`FieldErrors`] list, which is returned to the client as
//! the `details` of a `VALIDATION_ERROR` response.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::error::AppError;

pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(self))
        }
    }

    /// Character count of the trimmed value must fall in `min..=max`.
    pub fn length(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min || len > max {
            if min > 0 && len == 0 {
                self.add(field, "is required");
            } else {
                self.add(field, format!("must be between {min} and {max} characters"));
            }
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) {
        self.length(field, value, 1, 100);
        if !value.trim().is_empty() && !is_email(value.trim()) {
            self.add(field, "must be a valid email address");
        }
    }

    pub fn phone(&mut self, field: &'static str, value: &str) {
        let value = value.trim();
        let digits = value.strip_prefix('+').unwrap_or(value);
        if digits.is_empty() || digits.len() > 20 || !digits.chars().all(|c| c.is_ascii_digit())
        {
            self.add(field, "must contain 1 to 20 digits");
        }
    }

    /// Money amounts: non-negative, at most [`max_price`] and two decimal
    /// places.
    pub fn price(&mut self, field: &'static str, value: Decimal) {
        if value.is_sign_negative() && !value.is_zero() {
            self.add(field, "must not be negative");
        } else if value > max_price() {
            self.add(field, format!("must not exceed {}", max_price()));
        } else if value.normalize().scale() > 2 {
            self.add(field, "must have at most two decimal places");
        }
    }

    pub fn at_least(&mut self, field: &'static str, value: i32, min: i32) {
        if value < min {
            self.add(field, format!("must be at least {min}"));
        }
    }
}

/// Largest price `events.price NUMERIC(12, 2)` holds.
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}
