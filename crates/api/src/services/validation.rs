//! Field-level input validation.
//!
//! Collects every failing field before giving up, so a client sees all of its
//! mistakes in one `{"field": "message"}` response.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use store_core::{Email, Price, PriceError};

/// Maximum length for free-text columns.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 25;

/// Map from field name (as the client spelled it) to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// An empty set of errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single failing field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a failure. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_insert_with(|| message.into());
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if any field failed.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Require non-blank text no longer than [`MAX_TEXT_LENGTH`]. Returns the
/// trimmed value.
pub fn required_text(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{label} is required."));
    } else if trimmed.chars().count() > MAX_TEXT_LENGTH {
        errors.add(
            field,
            format!("{label} must be at most {MAX_TEXT_LENGTH} characters."),
        );
    }
    trimmed.to_owned()
}

/// Parse an email, recording a failure under `field`.
pub fn email(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<Email> {
    match Email::parse(value) {
        Ok(email) => Some(email),
        Err(_) if value.trim().is_empty() => {
            errors.add(field, "Email is required.");
            None
        }
        Err(_) => {
            errors.add(field, "Email must be valid.");
            None
        }
    }
}

/// Check a plaintext password against the length policy.
pub fn password(errors: &mut ValidationErrors, field: &str, value: &str) {
    let length = value.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        errors.add(
            field,
            format!(
                "Password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters long."
            ),
        );
    }
}

/// Validate a price amount.
pub fn price(errors: &mut ValidationErrors, field: &str, value: Decimal) -> Option<Price> {
    match Price::new(value) {
        Ok(price) => Some(price),
        Err(err) => {
            let message = match err {
                PriceError::Negative => "Price must be zero or greater.".to_owned(),
                PriceError::TooPrecise { max } => {
                    format!("Price can have at most {max} decimal places.")
                }
                PriceError::TooLarge { max } => format!("Price must be less than {max}."),
            };
            errors.add(field, message);
            None
        }
    }
}

/// Normalise optional free text: blank becomes `None`.
pub fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: Option<&str>,
) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|text| !text.is_empty())?;
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        errors.add(
            field,
            format!("{label} must be at most {MAX_TEXT_LENGTH} characters."),
        );
    }
    Some(trimmed.to_owned())
}
