//! Request field validation.
//!
//! Failures are collected per field and answered with `400` and a
//! `{field: message}` body before any service is called.

use std::collections::BTreeMap;

use validator::ValidateEmail;

use crate::ServerError;

const NAME_LEN: (usize, usize) = (2, 50);
const PASSWORD_LEN: (usize, usize) = (8, 50);

/// Field name to message.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn length(&mut self, field: &'static str, value: &str, (min, max): (usize, usize)) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            self.errors.entry(field).or_insert_with(|| {
                format!("must be between {min} and {max} characters")
            });
        }
        self
    }

    /// Display names: first name, last name, vault and category names.
    pub(crate) fn name(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.insert(field, "is required".to_string());
            return self;
        }
        self.length(field, value, NAME_LEN)
    }

    pub(crate) fn password(&mut self, field: &'static str, value: &str) -> &mut Self {
        self.length(field, value, PASSWORD_LEN)
    }

    pub(crate) fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !value.validate_email() {
            self.errors
                .insert(field, "must be a valid email address".to_string());
        }
        self
    }

    pub(crate) fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.insert(field, "is required".to_string());
        }
        self
    }

    pub(crate) fn check(&mut self, field: &'static str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.insert(field, message.to_string());
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Result<(), ServerError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ServerError::Validation(std::mem::take(&mut self.errors)))
    }
}
