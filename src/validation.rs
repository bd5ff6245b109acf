//! Input rules for category payloads.
//!
//! The rules themselves are declared on the DTOs with `validator`; the functions here
//! flatten the outcome into the ordered list of messages reported in an envelope's
//! `errors`. An empty list means the payload is valid.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{CategoryCreateDto, CategoryUpdateDto};

/// Rules for `POST /api/category`: the name must not be blank.
pub fn validate_create(dto: &CategoryCreateDto) -> Vec<String> {
    violations(dto)
}

/// Rules for `PUT /api/category`: the id must be present and greater than zero, and the
/// name must not be blank. Every failed rule is reported, so a missing id yields two
/// messages.
pub fn validate_update(dto: &CategoryUpdateDto) -> Vec<String> {
    let mut errors = match dto.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    for error in id_violations(dto.id) {
        errors.add("id", error);
    }
    messages(&errors)
}

fn id_violations(id: i32) -> Vec<ValidationError> {
    let mut violations = Vec::new();
    if id == 0 {
        violations.push(rule_error("not_empty", "'Id' must not be empty."));
    }
    if id <= 0 {
        violations.push(rule_error("greater_than", "'Id' must be greater than '0'."));
    }
    violations
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

fn violations<T: Validate>(value: &T) -> Vec<String> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => messages(&errors),
    }
}

/// One message per failed rule, ordered by field name.
///
/// Rules declared without a message fall back to `'<field>' is invalid (<code>).`
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().copied().collect();
    fields.sort_unstable();

    let mut messages = Vec::new();
    for field in fields {
        let Some(errors) = field_errors.get(field) else {
            continue;
        };
        for error in errors.iter() {
            messages.push(match &error.message {
                Some(message) => message.to_string(),
                None => format!("'{}' is invalid ({}).", field, error.code),
            });
        }
    }
    messages
}
