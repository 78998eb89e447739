//! Field-level checks for JSON bodies and query strings.
//!
//! Bodies are decoded as loose JSON first so every field can be reported at
//! once, keyed by field name, instead of failing on the first bad value.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::{AppError, FieldMap};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_DATETIME: &str = "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Accumulates messages per field; turns into [`AppError::Fields`].
#[derive(Debug, Default)]
pub struct FieldErrors(FieldMap);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_error(self) -> AppError {
        AppError::Fields(self.0)
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

/// A request body must be a JSON object.
pub fn object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        other => {
            let kind = match other {
                Value::Array(_) => "list",
                Value::String(_) => "str",
                Value::Number(_) => "number",
                Value::Bool(_) => "bool",
                _ => "null",
            };
            let mut errors = FieldErrors::new();
            errors.add(
                "non_field_errors",
                format!("Invalid data. Expected a dictionary, but got {kind}."),
            );
            Err(errors.into_error())
        }
    }
}

fn present<'a>(
    errors: &mut FieldErrors,
    body: &'a Map<String, Value>,
    field: &str,
) -> Option<&'a Value> {
    match body.get(field) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(v) => Some(v),
    }
}

/// Required, non-blank string with surrounding whitespace trimmed.
pub fn string(errors: &mut FieldErrors, body: &Map<String, Value>, field: &str) -> Option<String> {
    match present(errors, body, field)? {
        Value::String(s) if s.trim().is_empty() => {
            errors.add(field, NOT_BLANK);
            None
        }
        Value::String(s) => Some(s.trim().to_string()),
        _ => {
            errors.add(field, NOT_A_STRING);
            None
        }
    }
}

/// Required short text: trimmed, at most `max_chars` characters.
pub fn text(
    errors: &mut FieldErrors,
    body: &Map<String, Value>,
    field: &str,
    max_chars: usize,
) -> Option<String> {
    let value = string(errors, body, field)?;
    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        );
        return None;
    }
    Some(value)
}

/// Required email, normalized to trimmed lower case.
pub fn email(errors: &mut FieldErrors, body: &Map<String, Value>, field: &str) -> Option<String> {
    let value = string(errors, body, field)?.to_lowercase();
    if !is_valid_email(&value) {
        errors.add(field, INVALID_EMAIL);
        return None;
    }
    Some(value)
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Required number; numeric strings are accepted too.
pub fn float(errors: &mut FieldErrors, body: &Map<String, Value>, field: &str) -> Option<f64> {
    let parsed = match present(errors, body, field)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_float(s),
        _ => None,
    };
    if parsed.is_none() {
        errors.add(field, INVALID_NUMBER);
    }
    parsed
}

/// Required integer; integral floats and integer strings are accepted too.
pub fn integer(errors: &mut FieldErrors, body: &Map<String, Value>, field: &str) -> Option<i64> {
    let parsed = match present(errors, body, field)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
                .map(|v| v as i64)
        }),
        Value::String(s) => parse_integer(s),
        _ => None,
    };
    if parsed.is_none() {
        errors.add(field, INVALID_INTEGER);
    }
    parsed
}

/// Optional RFC 3339 timestamp. `None` when absent or null.
pub fn optional_datetime(
    errors: &mut FieldErrors,
    body: &Map<String, Value>,
    field: &str,
) -> Option<OffsetDateTime> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match OffsetDateTime::parse(s.trim(), &Rfc3339) {
            Ok(ts) => Some(ts),
            Err(_) => {
                errors.add(field, INVALID_DATETIME);
                None
            }
        },
        Some(_) => {
            errors.add(field, INVALID_DATETIME);
            None
        }
    }
}
