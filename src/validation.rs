use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

pub static STUDENT_ID_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{4}$").expect("student id pattern is valid"));

pub const GENDERS: [&str; 3] = ["M", "F", "Others"];

pub fn validate_student_id(value: &str) -> Result<(), ValidationError> {
    if STUDENT_ID_FORMAT.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("student_id")
            .with_message(Cow::from("Student ID must use the format YYYY-NNNN")))
    }
}

pub fn validate_gender(value: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("gender")
            .with_message(Cow::from("Gender must be one of M, F, Others")))
    }
}

/// Trims an optional request field, treating blank input as absent.
pub fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Returns every field, trimmed, or names the first one that is missing.
pub fn require_all<const N: usize>(
    fields: [(&str, &Option<String>); N],
) -> Result<[String; N], AppError> {
    let mut missing = Vec::new();
    let values = fields.map(|(name, value)| match present(value) {
        Some(v) => v,
        None => {
            missing.push(name.to_string());
            String::new()
        }
    });

    if missing.is_empty() {
        Ok(values)
    } else {
        Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Year levels arrive as JSON numbers from some clients and strings from others.
pub fn parse_year_level(value: &Option<Value>) -> Result<Option<i64>, AppError> {
    let invalid = || AppError::Validation("Year level must be an integer between 1 and 5".into());

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Runs the derived rules and reports the first failure in declaration order.
pub fn validate_in_order<T: Validate>(value: &T, order: &[&str]) -> Result<(), AppError> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(first_error(&errors, order)),
    }
}

fn first_error(errors: &ValidationErrors, order: &[&str]) -> AppError {
    let field_errors = errors.field_errors();

    for field in order {
        if let Some(error) = field_errors.get(*field).and_then(|errs| errs.first()) {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", field));
            return AppError::Validation(message);
        }
    }

    AppError::Validation("Invalid request".to_string())
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        first_error(&errors, &[])
    }
}
