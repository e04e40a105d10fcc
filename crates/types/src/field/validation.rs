//! Fail-fast validation of collected form values against a field schema.
//!
//! Fields are visited in schema order and the first failure wins; errors are
//! never accumulated. A required field with a missing or blank value fails
//! with `"<label> is required"`. Present values are then checked against the
//! field's declarative [`FieldValidation`] rules and, when supplied, a
//! caller-provided validator.

use regex::Regex;
use thiserror::Error;

use super::{FieldSchema, FieldValidation};
use crate::value::{FieldValue, FormValues};

/// First validation failure found for a form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Field that failed.
    pub field_id: String,
    /// User-facing message.
    pub message: String,
}

impl ValidationError {
    pub fn new(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            message: message.into(),
        }
    }
}

/// Validate `values` against `fields`, returning the first error in schema order.
pub fn validate_inputs(fields: &[FieldSchema], values: &FormValues) -> Result<(), ValidationError> {
    validate_inputs_with(fields, values, |_, _| None)
}

/// Like [`validate_inputs`], additionally running `custom` on every present value.
///
/// `custom` runs after the declarative rules of the same field and returns the
/// error message when the value is rejected.
pub fn validate_inputs_with<F>(fields: &[FieldSchema], values: &FormValues, custom: F) -> Result<(), ValidationError>
where
    F: Fn(&FieldSchema, &FieldValue) -> Option<String>,
{
    for field in fields {
        let value = values.get(&field.id).filter(|value| !value.is_empty());
        let Some(value) = value else {
            if field.required {
                return Err(ValidationError::new(&field.id, format!("{} is required", field.label)));
            }
            continue;
        };

        if let Some(rules) = &field.validation
            && let Err(message) = check_rules(value, rules)
        {
            let message = rules.message.clone().unwrap_or(message);
            return Err(ValidationError::new(&field.id, message));
        }

        if let Some(message) = custom(field, value) {
            return Err(ValidationError::new(&field.id, message));
        }
    }
    Ok(())
}

/// Check a single present value against declarative rules.
///
/// Text rules (pattern and length) apply to text values, bounds apply to
/// numbers. Rules that do not fit the value's variant are ignored.
pub fn check_rules(value: &FieldValue, rules: &FieldValidation) -> Result<(), String> {
    match value {
        FieldValue::Text(text) => {
            let length = text.chars().count();
            if let Some(min_length) = rules.min_length
                && length < min_length
            {
                return Err(format!("value must be at least {} characters", min_length));
            }
            if let Some(max_length) = rules.max_length
                && length > max_length
            {
                return Err(format!("value must be at most {} characters", max_length));
            }
            if let Some(pattern) = &rules.pattern {
                let regex = Regex::new(pattern).map_err(|error| format!("invalid pattern '{}': {}", pattern, error))?;
                if !regex.is_match(text) {
                    return Err(format!("value must match the pattern {}", pattern));
                }
            }
            Ok(())
        }
        FieldValue::Number(number) => {
            if let Some(min) = rules.min
                && *number < min
            {
                return Err(format!("value must be at least {}", min));
            }
            if let Some(max) = rules.max
                && *number > max
            {
                return Err(format!("value must be at most {}", max));
            }
            Ok(())
        }
        FieldValue::Choices(_) | FieldValue::File(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldKind;

    fn prompt_field() -> FieldSchema {
        FieldSchema::new("prompt", "Prompt", FieldKind::Textarea).required()
    }

    fn email_field() -> FieldSchema {
        FieldSchema::new("email", "Email", FieldKind::Text).with_validation(FieldValidation {
            pattern: Some("^[^@]+@[^@]+$".into()),
            ..Default::default()
        })
    }

    #[test]
    fn empty_required_field_reports_label() {
        let mut values = FormValues::new();
        values.insert("prompt", FieldValue::Text(String::new()));

        let error = validate_inputs(&[prompt_field()], &values).unwrap_err();
        assert_eq!(error.to_string(), "Prompt is required");
        assert_eq!(error.field_id, "prompt");
    }

    #[test]
    fn absent_and_blank_required_values_fail() {
        let values = FormValues::new();
        assert!(validate_inputs(&[prompt_field()], &values).is_err());

        let mut values = FormValues::new();
        values.insert("prompt", FieldValue::Text(" \n\t".into()));
        assert!(validate_inputs(&[prompt_field()], &values).is_err());
    }

    #[test]
    fn first_failure_in_schema_order_wins() {
        let fields = vec![email_field(), prompt_field()];
        let mut values = FormValues::new();
        values.insert("prompt", FieldValue::Text(String::new()));
        values.insert("email", FieldValue::Text("not-an-email".into()));

        let error = validate_inputs(&fields, &values).unwrap_err();
        assert_eq!(error.field_id, "email");
        assert_eq!(error.message, "value must match the pattern ^[^@]+@[^@]+$");
    }

    #[test]
    fn optional_empty_field_skips_rules() {
        let mut values = FormValues::new();
        values.insert("email", FieldValue::Text(String::new()));
        assert!(validate_inputs(&[email_field()], &values).is_ok());
    }

    #[test]
    fn message_override_replaces_rule_message() {
        let field = FieldSchema::new("count", "Count", FieldKind::Number).with_validation(FieldValidation {
            max: Some(100.0),
            message: Some("At most 100 rows per run".into()),
            ..Default::default()
        });
        let mut values = FormValues::new();
        values.insert("count", FieldValue::Number(250.0));

        let error = validate_inputs(&[field], &values).unwrap_err();
        assert_eq!(error.message, "At most 100 rows per run");
    }

    #[test]
    fn custom_validator_runs_after_rules() {
        let fields = vec![prompt_field()];
        let mut values = FormValues::new();
        values.insert("prompt", FieldValue::Text("shout".into()));

        let error = validate_inputs_with(&fields, &values, |field, value| {
            (field.id == "prompt" && value.as_text() == Some("shout")).then(|| "Prompt is too short".to_string())
        })
        .unwrap_err();
        assert_eq!(error.message, "Prompt is too short");
    }

    #[test]
    fn invalid_pattern_is_reported_as_error() {
        let rules = FieldValidation {
            pattern: Some("([".into()),
            ..Default::default()
        };
        let result = check_rules(&FieldValue::Text("anything".into()), &rules);
        assert!(result.unwrap_err().starts_with("invalid pattern"));
    }
}
