//! Declarative field schema describing a workflow's inputs.
//!
//! A workflow screen is rendered entirely from a list of [`FieldSchema`]
//! entries. The schema is defined when the workflow is configured and is never
//! mutated afterwards; runtime state lives in [`crate::FormValues`].

use serde::{Deserialize, Serialize};

use crate::value::{FieldValue, FormError};

pub mod validation;

/// Closed set of input kinds a workflow can ask for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line free text.
    #[default]
    Text,
    /// Multi-line free text.
    Textarea,
    /// Single-line text expected to hold a URL.
    Url,
    /// Arbitrary file chosen from disk.
    File,
    /// Raw CSV text, either pasted or loaded from an uploaded `.csv` file.
    Csv,
    /// Image file chosen from disk.
    Image,
    /// Numeric input.
    Number,
    /// One value out of `options`.
    Select,
    /// Any subset of `options`.
    Multiselect,
}

impl FieldKind {
    /// Returns true when `value` is the variant this kind stores.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (
                Self::Text | Self::Textarea | Self::Url | Self::Csv | Self::Select,
                FieldValue::Text(_)
            ) | (Self::Number, FieldValue::Number(_))
                | (Self::Multiselect, FieldValue::Choices(_))
                | (Self::File | Self::Image, FieldValue::File(_))
        )
    }

    /// Name of the value variant this kind stores, used in error messages.
    pub fn expected_value(&self) -> &'static str {
        match self {
            Self::Text | Self::Textarea | Self::Url | Self::Csv | Self::Select => "text",
            Self::Number => "number",
            Self::Multiselect => "choices",
            Self::File | Self::Image => "file",
        }
    }

    /// Returns true for kinds whose value is picked from disk rather than typed.
    pub fn is_file_backed(&self) -> bool {
        matches!(self, Self::File | Self::Image)
    }

    /// Canonical lowercase name (matches the serialized form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Url => "url",
            Self::File => "file",
            Self::Csv => "csv",
            Self::Image => "image",
            Self::Number => "number",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
        }
    }
}

/// Declarative validation rules attached to a field.
///
/// Rules only apply to values that are present; emptiness is handled by the
/// `required` flag on [`FieldSchema`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldValidation {
    /// Regular expression text values must match.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Minimum length in characters for text values.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length in characters for text values.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Inclusive lower bound for numeric values.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric values.
    #[serde(default)]
    pub max: Option<f64>,
    /// Message reported instead of the rule-specific one when any rule fails.
    #[serde(default)]
    pub message: Option<String>,
}

/// Describes a single workflow input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    /// Identifier, unique within a workflow.
    pub id: String,
    /// Human readable label, also used in validation messages.
    pub label: String,
    /// Input kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Whether an empty value blocks submission.
    #[serde(default)]
    pub required: bool,
    /// Placeholder text shown while the control is empty.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Options for `select` and `multiselect` fields.
    #[serde(default)]
    pub options: Vec<String>,
    /// Declarative validation rules.
    #[serde(default)]
    pub validation: Option<FieldValidation>,
    /// Help copy rendered under the control.
    #[serde(default)]
    pub help_text: Option<String>,
}

impl FieldSchema {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            options: Vec::new(),
            validation: None,
            help_text: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Convert raw command-line text into the value variant this field stores.
    ///
    /// - text-like kinds keep the text verbatim
    /// - `number` parses a float
    /// - `select` requires one of `options` when options are declared
    /// - `multiselect` splits on commas and requires each entry to be an option
    /// - file-backed kinds cannot be built from text
    pub fn parse_raw(&self, raw: &str) -> Result<FieldValue, FormError> {
        match self.kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Url | FieldKind::Csv => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(FieldValue::Number)
                .ok_or_else(|| FormError::InvalidNumber {
                    id: self.id.clone(),
                    raw: raw.to_string(),
                }),
            FieldKind::Select => {
                let choice = raw.trim();
                self.ensure_option(choice)?;
                Ok(FieldValue::Text(choice.to_string()))
            }
            FieldKind::Multiselect => {
                let mut choices = Vec::new();
                for choice in raw.split(',').map(str::trim).filter(|choice| !choice.is_empty()) {
                    self.ensure_option(choice)?;
                    if !choices.iter().any(|existing| existing == choice) {
                        choices.push(choice.to_string());
                    }
                }
                Ok(FieldValue::Choices(choices))
            }
            FieldKind::File | FieldKind::Image => Err(FormError::UnsupportedRawValue {
                id: self.id.clone(),
                kind: self.kind.as_str(),
            }),
        }
    }

    /// Fails when `choice` is not among the declared options.
    ///
    /// Fields without options accept anything.
    pub fn ensure_option(&self, choice: &str) -> Result<(), FormError> {
        if self.options.is_empty() || self.options.iter().any(|option| option == choice) {
            return Ok(());
        }
        Err(FormError::NotAnOption {
            id: self.id.clone(),
            value: choice.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_accept_only_their_variant() {
        assert!(FieldKind::Csv.accepts(&FieldValue::Text("a,b".into())));
        assert!(!FieldKind::Csv.accepts(&FieldValue::Number(1.0)));
        assert!(FieldKind::Multiselect.accepts(&FieldValue::Choices(vec![])));
        assert!(!FieldKind::Multiselect.accepts(&FieldValue::Text("x".into())));
        assert!(!FieldKind::File.accepts(&FieldValue::Text("/tmp/a.txt".into())));
    }

    #[test]
    fn parse_raw_number_rejects_garbage() {
        let field = FieldSchema::new("count", "Count", FieldKind::Number);
        assert_eq!(field.parse_raw(" 42 ").unwrap(), FieldValue::Number(42.0));
        assert!(matches!(field.parse_raw("forty"), Err(FormError::InvalidNumber { .. })));
    }

    #[test]
    fn parse_raw_number_rejects_non_finite() {
        let field = FieldSchema::new("count", "Count", FieldKind::Number);
        for raw in ["NaN", "inf", "-infinity"] {
            assert!(
                matches!(field.parse_raw(raw), Err(FormError::InvalidNumber { .. })),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn parse_raw_multiselect_checks_options_and_dedupes() {
        let field = FieldSchema::new("langs", "Languages", FieldKind::Multiselect).with_options(["de", "en", "fr"]);
        assert_eq!(
            field.parse_raw("de, en,de").unwrap(),
            FieldValue::Choices(vec!["de".into(), "en".into()])
        );
        assert!(matches!(field.parse_raw("de,es"), Err(FormError::NotAnOption { .. })));
    }

    #[test]
    fn schema_deserializes_from_yaml() {
        let yaml_text = r#"
id: prompt
label: Prompt
type: textarea
required: true
help_text: Describe what to do with each row
validation:
  min_length: 5
"#;
        let field: FieldSchema = serde_yaml::from_str(yaml_text).expect("deserialize field");
        assert_eq!(field.kind, FieldKind::Textarea);
        assert!(field.required);
        assert_eq!(field.validation.and_then(|rules| rules.min_length), Some(5));
    }
}
