//! Form state for a single workflow screen.
//!
//! [`FormState`] owns the field schema of one workflow and the values
//! collected so far. Every edit goes through [`FormState::on_change`], which
//! rejects unknown field ids and values of the wrong variant, so a `csv`
//! field always holds text and a `file` field always holds a file handle.

use std::path::Path;

use frontand_types::{
    FieldKind, FieldSchema, FieldValue, FormError, FormValues, ParsedCsv, ValidationError, validate_inputs,
};
use frontand_util::csv::parse_csv;
use thiserror::Error;
use tracing::debug;

pub mod controls;
pub mod upload;

pub use controls::{CheckboxOption, CsvPreview, FormControl, InputMode, RenderedField, render_field, render_form};
pub use upload::{CSV_SOFT_LIMIT_BYTES, InputError, file_handle_for, is_csv_file, read_csv_upload};

/// Failure while attaching a file to a field.
#[derive(Debug, Error, PartialEq)]
pub enum AttachError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Schema plus the values collected for it.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: Vec<FieldSchema>,
    values: FormValues,
}

impl FormState {
    /// Start an empty form for `fields`.
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self {
            fields,
            values: FormValues::new(),
        }
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn field(&self, id: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.id == id)
    }

    fn require_field(&self, id: &str) -> Result<&FieldSchema, FormError> {
        self.field(id).ok_or_else(|| FormError::UnknownField { id: id.to_string() })
    }

    /// Store `value` for `field_id`.
    ///
    /// The value must be the variant the field's kind stores; select and
    /// multiselect values must come from the declared options.
    pub fn on_change(&mut self, field_id: &str, value: FieldValue) -> Result<(), FormError> {
        let field = self.require_field(field_id)?;
        if !field.kind.accepts(&value) {
            return Err(FormError::TypeMismatch {
                id: field_id.to_string(),
                expected: field.kind.expected_value(),
                found: value.variant_name(),
            });
        }
        match (&field.kind, &value) {
            (FieldKind::Select, FieldValue::Text(choice)) if !choice.is_empty() => field.ensure_option(choice)?,
            (FieldKind::Multiselect, FieldValue::Choices(choices)) => {
                for choice in choices {
                    field.ensure_option(choice)?;
                }
            }
            _ => {}
        }

        debug!(field = field_id, kind = field.kind.as_str(), "form value changed");
        self.values.insert(field_id, value);
        Ok(())
    }

    /// Parse `raw` according to the field's kind and store the result.
    pub fn set_raw(&mut self, field_id: &str, raw: &str) -> Result<(), FormError> {
        let value = self.require_field(field_id)?.parse_raw(raw)?;
        self.on_change(field_id, value)
    }

    /// Flip membership of `option` in a multiselect field.
    ///
    /// Returns whether the option is selected afterwards.
    pub fn toggle_option(&mut self, field_id: &str, option: &str) -> Result<bool, FormError> {
        let field = self.require_field(field_id)?;
        if field.kind != FieldKind::Multiselect {
            return Err(FormError::TypeMismatch {
                id: field_id.to_string(),
                expected: field.kind.expected_value(),
                found: "choices",
            });
        }
        field.ensure_option(option)?;

        let mut choices = match self.values.get(field_id) {
            Some(FieldValue::Choices(choices)) => choices.clone(),
            _ => Vec::new(),
        };
        let selected = if let Some(position) = choices.iter().position(|choice| choice == option) {
            choices.remove(position);
            false
        } else {
            choices.push(option.to_string());
            true
        };
        self.values.insert(field_id, FieldValue::Choices(choices));
        Ok(selected)
    }

    /// Remove the value stored for `field_id`.
    pub fn clear(&mut self, field_id: &str) -> Option<FieldValue> {
        self.values.remove(field_id)
    }

    /// Load a `.csv` file into a csv field.
    ///
    /// The stored value is cleared before the file is checked and read, so a
    /// failed upload leaves the field empty.
    pub async fn attach_csv_file(&mut self, field_id: &str, path: &Path) -> Result<(), AttachError> {
        let field = self.require_field(field_id)?;
        if field.kind != FieldKind::Csv {
            return Err(FormError::TypeMismatch {
                id: field_id.to_string(),
                expected: field.kind.expected_value(),
                found: "file",
            }
            .into());
        }

        self.clear(field_id);
        let handle = file_handle_for(path).await?;
        let text = read_csv_upload(&handle).await?;
        self.on_change(field_id, FieldValue::Text(text))?;
        Ok(())
    }

    /// Store a file handle for a `file` or `image` field without reading it.
    pub async fn attach_file(&mut self, field_id: &str, path: &Path) -> Result<(), AttachError> {
        let field = self.require_field(field_id)?;
        if !field.kind.is_file_backed() {
            return Err(FormError::TypeMismatch {
                id: field_id.to_string(),
                expected: field.kind.expected_value(),
                found: "file",
            }
            .into());
        }
        let handle = file_handle_for(path).await?;
        self.on_change(field_id, FieldValue::File(handle))?;
        Ok(())
    }

    /// CSV parsed from the current value of `field_id`, recomputed on every call.
    pub fn parsed_csv(&self, field_id: &str) -> Option<ParsedCsv> {
        self.values.text(field_id).and_then(parse_csv)
    }

    pub fn render(&self) -> Vec<RenderedField> {
        render_form(&self.fields, &self.values)
    }

    /// First validation failure in schema order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_inputs(&self.fields, &self.values)
    }

    /// Hand the collected values over, consuming the form.
    pub fn into_values(self) -> FormValues {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn batch_form() -> FormState {
        FormState::new(vec![
            FieldSchema::new("csv_data", "CSV Data", FieldKind::Csv).required(),
            FieldSchema::new("prompt", "Prompt", FieldKind::Textarea).required(),
            FieldSchema::new("model", "Model", FieldKind::Select).with_options(["fast", "accurate"]),
            FieldSchema::new("langs", "Languages", FieldKind::Multiselect).with_options(["de", "en", "fr"]),
            FieldSchema::new("logo", "Logo", FieldKind::Image),
        ])
    }

    #[test]
    fn rejects_unknown_fields_and_wrong_variants() {
        let mut form = batch_form();

        assert_eq!(
            form.on_change("missing", FieldValue::Text("x".into())),
            Err(FormError::UnknownField { id: "missing".into() })
        );
        assert_eq!(
            form.on_change("csv_data", FieldValue::Number(3.0)),
            Err(FormError::TypeMismatch {
                id: "csv_data".into(),
                expected: "text",
                found: "number",
            })
        );
        assert!(form.values().is_empty());
    }

    #[test]
    fn select_values_must_be_declared_options() {
        let mut form = batch_form();
        assert!(form.set_raw("model", "fast").is_ok());
        assert!(matches!(
            form.on_change("model", FieldValue::Text("turbo".into())),
            Err(FormError::NotAnOption { .. })
        ));
        assert_eq!(form.values().text("model"), Some("fast"));
    }

    #[test]
    fn toggle_option_flips_membership() {
        let mut form = batch_form();

        assert_eq!(form.toggle_option("langs", "en"), Ok(true));
        assert_eq!(form.toggle_option("langs", "de"), Ok(true));
        assert_eq!(form.toggle_option("langs", "en"), Ok(false));
        assert_eq!(form.values().get("langs"), Some(&FieldValue::Choices(vec!["de".into()])));

        assert!(form.toggle_option("prompt", "en").is_err());
        assert!(form.toggle_option("langs", "it").is_err());
    }

    #[test]
    fn parsed_csv_tracks_current_value() {
        let mut form = batch_form();
        assert!(form.parsed_csv("csv_data").is_none());

        form.set_raw("csv_data", "name\nAcme").unwrap();
        assert_eq!(form.parsed_csv("csv_data").map(|csv| csv.rows.len()), Some(1));

        form.set_raw("csv_data", "name\nAcme\nGlobex").unwrap();
        assert_eq!(form.parsed_csv("csv_data").map(|csv| csv.rows.len()), Some(2));
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut form = batch_form();
        let error = form.validate().unwrap_err();
        assert_eq!(error.message, "CSV Data is required");

        form.set_raw("csv_data", "name\nAcme").unwrap();
        form.set_raw("prompt", "   ").unwrap();
        assert_eq!(form.validate().unwrap_err().message, "Prompt is required");
    }

    #[tokio::test]
    async fn csv_upload_stores_file_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        fs::write(&path, "company\nAcme\n").unwrap();

        let mut form = batch_form();
        form.attach_csv_file("csv_data", &path).await.unwrap();

        assert_eq!(form.values().text("csv_data"), Some("company\nAcme\n"));
    }

    #[tokio::test]
    async fn failed_csv_upload_clears_previous_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leads.txt");
        fs::write(&path, "company\nAcme\n").unwrap();

        let mut form = batch_form();
        form.set_raw("csv_data", "old\nvalue").unwrap();

        let error = form.attach_csv_file("csv_data", &path).await.unwrap_err();
        assert_eq!(error, AttachError::Input(InputError::NotCsv));
        assert_eq!(error.to_string(), "Please upload a CSV file");
        assert!(form.values().get("csv_data").is_none());
    }

    #[tokio::test]
    async fn image_fields_store_the_handle_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, [0_u8; 16]).unwrap();

        let mut form = batch_form();
        form.attach_file("logo", &path).await.unwrap();

        let Some(FieldValue::File(handle)) = form.values().get("logo") else {
            panic!("expected a file value");
        };
        assert_eq!(handle.name, "logo.png");
        assert_eq!(handle.size, 16);
        assert!(form.attach_file("prompt", &path).await.is_err());
    }
}
