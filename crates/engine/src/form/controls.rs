//! View models for workflow input controls.
//!
//! [`render_form`] maps each [`FieldSchema`] and its current value onto the
//! control a front end should draw. Derived state (the CSV preview) is
//! recomputed on every call rather than stored.

use frontand_types::{FieldKind, FieldSchema, FieldValue, FormValues};
use frontand_util::csv::parse_csv;
use serde::Serialize;

/// Native input mode hint for single-line controls.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Text,
    Url,
    Numeric,
}

/// Summary of the CSV currently held by a csv control.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// One entry of a checkbox list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckboxOption {
    pub label: String,
    pub checked: bool,
}

/// Control drawn for a field.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum FormControl {
    SingleLine {
        input_mode: InputMode,
        value: String,
    },
    MultiLine {
        value: String,
    },
    FilePicker {
        accept: &'static str,
        selected: Option<String>,
    },
    /// Paste area plus drop/browse zone for `.csv` uploads.
    CsvInput {
        text: String,
        accept: &'static str,
        preview: Option<CsvPreview>,
    },
    Dropdown {
        options: Vec<String>,
        selected: Option<String>,
    },
    CheckboxList {
        options: Vec<CheckboxOption>,
    },
}

/// Field metadata plus its control.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderedField {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub control: FormControl,
}

/// Render one control per field, in schema order.
pub fn render_form(fields: &[FieldSchema], values: &FormValues) -> Vec<RenderedField> {
    fields.iter().map(|field| render_field(field, values.get(&field.id))).collect()
}

pub fn render_field(field: &FieldSchema, value: Option<&FieldValue>) -> RenderedField {
    let text = value.and_then(FieldValue::as_text).unwrap_or_default().to_string();
    let control = match field.kind {
        FieldKind::Text => FormControl::SingleLine {
            input_mode: InputMode::Text,
            value: text,
        },
        FieldKind::Url => FormControl::SingleLine {
            input_mode: InputMode::Url,
            value: text,
        },
        FieldKind::Number => FormControl::SingleLine {
            input_mode: InputMode::Numeric,
            value: match value {
                Some(FieldValue::Number(number)) => number.to_string(),
                _ => String::new(),
            },
        },
        FieldKind::Textarea => FormControl::MultiLine { value: text },
        FieldKind::File | FieldKind::Image => FormControl::FilePicker {
            accept: if field.kind == FieldKind::Image { "image/*" } else { "*/*" },
            selected: match value {
                Some(FieldValue::File(handle)) => Some(handle.name.clone()),
                _ => None,
            },
        },
        FieldKind::Csv => {
            let preview = parse_csv(&text).map(|parsed| CsvPreview {
                headers: parsed.headers,
                row_count: parsed.rows.len(),
            });
            FormControl::CsvInput {
                text,
                accept: ".csv,text/csv",
                preview,
            }
        }
        FieldKind::Select => FormControl::Dropdown {
            options: field.options.clone(),
            selected: value.and_then(FieldValue::as_text).map(str::to_string),
        },
        FieldKind::Multiselect => {
            let chosen: &[String] = match value {
                Some(FieldValue::Choices(choices)) => choices,
                _ => &[],
            };
            FormControl::CheckboxList {
                options: field
                    .options
                    .iter()
                    .map(|option| CheckboxOption {
                        label: option.clone(),
                        checked: chosen.contains(option),
                    })
                    .collect(),
            }
        }
    };

    RenderedField {
        id: field.id.clone(),
        label: field.label.clone(),
        required: field.required,
        placeholder: field.placeholder.clone(),
        help_text: field.help_text.clone(),
        control,
    }
}
