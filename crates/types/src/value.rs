//! Typed form values collected for a workflow run.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number, Value};
use thiserror::Error;

/// Handle to a file picked for a `file`, `image`, or `csv` upload.
///
/// The handle is stored verbatim; contents are only read when a consumer asks
/// for them (for example the CSV upload path).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileHandle {
    /// Location on disk.
    pub path: PathBuf,
    /// File name as shown to the user.
    pub name: String,
    /// MIME type when known.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Size in bytes.
    pub size: u64,
}

impl FileHandle {
    /// Build a handle from a path and known size, guessing the content type from the extension.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = guess_content_type(&name).map(str::to_string);
        Self {
            path,
            name,
            content_type,
            size,
        }
    }
}

fn guess_content_type(name: &str) -> Option<&'static str> {
    let extension = name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "csv" => Some("text/csv"),
        "txt" => Some("text/plain"),
        "json" => Some("application/json"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Value held by a single form field.
///
/// Each [`crate::FieldKind`] stores exactly one of these variants, which
/// [`crate::FieldKind::accepts`] enforces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Choices(Vec<String>),
    File(FileHandle),
}

impl FieldValue {
    /// Returns true when the value counts as "not provided" for required checks.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Choices(choices) => choices.is_empty(),
            Self::Number(_) | Self::File(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Choices(_) => "choices",
            Self::File(_) => "file",
        }
    }

    /// JSON representation sent to workflow backends.
    ///
    /// Files are described by their metadata; contents are never inlined.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(number) => Number::from_f64(*number).map(Value::Number).unwrap_or(Value::Null),
            Self::Choices(choices) => Value::Array(choices.iter().cloned().map(Value::String).collect()),
            Self::File(handle) => {
                let mut map = JsonMap::new();
                map.insert("name".into(), Value::String(handle.name.clone()));
                map.insert("size".into(), Value::from(handle.size));
                map.insert(
                    "content_type".into(),
                    handle.content_type.clone().map(Value::String).unwrap_or(Value::Null),
                );
                Value::Object(map)
            }
        }
    }
}

/// Ordered mapping from field id to its current value.
///
/// Created empty when a workflow screen opens and discarded afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FormValues {
    values: IndexMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id)
    }

    /// Text stored under `id`, if the field holds text.
    pub fn text(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(FieldValue::as_text)
    }

    /// Store a value, returning the previous one. Kind checks are the caller's job.
    pub fn insert(&mut self, id: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(id.into(), value)
    }

    pub fn remove(&mut self, id: &str) -> Option<FieldValue> {
        self.values.shift_remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize every value into a JSON object, preserving insertion order.
    pub fn to_json_map(&self) -> JsonMap<String, Value> {
        self.values.iter().map(|(id, value)| (id.clone(), value.to_json())).collect()
    }
}

/// Errors raised while mutating form state.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Unknown field: {id}")]
    UnknownField { id: String },

    #[error("Field '{id}' expects a {expected} value, got {found}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{value}' is not an option for field '{id}'")]
    NotAnOption { id: String, value: String },

    #[error("Field '{id}' expects a number, got '{raw}'")]
    InvalidNumber { id: String, raw: String },

    #[error("Field '{id}' is a {kind} field and cannot be set from text")]
    UnsupportedRawValue { id: String, kind: &'static str },
}
