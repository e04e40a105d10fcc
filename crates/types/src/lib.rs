//! Shared type definitions for Front& workflows: field schema, typed form
//! values, workflow definitions, and the derived CSV/result shapes passed
//! between the util, api, and engine crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod field;
pub mod value;
pub mod workflow;

pub use field::validation::{ValidationError, validate_inputs, validate_inputs_with};
pub use field::{FieldKind, FieldSchema, FieldValidation};
pub use value::{FieldValue, FileHandle, FormError, FormValues};
pub use workflow::{OutputKind, OutputSpec, WorkflowDefinition, WorkflowKind};

/// CSV text split into a header row and data rows.
///
/// Rows are not padded; a row may hold fewer cells than there are headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Response of a completed workflow execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    /// Workflow that produced the response.
    pub workflow_id: String,
    /// HTTP status returned by the endpoint.
    pub status: u16,
    /// Raw JSON payload; shape varies per workflow.
    pub body: Value,
    /// Wall-clock duration of the request.
    pub elapsed_ms: u64,
}
