//! Workflow definitions as loaded from the built-in catalog or a user catalog file.
//!
//! A workflow couples an endpoint with the fields its screen renders, the
//! [`WorkflowKind`] that decides how collected values become a request body,
//! and the [`OutputSpec`] that decides how the response is displayed.

use serde::{Deserialize, Serialize};

use crate::field::FieldSchema;

/// Fully described workflow ready to be rendered and executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDefinition {
    /// Canonical identifier (for example, `loop-over-rows`).
    pub id: String,
    /// Title shown in listings.
    #[serde(default)]
    pub title: Option<String>,
    /// Descriptive copy shown in detail views.
    #[serde(default)]
    pub description: Option<String>,
    /// Remote endpoint receiving the shaped request body.
    pub endpoint: String,
    /// Request shaping strategy.
    #[serde(default)]
    pub kind: WorkflowKind,
    /// Output rendering settings.
    #[serde(default)]
    pub output: OutputSpec,
    /// Input fields in display order.
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl WorkflowDefinition {
    pub fn field(&self, id: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Title when present, otherwise the identifier.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Closed set of request shaping strategies.
///
/// Each variant names the fields it reads so new workflows can reuse a
/// strategy without touching shared code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowKind {
    /// Every CSV row is processed with a prompt, keyed as `row_<n>`.
    BatchRows {
        #[serde(default = "default_csv_field")]
        csv_field: String,
        #[serde(default = "default_prompt_field")]
        prompt_field: String,
    },
    /// A list of website URLs is crawled.
    SiteCrawl {
        #[serde(default = "default_urls_field")]
        urls_field: String,
    },
    /// Keywords are scored for relevance against a company website.
    KeywordKombat {
        #[serde(default = "default_keywords_field")]
        keywords_field: String,
        #[serde(default = "default_company_url_field")]
        company_url_field: String,
    },
    /// All form values are sent as-is.
    #[default]
    Passthrough,
}

impl WorkflowKind {
    /// Stable name used as the shaper lookup key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BatchRows { .. } => "batch_rows",
            Self::SiteCrawl { .. } => "site_crawl",
            Self::KeywordKombat { .. } => "keyword_kombat",
            Self::Passthrough => "passthrough",
        }
    }
}

fn default_csv_field() -> String {
    "csv_data".into()
}

fn default_prompt_field() -> String {
    "prompt".into()
}

fn default_urls_field() -> String {
    "urls".into()
}

fn default_keywords_field() -> String {
    "keywords".into()
}

fn default_company_url_field() -> String {
    "company_url".into()
}

/// How a workflow response is displayed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    #[default]
    Table,
    Json,
    Text,
    Image,
}

/// Output settings for a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OutputSpec {
    #[serde(rename = "type", default)]
    pub kind: OutputKind,
    /// Title of the result view, also used for export file names.
    #[serde(default)]
    pub title: Option<String>,
    /// Column holding the model output when the response does not name one.
    #[serde(default)]
    pub output_column: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldKind;

    #[test]
    fn deserializes_batch_rows_workflow_with_default_fields() {
        let yaml_text = r#"
id: loop-over-rows
title: Loop Over Rows
endpoint: https://example.modal.run/process
kind:
  type: batch_rows
output:
  type: table
  output_column: ai_output
fields:
  - id: csv_data
    label: CSV Data
    type: csv
    required: true
"#;
        let workflow: WorkflowDefinition = serde_yaml::from_str(yaml_text).expect("deserialize workflow");
        assert_eq!(
            workflow.kind,
            WorkflowKind::BatchRows {
                csv_field: "csv_data".into(),
                prompt_field: "prompt".into(),
            }
        );
        assert_eq!(workflow.output.kind, OutputKind::Table);
        assert_eq!(workflow.field("csv_data").map(|field| field.kind), Some(FieldKind::Csv));
    }

    #[test]
    fn missing_kind_defaults_to_passthrough() {
        let yaml_text = "id: echo\nendpoint: http://localhost:8000/echo\n";
        let workflow: WorkflowDefinition = serde_yaml::from_str(yaml_text).expect("deserialize workflow");
        assert_eq!(workflow.kind, WorkflowKind::Passthrough);
        assert_eq!(workflow.display_title(), "echo");
        assert_eq!(workflow.output.kind, OutputKind::Table);
    }
}
