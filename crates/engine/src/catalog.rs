//! Workflow catalog: the built-in workflows plus an optional user catalog.
//!
//! Catalog files are YAML documents with a top-level `workflows` list. A user
//! catalog replaces built-in workflows with the same id and appends new ones.
//! Endpoint overrides from the configuration are applied last.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use frontand_types::{WorkflowDefinition, WorkflowKind};
use frontand_util::config::FrontandConfig;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const BUILTIN_CATALOG: &str = include_str!("../workflows/builtin.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse workflow catalog {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("workflow in {origin} has an empty id")]
    EmptyId { origin: String },
    #[error("workflow '{workflow}' declares field '{field}' more than once")]
    DuplicateField { workflow: String, field: String },
    #[error("workflow '{workflow}' reads field '{field}', which it does not declare")]
    MissingKindField { workflow: String, field: String },
    #[error("workflow '{workflow}' field '{field}' has an invalid pattern: {source}")]
    InvalidPattern {
        workflow: String,
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    workflows: Vec<WorkflowDefinition>,
}

/// Workflows available to run, keyed by id in catalog order.
#[derive(Debug, Clone, Default)]
pub struct WorkflowCatalog {
    workflows: IndexMap<String, WorkflowDefinition>,
}

impl WorkflowCatalog {
    /// Catalog holding only the workflows compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG, "built-in catalog")
    }

    /// Parse and check a catalog document; `origin` names it in errors.
    pub fn from_yaml_str(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(text).map_err(|source| CatalogError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        let mut catalog = Self::default();
        for workflow in file.workflows {
            check_definition(&workflow, origin)?;
            catalog.insert(workflow);
        }
        Ok(catalog)
    }

    /// Built-in workflows, the configured user catalog, then endpoint overrides.
    pub fn load(config: &FrontandConfig) -> Result<Self> {
        let mut catalog = Self::builtin().context("built-in workflow catalog is invalid")?;

        if let Some(path) = &config.catalog_path {
            let user = Self::load_file(path)?;
            info!(path = %path.display(), workflows = user.len(), "loaded user workflow catalog");
            catalog.merge(user);
        }

        catalog.apply_endpoint_overrides(config);
        Ok(catalog)
    }

    /// Read a catalog file from disk.
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read workflow catalog {}", path.display()))?;
        Ok(Self::from_yaml_str(&text, &path.display().to_string())?)
    }

    /// Add or replace a workflow by id.
    pub fn insert(&mut self, workflow: WorkflowDefinition) -> Option<WorkflowDefinition> {
        self.workflows.insert(workflow.id.clone(), workflow)
    }

    /// Merge `other` over this catalog; workflows with the same id are replaced in place.
    pub fn merge(&mut self, other: WorkflowCatalog) {
        for (id, workflow) in other.workflows {
            if self.workflows.insert(id.clone(), workflow).is_some() {
                debug!(workflow = %id, "user catalog replaces workflow");
            }
        }
    }

    pub fn apply_endpoint_overrides(&mut self, config: &FrontandConfig) {
        for workflow in self.workflows.values_mut() {
            let endpoint = config.endpoint_for(&workflow.id, &workflow.endpoint);
            if endpoint != workflow.endpoint {
                debug!(workflow = %workflow.id, endpoint, "endpoint overridden by config");
                workflow.endpoint = endpoint.to_string();
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&WorkflowDefinition> {
        self.workflows.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&WorkflowDefinition, CatalogError> {
        self.get(id).ok_or_else(|| CatalogError::UnknownWorkflow(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowDefinition> {
        self.workflows.values()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

fn check_definition(workflow: &WorkflowDefinition, origin: &str) -> Result<(), CatalogError> {
    if workflow.id.trim().is_empty() {
        return Err(CatalogError::EmptyId {
            origin: origin.to_string(),
        });
    }

    let mut seen = IndexSet::new();
    for field in &workflow.fields {
        if !seen.insert(field.id.as_str()) {
            return Err(CatalogError::DuplicateField {
                workflow: workflow.id.clone(),
                field: field.id.clone(),
            });
        }
        if let Some(pattern) = field.validation.as_ref().and_then(|rules| rules.pattern.as_deref()) {
            Regex::new(pattern).map_err(|source| CatalogError::InvalidPattern {
                workflow: workflow.id.clone(),
                field: field.id.clone(),
                source,
            })?;
        }
    }

    let referenced: Vec<&String> = match &workflow.kind {
        WorkflowKind::BatchRows { csv_field, prompt_field } => vec![csv_field, prompt_field],
        WorkflowKind::SiteCrawl { urls_field } => vec![urls_field],
        WorkflowKind::KeywordKombat {
            keywords_field,
            company_url_field,
        } => vec![keywords_field, company_url_field],
        WorkflowKind::Passthrough => Vec::new(),
    };
    if let Some(missing) = referenced.into_iter().find(|field| !seen.contains(field.as_str())) {
        return Err(CatalogError::MissingKindField {
            workflow: workflow.id.clone(),
            field: missing.clone(),
        });
    }
    Ok(())
}
