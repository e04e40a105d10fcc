//! Workflow execution: validate, shape, send, and record the outcome.
//!
//! - [`WorkflowExecutor`] runs one submission end to end against a
//!   [`WorkflowTransport`]
//! - [`ExecutionSession`] keeps the latest outcome of a screen; concurrent
//!   submissions are neither queued nor rejected, the last one to finish wins
//! - [`progress`] holds the client-side progress estimate shown while waiting
//!
//! Nothing is retried. Every failure is reported once and clears the
//! session's in-progress flag so the user can submit again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use frontand_api::{TransportError, WorkflowTransport};
use frontand_types::{ExecutionResult, FormError, FormValues, ValidationError, WorkflowDefinition, validate_inputs};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::form::{AttachError, InputError};
use crate::shaper::{ShapeError, ShapeOptions, ShaperRegistry};

pub mod progress;

pub use progress::{ProgressEstimate, ProgressEstimator, ProgressTicker};

/// Any failure of a workflow submission, in user-facing wording.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<AttachError> for ExecutionError {
    fn from(error: AttachError) -> Self {
        match error {
            AttachError::Form(error) => Self::Form(error),
            AttachError::Input(error) => Self::Input(error),
        }
    }
}

impl ExecutionError {
    /// Returns true when the failure was detected before any network call.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}

/// Runs workflow submissions against a transport.
#[derive(Clone)]
pub struct WorkflowExecutor {
    transport: Arc<dyn WorkflowTransport>,
    shapers: ShaperRegistry,
}

impl WorkflowExecutor {
    pub fn new(transport: Arc<dyn WorkflowTransport>, shapers: ShaperRegistry) -> Self {
        Self { transport, shapers }
    }

    pub fn shapers(&self) -> &ShaperRegistry {
        &self.shapers
    }

    /// Validate `values` and build the request body without sending it.
    pub fn prepare(
        &self,
        workflow: &WorkflowDefinition,
        values: &FormValues,
        options: &ShapeOptions,
    ) -> Result<Value, ExecutionError> {
        validate_inputs(&workflow.fields, values)?;
        let body = self.shapers.shape(&workflow.kind, values, options)?;
        debug!(workflow = %workflow.id, kind = workflow.kind.name(), "request body prepared");
        Ok(body)
    }

    /// Validate, shape and send one submission.
    pub async fn execute(
        &self,
        workflow: &WorkflowDefinition,
        values: &FormValues,
        options: &ShapeOptions,
    ) -> Result<ExecutionResult, ExecutionError> {
        let body = self.prepare(workflow, values, options)?;

        info!(
            workflow = %workflow.id,
            endpoint = %workflow.endpoint,
            test_mode = options.test_mode,
            "executing workflow"
        );
        let started = Instant::now();
        let response = self.transport.post_json(&workflow.endpoint, &body).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match response {
            Ok(response) => {
                info!(workflow = %workflow.id, status = response.status, elapsed_ms, "workflow completed");
                Ok(ExecutionResult {
                    workflow_id: workflow.id.clone(),
                    status: response.status,
                    body: response.body,
                    elapsed_ms,
                })
            }
            Err(error) => {
                warn!(workflow = %workflow.id, elapsed_ms, error = %error, "workflow failed");
                Err(error.into())
            }
        }
    }
}

impl std::fmt::Debug for WorkflowExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowExecutor").field("shapers", &self.shapers).finish()
    }
}

/// Outcome stored by an [`ExecutionSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(ExecutionResult),
    Failed(String),
}

#[derive(Debug, Default)]
struct SessionState {
    running: bool,
    latest: Option<SessionOutcome>,
}

/// Displayed state of one workflow screen.
///
/// Created by the caller and passed to whatever submits work; there is no
/// shared global instance.
#[derive(Debug, Default)]
pub struct ExecutionSession {
    state: Mutex<SessionState>,
}

impl ExecutionSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Outcome of the submission that finished last.
    pub fn latest(&self) -> Option<SessionOutcome> {
        self.lock().latest.clone()
    }

    /// Forget the stored outcome.
    pub fn reset(&self) {
        *self.lock() = SessionState::default();
    }

    /// Run a submission and record its outcome.
    ///
    /// The outcome overwrites whatever is stored when the submission
    /// finishes, regardless of when it started.
    pub async fn submit(
        &self,
        executor: &WorkflowExecutor,
        workflow: &WorkflowDefinition,
        values: &FormValues,
        options: &ShapeOptions,
    ) -> Result<ExecutionResult, ExecutionError> {
        {
            let mut state = self.lock();
            if state.running {
                debug!(workflow = %workflow.id, "submission started while another is in flight");
            }
            state.running = true;
        }

        let result = executor.execute(workflow, values, options).await;

        let mut state = self.lock();
        state.running = false;
        state.latest = Some(match &result {
            Ok(result) => SessionOutcome::Completed(result.clone()),
            Err(error) => SessionOutcome::Failed(error.to_string()),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use frontand_api::TransportResponse;
    use frontand_types::{FieldKind, FieldSchema, FieldValue, OutputSpec, WorkflowKind};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WorkflowTransport for EchoTransport {
        async fn post_json(&self, endpoint: &str, body: &Value) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TransportResponse {
                status: 200,
                body: json!({"endpoint": endpoint, "received": body}),
            })
        }
    }

    fn workflow() -> WorkflowDefinition {
        WorkflowDefinition {
            id: "echo".into(),
            title: None,
            description: None,
            endpoint: "https://echo.test/process".into(),
            kind: WorkflowKind::Passthrough,
            output: OutputSpec::default(),
            fields: vec![FieldSchema::new("topic", "Topic", FieldKind::Text).required()],
        }
    }

    fn executor() -> (Arc<EchoTransport>, WorkflowExecutor) {
        let transport = Arc::new(EchoTransport {
            calls: AtomicUsize::new(0),
        });
        let executor = WorkflowExecutor::new(transport.clone(), ShaperRegistry::default());
        (transport, executor)
    }

    #[tokio::test]
    async fn validation_failure_skips_the_network() {
        let (transport, executor) = executor();

        let error = executor
            .execute(&workflow(), &FormValues::new(), &ShapeOptions::default())
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Topic is required");
        assert!(error.is_local());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_run_returns_body() {
        let (_, executor) = executor();
        let mut values = FormValues::new();
        values.insert("topic", FieldValue::Text("rust".into()));

        let result = executor
            .execute(&workflow(), &values, &ShapeOptions::default())
            .await
            .unwrap();

        assert_eq!(result.workflow_id, "echo");
        assert_eq!(result.status, 200);
        assert_eq!(result.body["received"]["topic"], "rust");
    }

    #[tokio::test]
    async fn session_records_failure_and_clears_running() {
        let (_, executor) = executor();
        let session = ExecutionSession::new();

        let outcome = session
            .submit(&executor, &workflow(), &FormValues::new(), &ShapeOptions::default())
            .await;

        assert!(outcome.is_err());
        assert!(!session.is_running());
        assert_eq!(session.latest(), Some(SessionOutcome::Failed("Topic is required".into())));

        session.reset();
        assert_eq!(session.latest(), None);
    }
}
