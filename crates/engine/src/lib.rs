//! # Front& Engine
//!
//! Everything between a workflow definition and a rendered result:
//!
//! - **`form`**: form state, input controls and file uploads for one workflow screen
//! - **`shaper`**: per-kind request shaping behind a lookup table
//! - **`executor`**: validate → shape → send, the last-write-wins session and the
//!   client-side progress estimate
//! - **`render`**: table/JSON/text/image views of a response, CSV export
//! - **`catalog`**: built-in and user-defined workflow definitions
//!
//! ## Usage
//!
//! ```rust
//! use frontand_engine::{FormState, ShapeOptions, ShaperRegistry, WorkflowCatalog};
//!
//! let catalog = WorkflowCatalog::builtin()?;
//! let workflow = catalog.require("loop-over-rows")?;
//!
//! let mut form = FormState::new(workflow.fields.clone());
//! form.set_raw("csv_data", "company\nAcme\nGlobex")?;
//! form.set_raw("prompt", "Guess the industry")?;
//! form.validate()?;
//!
//! let body = ShaperRegistry::default().shape(&workflow.kind, form.values(), &ShapeOptions::default())?;
//! assert_eq!(body["data"]["row_2"][0], "Globex");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod executor;
pub mod form;
pub mod render;
pub mod shaper;

pub use catalog::{CatalogError, WorkflowCatalog};
pub use executor::{
    ExecutionError, ExecutionSession, ProgressEstimate, ProgressEstimator, ProgressTicker, SessionOutcome,
    WorkflowExecutor,
};
pub use form::{AttachError, FormState, InputError};
pub use render::{ImageView, ResultView, TableColumn, TableView, render_result};
pub use shaper::{RequestShaper, ShapeError, ShapeOptions, ShaperRegistry};
