use frontand_types::{FormValues, WorkflowKind};
use serde_json::{Value, json};

use super::{RequestShaper, ShapeError, ShapeOptions};

/// Default shaper: every form value verbatim, plus the run flags.
///
/// Flags are merged last, so a field named `test_mode` is overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughShaper;

impl RequestShaper for PassthroughShaper {
    fn shape(&self, _kind: &WorkflowKind, values: &FormValues, options: &ShapeOptions) -> Result<Value, ShapeError> {
        let mut body = values.to_json_map();
        body.insert("test_mode".into(), json!(options.test_mode));
        body.insert("enable_google_search".into(), json!(options.enable_search));
        Ok(Value::Object(body))
    }
}
