//! Row-by-row CSV processing with a free-form prompt.

use frontand_types::{FormValues, WorkflowKind};
use frontand_util::csv::parse_csv;
use serde_json::{Map, Value, json};

use super::{RequestShaper, ShapeError, ShapeOptions};

/// Sent as `mode` so the unified backend routes the body to row processing.
const FREESTYLE_MODE: &str = "freestyle";

/// Shapes `batch_rows` workflows.
///
/// Rows are re-keyed as `row_1..row_N` (only `row_1` in test mode) and sent
/// with the header list, the trimmed prompt and the batch settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchRowsShaper;

impl RequestShaper for BatchRowsShaper {
    fn shape(&self, kind: &WorkflowKind, values: &FormValues, options: &ShapeOptions) -> Result<Value, ShapeError> {
        let WorkflowKind::BatchRows { csv_field, prompt_field } = kind else {
            return Err(ShapeError::KindMismatch {
                shaper: "batch_rows",
                kind: kind.name(),
            });
        };

        let parsed = values.text(csv_field).and_then(parse_csv).ok_or(ShapeError::InvalidCsv)?;
        let prompt = values.text(prompt_field).map(str::trim).unwrap_or_default();
        if prompt.is_empty() {
            return Err(ShapeError::MissingValue {
                field: prompt_field.clone(),
            });
        }

        let take = if options.test_mode { 1 } else { parsed.rows.len() };
        let data: Map<String, Value> = parsed
            .rows
            .into_iter()
            .take(take)
            .enumerate()
            .map(|(index, row)| (format!("row_{}", index + 1), json!(row)))
            .collect();

        Ok(json!({
            "mode": FREESTYLE_MODE,
            "data": data,
            "headers": parsed.headers,
            "prompt": prompt,
            "batch_size": options.batch_size,
            "enable_google_search": options.enable_search,
            "test_mode": options.test_mode,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontand_types::FieldValue;

    fn kind() -> WorkflowKind {
        WorkflowKind::BatchRows {
            csv_field: "csv_data".into(),
            prompt_field: "prompt".into(),
        }
    }

    fn values(csv: &str, prompt: &str) -> FormValues {
        let mut values = FormValues::new();
        values.insert("csv_data", FieldValue::Text(csv.into()));
        values.insert("prompt", FieldValue::Text(prompt.into()));
        values
    }

    #[test]
    fn rows_are_keyed_by_one_based_index() {
        let values = values("company,city\nAcme,Berlin\nGlobex,\"Paris, FR\"\nInitech,Austin", "  Summarize  ");

        let body = BatchRowsShaper.shape(&kind(), &values, &ShapeOptions::default()).unwrap();

        let data = body["data"].as_object().unwrap();
        let keys: Vec<_> = data.keys().cloned().collect();
        assert_eq!(keys, vec!["row_1", "row_2", "row_3"]);
        assert_eq!(data["row_2"], json!(["Globex", "Paris, FR"]));
        assert_eq!(body["headers"], json!(["company", "city"]));
        assert_eq!(body["prompt"], "Summarize");
        assert_eq!(body["batch_size"], 10);
        assert_eq!(body["mode"], "freestyle");
    }

    #[test]
    fn test_mode_keeps_first_row_only() {
        let values = values("company\nAcme\nGlobex\nInitech", "Summarize");
        let options = ShapeOptions {
            test_mode: true,
            enable_search: true,
            batch_size: 5,
        };

        let body = BatchRowsShaper.shape(&kind(), &values, &options).unwrap();

        let data = body["data"].as_object().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data["row_1"], json!(["Acme"]));
        assert_eq!(body["enable_google_search"], true);
        assert_eq!(body["test_mode"], true);
        assert_eq!(body["batch_size"], 5);
    }

    #[test]
    fn header_only_csv_is_invalid() {
        let error = BatchRowsShaper
            .shape(&kind(), &values("company", "Summarize"), &ShapeOptions::default())
            .unwrap_err();
        assert_eq!(error.to_string(), "Invalid CSV: provide a header row and at least one data row");
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let error = BatchRowsShaper
            .shape(&kind(), &values("company\nAcme", " \n "), &ShapeOptions::default())
            .unwrap_err();
        assert_eq!(error, ShapeError::MissingValue { field: "prompt".into() });
    }
}
