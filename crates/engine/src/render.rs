//! Result rendering: turning a workflow response into a displayable view.
//!
//! The output type of a workflow decides the view. Tables are derived from the
//! first row of `results` (or the payload itself when it is an array), with
//! one column per key in payload order.

use chrono::NaiveDate;
use frontand_types::{OutputKind, OutputSpec};
use frontand_util::{
    csv::{export_file_name, to_csv_text},
    text_processing::{pad_to_width, single_line, title_case_key, truncate_to_width},
};
use serde::Serialize;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// Shown instead of a table when there are no rows.
pub const EMPTY_TABLE_MESSAGE: &str = "No data available";

/// Shown when an image response carries no image URL.
pub const EMPTY_IMAGE_MESSAGE: &str = "No image available";

/// Fixed label of the column holding the model output.
pub const OUTPUT_COLUMN_LABEL: &str = "AI Output";

/// Label of the single column used when rows are not objects.
pub const VALUE_COLUMN_LABEL: &str = "Value";

/// Displayable form of a workflow response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum ResultView {
    Table(TableView),
    /// Nothing to show; carries the message to display.
    Empty(String),
    /// Pretty-printed JSON.
    Json(String),
    Text(String),
    Image(ImageView),
}

/// One table column: the payload key and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub title: Option<String>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub url: String,
    pub title: Option<String>,
}

/// Render `response` according to the workflow's output settings.
pub fn render_result(output: &OutputSpec, response: &Value) -> ResultView {
    match output.kind {
        OutputKind::Table => render_table(output, response),
        OutputKind::Json => {
            ResultView::Json(serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string()))
        }
        OutputKind::Text => ResultView::Text(match response {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }),
        OutputKind::Image => match find_image_url(response) {
            Some(url) => ResultView::Image(ImageView {
                url: url.to_string(),
                title: output.title.clone(),
            }),
            None => ResultView::Empty(EMPTY_IMAGE_MESSAGE.to_string()),
        },
    }
}

fn render_table(output: &OutputSpec, response: &Value) -> ResultView {
    let items = match response.get("results") {
        Some(results) if !results.is_null() => results,
        _ => response,
    };
    let Some(items) = items.as_array().filter(|items| !items.is_empty()) else {
        return ResultView::Empty(EMPTY_TABLE_MESSAGE.to_string());
    };

    let output_column = response
        .get("output_column")
        .and_then(Value::as_str)
        .or(output.output_column.as_deref());

    let (columns, rows) = match &items[0] {
        Value::Object(first) => {
            let columns: Vec<TableColumn> = first
                .keys()
                .map(|key| TableColumn {
                    key: key.clone(),
                    label: if Some(key.as_str()) == output_column {
                        OUTPUT_COLUMN_LABEL.to_string()
                    } else {
                        title_case_key(key)
                    },
                })
                .collect();
            let rows = items
                .iter()
                .map(|item| {
                    columns
                        .iter()
                        .map(|column| item.get(&column.key).map(cell_text).unwrap_or_default())
                        .collect()
                })
                .collect();
            (columns, rows)
        }
        _ => {
            let column = TableColumn {
                key: String::new(),
                label: VALUE_COLUMN_LABEL.to_string(),
            };
            (vec![column], items.iter().map(|item| vec![cell_text(item)]).collect())
        }
    };

    ResultView::Table(TableView {
        title: output.title.clone(),
        columns,
        rows,
    })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn find_image_url(response: &Value) -> Option<&str> {
    if let Some(url) = image_url_field(response) {
        return Some(url);
    }
    match response.get("results")? {
        Value::Array(items) => items.first().and_then(image_url_field),
        results => image_url_field(results),
    }
}

fn image_url_field(value: &Value) -> Option<&str> {
    ["url", "image_url"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|url| !url.is_empty())
}

impl TableView {
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.label.clone()).collect()
    }

    /// Export text with the column labels as header row.
    pub fn to_csv(&self) -> String {
        to_csv_text(&self.labels(), &self.rows)
    }

    pub fn export_file_name(&self, date: NaiveDate) -> String {
        export_file_name(self.title.as_deref().unwrap_or_default(), date)
    }

    /// Aligned plain-text rendering for terminals.
    ///
    /// Cells are flattened to one line and cut to `max_cell_width` display
    /// columns.
    pub fn to_plain_text(&self, max_cell_width: usize) -> String {
        let labels = self.labels();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| truncate_to_width(&single_line(cell), max_cell_width))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = labels
            .iter()
            .map(|label| label.width().min(max_cell_width))
            .collect();
        for row in &rows {
            for (index, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(index) {
                    *width = (*width).max(cell.width());
                }
            }
        }

        let mut out = String::new();
        let format_line = |cells: &[String], out: &mut String| {
            let line: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(index, width)| {
                    let cell = cells.get(index).map(String::as_str).unwrap_or_default();
                    pad_to_width(&truncate_to_width(cell, *width), *width)
                })
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        };

        format_line(&labels, &mut out);
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &rows {
            format_line(row, &mut out);
        }
        out
    }
}
