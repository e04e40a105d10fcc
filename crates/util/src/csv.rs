//! # CSV Utilities
//!
//! Lightweight CSV handling used by every workflow screen: a quote-aware line
//! splitter that turns pasted or uploaded text into a [`ParsedCsv`], and the
//! inverse direction used when exporting a result table.
//!
//! The parser is deliberately small. Doubled quotes (`""`) inside a quoted
//! field are kept as written instead of being collapsed to a single quote,
//! and rows are never padded to the header width.

use std::borrow::Cow;

use chrono::NaiveDate;
use frontand_types::ParsedCsv;
use heck::ToKebabCase;

/// Parse CSV text into headers and rows.
///
/// Returns `None` unless the text holds a header line and at least one data
/// line; blank and whitespace-only lines are ignored.
///
/// # Example
/// ```rust
/// use frontand_util::csv::parse_csv;
///
/// let parsed = parse_csv("name,city\nAda,\"London, UK\"\n").unwrap();
/// assert_eq!(parsed.headers, vec!["name", "city"]);
/// assert_eq!(parsed.rows, vec![vec!["Ada".to_string(), "London, UK".to_string()]]);
///
/// assert!(parse_csv("name,city").is_none());
/// ```
pub fn parse_csv(text: &str) -> Option<ParsedCsv> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header_line = lines.next()?;
    let rows: Vec<Vec<String>> = lines.map(split_csv_line).collect();
    if rows.is_empty() {
        return None;
    }

    // The header line is split naively; quoted commas in headers are not supported.
    let headers = header_line
        .split(',')
        .map(|header| strip_enclosing_quotes(header.trim()).to_string())
        .collect();

    Some(ParsedCsv { headers, rows })
}

/// Split one CSV line into fields, honoring commas enclosed in double quotes.
///
/// Each field is trimmed and one pair of surrounding quotes is removed.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => fields.push(finish_field(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(finish_field(&mut current));
    fields
}

fn finish_field(current: &mut String) -> String {
    let raw = std::mem::take(current);
    strip_enclosing_quotes(raw.trim()).to_string()
}

/// Remove a leading and a trailing double quote, each independently.
pub fn strip_enclosing_quotes(text: &str) -> &str {
    let text = text.strip_prefix('"').unwrap_or(text);
    text.strip_suffix('"').unwrap_or(text)
}

/// Quote a field for export when it contains a comma, a quote, or a line break.
///
/// Embedded quotes are doubled.
pub fn escape_csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Render a header row and data rows as CSV text, one line per row.
pub fn to_csv_text(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, headers);
    for row in rows {
        push_csv_line(&mut out, row);
    }
    out
}

fn push_csv_line(out: &mut String, fields: &[String]) {
    let line: Vec<Cow<'_, str>> = fields.iter().map(|field| escape_csv_field(field)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// File name for an exported table: `<kebab-case title>-<YYYY-MM-DD>.csv`.
pub fn export_file_name(title: &str, date: NaiveDate) -> String {
    let slug = title.to_kebab_case();
    let slug = if slug.is_empty() { "results".to_string() } else { slug };
    format!("{}-{}.csv", slug, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let headers = vec!["company".to_string(), "website".to_string(), "country".to_string()];
        let rows = vec![
            vec!["Acme".to_string(), "https://acme.test".to_string(), "DE".to_string()],
            vec!["Globex".to_string(), "https://globex.test".to_string(), "US".to_string()],
            vec!["Initech".to_string(), "https://initech.test".to_string(), "FR".to_string()],
        ];
        let mut text = headers.join(",");
        for row in &rows {
            text.push('\n');
            text.push_str(&row.join(","));
        }

        let parsed = parse_csv(&text).expect("parse csv");
        assert_eq!(parsed.headers, headers);
        assert_eq!(parsed.rows, rows);
    }

    #[test]
    fn quoted_commas_stay_in_one_field() {
        assert_eq!(split_csv_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn fewer_than_two_lines_is_none() {
        assert!(parse_csv("").is_none());
        assert!(parse_csv("   \n\n").is_none());
        assert!(parse_csv("name,email").is_none());
        assert!(parse_csv("name,email\n\n   \n").is_none());
    }

    #[test]
    fn blank_lines_and_crlf_are_ignored() {
        let parsed = parse_csv("name,email\r\n\r\nAda,ada@example.com\r\n").expect("parse csv");
        assert_eq!(parsed.headers, vec!["name", "email"]);
        assert_eq!(parsed.rows, vec![vec!["Ada".to_string(), "ada@example.com".to_string()]]);
    }

    #[test]
    fn headers_are_trimmed_and_unquoted() {
        let parsed = parse_csv("\"name\" , \"email\"\nAda,ada@example.com").expect("parse csv");
        assert_eq!(parsed.headers, vec!["name", "email"]);
    }

    #[test]
    fn ragged_rows_are_not_padded() {
        let parsed = parse_csv("a,b,c\n1\n1,2,3,4").expect("parse csv");
        assert_eq!(parsed.rows[0], vec!["1"]);
        assert_eq!(parsed.rows[1].len(), 4);
    }

    #[test]
    fn doubled_quotes_are_kept_verbatim() {
        assert_eq!(split_csv_line(r#""say ""hi""",x"#), vec![r#"say ""hi"""#, "x"]);
    }

    #[test]
    fn export_quotes_commas_and_doubles_quotes() {
        let headers = vec!["Name".to_string(), "Note".to_string()];
        let rows = vec![vec!["Acme, Inc.".to_string(), "the \"best\"".to_string()]];
        let text = to_csv_text(&headers, &rows);
        assert_eq!(text, "Name,Note\n\"Acme, Inc.\",\"the \"\"best\"\"\"\n");
    }

    #[test]
    fn plain_fields_are_borrowed() {
        assert!(matches!(escape_csv_field("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn export_file_name_uses_title_and_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).expect("valid date");
        assert_eq!(export_file_name("Loop Over Rows Results", date), "loop-over-rows-results-2025-03-09.csv");
        assert_eq!(export_file_name("", date), "results-2025-03-09.csv");
    }
}
