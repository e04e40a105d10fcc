//! Keyword relevance scoring against a company website.

use frontand_types::{FormValues, WorkflowKind};
use frontand_util::csv::strip_enclosing_quotes;
use serde_json::{Value, json};
use url::Url;

use super::{RequestShaper, ShapeError, ShapeOptions};

const KEYWORD_KOMBAT_MODE: &str = "keyword-kombat";

/// Row variable the backend substitutes each keyword into.
const KEYWORD_VARIABLE: &str = "keyword";

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordKombatShaper;

impl RequestShaper for KeywordKombatShaper {
    fn shape(&self, kind: &WorkflowKind, values: &FormValues, options: &ShapeOptions) -> Result<Value, ShapeError> {
        let WorkflowKind::KeywordKombat {
            keywords_field,
            company_url_field,
        } = kind
        else {
            return Err(ShapeError::KindMismatch {
                shaper: "keyword_kombat",
                kind: kind.name(),
            });
        };

        let keywords = extract_keywords(values.text(keywords_field).unwrap_or_default());
        if keywords.is_empty() {
            return Err(ShapeError::NoKeywords);
        }

        let company_url = values.text(company_url_field).map(str::trim).unwrap_or_default();
        if company_url.is_empty() {
            return Err(ShapeError::MissingValue {
                field: company_url_field.clone(),
            });
        }
        let parsed = Url::parse(company_url).map_err(|_| ShapeError::InvalidUrl {
            value: company_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ShapeError::InvalidUrl {
                value: company_url.to_string(),
            });
        }

        // Test-mode truncation happens server side.
        Ok(json!({
            "mode": KEYWORD_KOMBAT_MODE,
            "keywords": keywords,
            "company_url": company_url,
            "keyword_variable": KEYWORD_VARIABLE,
            "enable_google_search": options.enable_search,
            "test_mode": options.test_mode,
        }))
    }
}

/// Keywords from pasted text or a single-column CSV.
///
/// A first line containing "keyword" is a header; the first comma-separated
/// field of each remaining line is a keyword.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty()).peekable();
    if lines.peek().is_some_and(|first| first.to_lowercase().contains("keyword")) {
        lines.next();
    }
    lines
        .map(|line| strip_enclosing_quotes(line.split(',').next().unwrap_or_default().trim()).trim())
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontand_types::FieldValue;

    fn kind() -> WorkflowKind {
        WorkflowKind::KeywordKombat {
            keywords_field: "keywords".into(),
            company_url_field: "company_url".into(),
        }
    }

    fn values(keywords: &str, url: &str) -> FormValues {
        let mut values = FormValues::new();
        values.insert("keywords", FieldValue::Text(keywords.into()));
        values.insert("company_url", FieldValue::Text(url.into()));
        values
    }

    #[test]
    fn keywords_skip_header_and_extra_columns() {
        assert_eq!(
            extract_keywords("Keyword,volume\ncrm software,900\n\n\"lead scoring\",40\n"),
            vec!["crm software", "lead scoring"]
        );
    }

    #[test]
    fn body_carries_mode_and_variable() {
        let body = KeywordKombatShaper
            .shape(&kind(), &values("crm\nerp", " https://acme.test "), &ShapeOptions::default())
            .unwrap();

        assert_eq!(
            body,
            json!({
                "mode": "keyword-kombat",
                "keywords": ["crm", "erp"],
                "company_url": "https://acme.test",
                "keyword_variable": "keyword",
                "enable_google_search": false,
                "test_mode": false,
            })
        );
    }

    #[test]
    fn empty_keyword_list_is_rejected() {
        let error = KeywordKombatShaper
            .shape(&kind(), &values("keywords\n\n", "https://acme.test"), &ShapeOptions::default())
            .unwrap_err();
        assert_eq!(error.to_string(), "No keywords found");
    }

    #[test]
    fn company_url_must_be_http() {
        let error = KeywordKombatShaper
            .shape(&kind(), &values("crm", "ftp://acme.test"), &ShapeOptions::default())
            .unwrap_err();
        assert!(matches!(error, ShapeError::InvalidUrl { .. }));

        let error = KeywordKombatShaper
            .shape(&kind(), &values("crm", "acme"), &ShapeOptions::default())
            .unwrap_err();
        assert!(matches!(error, ShapeError::InvalidUrl { .. }));
    }
}
