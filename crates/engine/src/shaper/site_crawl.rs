use frontand_types::{FormValues, WorkflowKind};
use frontand_util::csv::strip_enclosing_quotes;
use serde_json::{Value, json};

use super::{RequestShaper, ShapeError, ShapeOptions};

/// Shapes `site_crawl` workflows into `{ urls, test_mode, enable_google_search }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteCrawlShaper;

impl RequestShaper for SiteCrawlShaper {
    fn shape(&self, kind: &WorkflowKind, values: &FormValues, options: &ShapeOptions) -> Result<Value, ShapeError> {
        let WorkflowKind::SiteCrawl { urls_field } = kind else {
            return Err(ShapeError::KindMismatch {
                shaper: "site_crawl",
                kind: kind.name(),
            });
        };

        let mut urls = extract_urls(values.text(urls_field).unwrap_or_default());
        if urls.is_empty() {
            return Err(ShapeError::NoValidUrls);
        }
        if options.test_mode {
            urls.truncate(1);
        }

        Ok(json!({
            "urls": urls,
            "test_mode": options.test_mode,
            "enable_google_search": options.enable_search,
        }))
    }
}

/// Pull crawlable URLs out of pasted CSV or newline-separated text.
///
/// A first line mentioning "website" or "url" is treated as a header. From
/// every other line the first comma-separated field is kept when it starts
/// with `http`.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty()).peekable();
    if let Some(first) = lines.peek() {
        let lowered = first.to_lowercase();
        if lowered.contains("website") || lowered.contains("url") {
            lines.next();
        }
    }

    lines
        .filter_map(|line| {
            let candidate = strip_enclosing_quotes(line.split(',').next().unwrap_or_default().trim()).trim();
            (!candidate.is_empty() && candidate.starts_with("http")).then(|| candidate.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontand_types::FieldValue;

    fn kind() -> WorkflowKind {
        WorkflowKind::SiteCrawl {
            urls_field: "urls".into(),
        }
    }

    #[test]
    fn header_blank_and_non_http_lines_are_dropped() {
        assert_eq!(extract_urls("Website\nhttp://a.com\nftp://b.com\n\n"), vec!["http://a.com"]);
    }

    #[test]
    fn first_csv_column_is_used() {
        let text = "company_url,name\n\"https://acme.test\",Acme\nhttps://globex.test, Globex\n";
        assert_eq!(extract_urls(text), vec!["https://acme.test", "https://globex.test"]);
    }

    #[test]
    fn plain_url_list_without_header() {
        assert_eq!(
            extract_urls("https://a.test\r\nhttps://b.test"),
            vec!["https://a.test", "https://b.test"]
        );
    }

    #[test]
    fn no_urls_is_an_error() {
        let mut values = FormValues::new();
        values.insert("urls", FieldValue::Text("Website\nnot a url\n".into()));

        let error = SiteCrawlShaper
            .shape(&kind(), &values, &ShapeOptions::default())
            .unwrap_err();
        assert_eq!(error.to_string(), "No valid URLs found");
    }

    #[test]
    fn test_mode_sends_first_url() {
        let mut values = FormValues::new();
        values.insert("urls", FieldValue::Text("https://a.test\nhttps://b.test".into()));
        let options = ShapeOptions {
            test_mode: true,
            ..ShapeOptions::default()
        };

        let body = SiteCrawlShaper.shape(&kind(), &values, &options).unwrap();

        assert_eq!(body, json!({"urls": ["https://a.test"], "test_mode": true, "enable_google_search": false}));
    }
}
