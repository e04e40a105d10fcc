//! # Text Processing Utilities
//!
//! Small helpers for turning payload keys into column labels and for fitting
//! text into fixed-width terminal columns.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Turn a snake_case payload key into a column label.
///
/// Underscores become spaces and the first letter of every word is
/// capitalized; the rest of each word is left untouched.
///
/// # Example
/// ```rust
/// use frontand_util::text_processing::title_case_key;
///
/// assert_eq!(title_case_key("company_name"), "Company Name");
/// assert_eq!(title_case_key("row_key"), "Row Key");
/// assert_eq!(title_case_key("URL"), "URL");
/// ```
pub fn title_case_key(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Truncate `text` to at most `max_width` display columns, ending with `…` when cut.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    // Reserve one column for the ellipsis.
    let budget = max_width - 1;
    let mut used = 0;
    let mut truncated = String::new();
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}

/// Pad `text` with spaces on the right until it spans `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let current = text.width();
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width - current))
}

/// Collapse line breaks so a value fits on one table line.
pub fn single_line(text: &str) -> String {
    text.split(['\n', '\r']).filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
}
