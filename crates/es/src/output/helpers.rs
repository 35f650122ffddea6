//! Common helper functions for output formatting.

use std::ops::Range;

use expense_search_rs::SearchKey;
use owo_colors::OwoColorize;

/// Label shown in place of a key for free-text filters.
pub const FREE_TEXT_LABEL: &str = "(free text)";

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a filter key for display.
pub fn format_key(key: Option<SearchKey>, use_colors: bool) -> String {
    match key {
        Some(key) if use_colors => key.as_str().cyan().to_string(),
        Some(key) => key.as_str().to_string(),
        None if use_colors => FREE_TEXT_LABEL.dimmed().to_string(),
        None => FREE_TEXT_LABEL.to_string(),
    }
}

/// Renders `input` on one line with a caret marker under `span`.
///
/// Line breaks and tabs are shown as spaces so the marker stays aligned.
/// Columns count chars, not bytes. An empty span gets a single caret.
pub fn caret_underline(input: &str, span: Range<usize>, indent: &str) -> String {
    let line: String = input
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let column = input.get(..span.start).map_or(0, |s| s.chars().count());
    let width = input
        .get(span)
        .map_or(0, |s| s.chars().count())
        .max(1);

    format!(
        "{indent}{line}\n{indent}{}{}",
        " ".repeat(column),
        "^".repeat(width)
    )
}
