//! Parse result output formatting.

use expense_search_rs::{AutocompleteHint, Filter, FilterRange, ParseResult};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::commands::parse::KeySuggestion;

use super::helpers::{caret_underline, format_key, truncate_str};

/// Width of the key column.
const KEY_WIDTH: usize = 12;

/// Widest value shown in the filters table before truncating.
const MAX_VALUE_WIDTH: usize = 48;

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ParseOutput<'a> {
    pub query: &'a str,
    pub filters: &'a [Filter],
    pub ranges: &'a [FilterRange],
    pub autocomplete: Option<&'a AutocompleteHint>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub suggestions: &'a [KeySuggestion],
}

/// Formats a parse result as JSON.
pub fn format_parse_json(
    query: &str,
    result: &ParseResult,
    suggestions: &[KeySuggestion],
) -> Result<String, serde_json::Error> {
    let output = ParseOutput {
        query,
        filters: &result.filters,
        ranges: &result.ranges,
        autocomplete: result.autocomplete.as_ref(),
        suggestions,
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a parse result as a table followed by the autocomplete hint.
pub fn format_parse_table(
    query: &str,
    result: &ParseResult,
    suggestions: &[KeySuggestion],
    use_colors: bool,
) -> String {
    let mut output = String::new();

    if result.filters.is_empty() {
        output.push_str("No filters.\n");
    } else {
        let header = format!("{:<width$} {}", "Key", "Value", width = KEY_WIDTH);
        if use_colors {
            output.push_str(&format!("{}\n", header.dimmed()));
        } else {
            output.push_str(&header);
            output.push('\n');
        }

        for filter in &result.filters {
            // Padding is computed on the plain label; escape codes have no width.
            let plain_width = format_key(filter.key, false).len();
            output.push_str(&format!(
                "{}{} {}\n",
                format_key(filter.key, use_colors),
                " ".repeat(KEY_WIDTH.saturating_sub(plain_width)),
                truncate_str(&filter.value, MAX_VALUE_WIDTH)
            ));
        }
    }

    output.push('\n');
    match &result.autocomplete {
        Some(hint) => output.push_str(&format_hint(query, hint, use_colors)),
        None => output.push_str("No autocomplete hint.\n"),
    }

    for suggestion in suggestions {
        let line = format!(
            "Did you mean '{}' instead of '{}'?",
            suggestion.key, suggestion.typed
        );
        if use_colors {
            output.push_str(&format!("{}\n", line.yellow()));
        } else {
            output.push_str(&line);
            output.push('\n');
        }
    }

    output
}

fn format_hint(query: &str, hint: &AutocompleteHint, use_colors: bool) -> String {
    let header = "Autocomplete";
    let mut output = if use_colors {
        format!("{}\n", header.green().bold())
    } else {
        format!("{}\n", header)
    };

    output.push_str(&format!("  Key:      {}\n", format_key(Some(hint.key), use_colors)));
    output.push_str(&format!(
        "  Operator: {} ({})\n",
        hint.operator,
        hint.operator.symbol()
    ));
    match &hint.value {
        Some(value) => output.push_str(&format!("  Value:    {}\n", value)),
        None => output.push_str("  Value:    (none)\n"),
    }
    output.push_str(&format!("  Span:     {}..{}\n", hint.start, hint.start + hint.length));
    output.push_str(&caret_underline(query, hint.span(), "  "));
    output.push('\n');
    output
}
