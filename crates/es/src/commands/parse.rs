//! Parse command implementation.
//!
//! Runs a query through the parser and prints its filters, the autocomplete
//! hint, and "did you mean" notes for mistyped keys.

use expense_search_rs::{parse_with_options, suggest_for_term, ParseOptions, SearchKey};
use serde::Serialize;
use tracing::debug;

use super::config::Config;
use super::{CommandContext, CommandError, Result};
use crate::output::{format_parse_json, format_parse_table};

/// Arguments for the parse command.
pub struct ParseArgs {
    /// The query text.
    pub query: String,
    /// Byte offset of the cursor.
    pub cursor: Option<usize>,
    /// Emit free-text terms as filters.
    pub free_text: bool,
    /// Source name for error locations.
    pub source: Option<String>,
}

/// A free-text term whose prefix looks like a mistyped key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySuggestion {
    /// The prefix as typed, e.g. `catgory`.
    pub typed: String,
    /// The closest known key.
    pub key: SearchKey,
}

/// Builds parser options from the config file, with flags taking precedence.
pub fn build_options(config: &Config, args: &ParseArgs) -> ParseOptions {
    let mut options = ParseOptions::new()
        .with_free_text(args.free_text || config.parse.free_text.unwrap_or(false));
    if let Some(source) = args.source.as_ref().or(config.parse.source.as_ref()) {
        options = options.with_source(source.clone());
    }
    if let Some(cursor) = args.cursor {
        options = options.with_cursor(cursor);
    }
    options
}

/// Finds free-text terms shaped like `key:value` whose key is misspelled.
pub fn find_key_suggestions(query: &str) -> Vec<KeySuggestion> {
    let options = ParseOptions::new().with_free_text(true);
    let Ok(result) = parse_with_options(query, &options) else {
        return Vec::new();
    };

    let mut suggestions: Vec<KeySuggestion> = Vec::new();
    for filter in result.filters.iter().filter(|f| f.is_free_text()) {
        if let Some((typed, key)) = suggest_for_term(&filter.value) {
            if !suggestions.iter().any(|s| s.typed == typed) {
                suggestions.push(KeySuggestion {
                    typed: typed.to_string(),
                    key,
                });
            }
        }
    }
    suggestions
}

/// Executes the parse command.
///
/// # Errors
///
/// Returns [`CommandError::Syntax`] if the query cannot be parsed.
pub fn execute(ctx: &CommandContext, config: &Config, args: &ParseArgs) -> Result<()> {
    let options = build_options(config, args);
    debug!(?options, "parse options");

    let result = parse_with_options(&args.query, &options)
        .map_err(|error| CommandError::syntax(error, args.query.as_str()))?;
    let suggestions = find_key_suggestions(&args.query);

    if ctx.json_output {
        let output = format_parse_json(&args.query, &result, &suggestions)?;
        println!("{}", output);
    } else if !ctx.quiet {
        let output = format_parse_table(&args.query, &result, &suggestions, ctx.use_colors);
        print!("{}", output);
        if ctx.verbose && !result.is_empty() {
            println!("\nCanonical: {}", result.to_query_string());
        }
    }

    Ok(())
}
