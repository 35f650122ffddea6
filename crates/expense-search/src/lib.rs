//! Search query parser for expense filters.
//!
//! This crate turns the text of a search box into a list of key/value
//! filters and, for suggestion UIs, an autocomplete hint describing the value
//! the cursor is in.
//!
//! # Supported Syntax
//!
//! ## Keys
//! `in`, `currency`, `tag`, `category`, `to`, `taxRate`, `from`,
//! `expenseType`, `type`, `status` (case-sensitive)
//!
//! ## Operators
//! - `:` or `=` - equal
//! - `!=` - not equal
//! - `>=`, `>`, `<=`, `<` - comparisons
//!
//! ## Values
//! - `tag:food` - a bare word
//! - `tag:food,travel` - a comma-separated list, one filter per value
//! - `from:"john doe"` - a quoted value (kept whole, commas included)
//!
//! ## Free Text
//! Words without a `key:` prefix are consumed as free text. They produce no
//! filters unless [`ParseOptions::include_free_text`] is set.
//!
//! # Example
//!
//! ```
//! use expense_search_rs::{parse, Filter, SearchKey};
//!
//! let result = parse(r#"from:"john doe" status:"#).unwrap();
//! assert_eq!(result.filters, vec![Filter::new(SearchKey::From, "john doe")]);
//!
//! // The user has typed `status:` and nothing else yet.
//! let hint = result.autocomplete.unwrap();
//! assert_eq!(hint.key, SearchKey::Status);
//! assert_eq!(hint.value, None);
//! assert_eq!((hint.start, hint.length), (23, 0));
//! ```

mod ast;
mod error;
mod lexer;
mod options;
mod parser;
mod position;
mod suggest;

pub use ast::{AutocompleteHint, Filter, FilterRange, Operator, ParseResult, SearchKey};
pub use error::{Expectation, KeywordError, Location, QueryResult, SourcePosition, SyntaxError};
pub use lexer::CharClass;
pub use options::ParseOptions;
pub use parser::QueryParser;
pub use suggest::{suggest_for_term, suggest_key};

/// Parses a search query with default options.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if the input cannot be consumed entirely.
pub fn parse(input: &str) -> QueryResult<ParseResult> {
    QueryParser::parse(input)
}

/// Parses a search query with the given options.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if the input cannot be consumed entirely.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> QueryResult<ParseResult> {
    QueryParser::parse_with_options(input, options)
}
