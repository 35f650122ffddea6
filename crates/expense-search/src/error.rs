//! Error types for the query parser.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::lexer::CharClass;

/// A specialized Result type for query parsing operations.
pub type QueryResult<T> = Result<T, SyntaxError>;

/// Source name used in rendered errors when none is configured.
const DEFAULT_SOURCE_NAME: &str = "<input>";

/// The input could not be reduced to a query.
///
/// Carries the expectations recorded at the furthest position the parser
/// reached, the character found there and its location.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct SyntaxError {
    /// Human-readable summary, e.g. `Expected "\"" but end of input found.`
    pub message: String,
    /// Deduplicated expectations, sorted by description.
    pub expected: Vec<Expectation>,
    /// The character at the failure position, or `None` at end of input.
    pub found: Option<char>,
    /// Where the failure happened.
    pub location: Location,
}

impl SyntaxError {
    /// Builds a syntax error, normalizing the expectation set and message.
    pub(crate) fn new(expected: Vec<Expectation>, found: Option<char>, location: Location) -> Self {
        let expected = normalize_expected(expected);
        let message = build_message(&expected, found);
        Self {
            message,
            expected,
            found,
            location,
        }
    }

    /// Returns the byte offset where the error starts.
    pub fn offset(&self) -> usize {
        self.location.start.offset
    }

    /// Returns `true` if `expectation` is among the expected alternatives.
    pub fn expects(&self, expectation: &Expectation) -> bool {
        self.expected.contains(expectation)
    }

    /// Renders the error with the offending source line and a caret marker.
    ///
    /// ```text
    /// Error: Expected "\"" but end of input found.
    ///  --> <input>:1:19
    ///   |
    /// 1 | from:"unterminated
    ///   |                   ^
    /// ```
    pub fn render(&self, input: &str) -> String {
        let start = self.location.start;
        let end = self.location.end;
        let source = self
            .location
            .source
            .as_deref()
            .unwrap_or(DEFAULT_SOURCE_NAME);
        let loc = format!("{}:{}:{}", source, start.line, start.column);

        let mut out = format!("Error: {}", self.message);
        let lines: Vec<&str> = split_lines(input);
        let Some(line) = lines.get(start.line.saturating_sub(1)) else {
            out.push_str(&format!("\n at {loc}"));
            return out;
        };

        let filler = " ".repeat(start.line.to_string().len());
        let last = if start.line == end.line {
            end.column
        } else {
            line.chars().count() + 1
        };
        let hat_len = last.saturating_sub(start.column).max(1);

        out.push_str(&format!("\n --> {loc}\n"));
        out.push_str(&format!("{filler} |\n"));
        out.push_str(&format!("{} | {}\n", start.line, line));
        out.push_str(&format!(
            "{filler} | {}{}",
            " ".repeat(start.column.saturating_sub(1)),
            "^".repeat(hat_len)
        ));
        out
    }
}

/// Splits on `\r\n`, `\n` or `\r`.
fn split_lines(input: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = input;
    while let Some(idx) = rest.find(&['\r', '\n'][..]) {
        lines.push(&rest[..idx]);
        let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[idx + skip..];
    }
    lines.push(rest);
    lines
}

/// A start/end span in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Name of the source, from `ParseOptions::grammar_source`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Start of the span.
    pub start: SourcePosition,
    /// End of the span (exclusive).
    pub end: SourcePosition,
}

/// A position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    /// Byte offset.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

/// Something the parser expected at the failure position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Expectation {
    /// An exact literal, e.g. `"\""`.
    Literal {
        /// The literal text.
        text: &'static str,
    },
    /// A character class, e.g. `[^"\r\n]`.
    Class(CharClass),
    /// The end of the input.
    End,
    /// A named rule, e.g. `key` or `operator`.
    Other {
        /// The rule description.
        description: &'static str,
    },
}

impl Expectation {
    /// Shorthand for [`Expectation::Literal`].
    pub const fn literal(text: &'static str) -> Self {
        Expectation::Literal { text }
    }

    /// Shorthand for [`Expectation::Other`].
    pub const fn other(description: &'static str) -> Self {
        Expectation::Other { description }
    }

    /// Shorthand for [`Expectation::Class`].
    pub const fn class(class: CharClass) -> Self {
        Expectation::Class(class)
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Literal { text } => write!(f, "\"{}\"", literal_escape(text)),
            Expectation::Class(class) => write!(f, "{}", class),
            Expectation::End => f.write_str("end of input"),
            Expectation::Other { description } => f.write_str(description),
        }
    }
}

/// Sorts by description and drops entries with a duplicate description.
fn normalize_expected(mut expected: Vec<Expectation>) -> Vec<Expectation> {
    expected.sort_by_cached_key(ToString::to_string);
    expected.dedup_by(|a, b| a.to_string() == b.to_string());
    expected
}

fn build_message(expected: &[Expectation], found: Option<char>) -> String {
    let descriptions: Vec<String> = expected.iter().map(ToString::to_string).collect();
    let expected_desc = match descriptions.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    };
    let found_desc = match found {
        Some(c) => format!("\"{}\"", literal_escape(&c.to_string())),
        None => "end of input".to_string(),
    };
    format!("Expected {expected_desc} but {found_desc} found.")
}

/// Escapes a literal for display inside double quotes.
pub(crate) fn literal_escape(s: &str) -> String {
    escape_with(s, &['\\', '"'])
}

/// Escapes a class member for display inside `[...]`.
pub(crate) fn class_escape(s: &str) -> String {
    escape_with(s, &['\\', ']', '^', '-'])
}

fn escape_with(s: &str, backslashed: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            c if backslashed.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x10 => out.push_str(&format!("\\x0{:X}", c as u32)),
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => {
                out.push_str(&format!("\\x{:X}", c as u32))
            }
            c => out.push(c),
        }
    }
    out
}

/// Error returned when a key or operator name is not recognized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeywordError {
    /// The string is not one of the search keys.
    #[error("unknown search key: {key}")]
    UnknownKey {
        /// The unrecognized key.
        key: String,
    },

    /// The string is not an operator tag or symbol.
    #[error("unknown operator: {operator}")]
    UnknownOperator {
        /// The unrecognized operator.
        operator: String,
    },
}

impl KeywordError {
    /// Creates an unknown key error.
    pub fn unknown_key(key: impl Into<String>) -> Self {
        KeywordError::UnknownKey { key: key.into() }
    }

    /// Creates an unknown operator error.
    pub fn unknown_operator(operator: impl Into<String>) -> Self {
        KeywordError::UnknownOperator {
            operator: operator.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::QUOTED_CHAR;

    fn position(offset: usize, column: usize) -> SourcePosition {
        SourcePosition {
            offset,
            line: 1,
            column,
        }
    }

    fn location(start: usize, end: usize) -> Location {
        Location {
            source: None,
            start: position(start, start + 1),
            end: position(end, end + 1),
        }
    }

    #[test]
    fn test_expectation_descriptions() {
        assert_eq!(Expectation::literal("\"").to_string(), "\"\\\"\"");
        assert_eq!(Expectation::literal("!=").to_string(), "\"!=\"");
        assert_eq!(Expectation::class(QUOTED_CHAR).to_string(), "[^\"\\r\\n]");
        assert_eq!(Expectation::End.to_string(), "end of input");
        assert_eq!(Expectation::other("key").to_string(), "key");
    }

    #[test]
    fn test_message_single_expectation() {
        let err = SyntaxError::new(vec![Expectation::literal("\"")], None, location(5, 5));
        assert_eq!(err.message, "Expected \"\\\"\" but end of input found.");
        assert_eq!(err.to_string(), err.message);
    }

    #[test]
    fn test_message_sorts_and_dedups() {
        let err = SyntaxError::new(
            vec![
                Expectation::other("word"),
                Expectation::End,
                Expectation::other("key"),
                Expectation::other("word"),
            ],
            Some('"'),
            location(5, 6),
        );
        assert_eq!(
            err.expected,
            vec![
                Expectation::End,
                Expectation::other("key"),
                Expectation::other("word"),
            ]
        );
        assert_eq!(
            err.message,
            "Expected end of input, key, or word but \"\\\"\" found."
        );
    }

    #[test]
    fn test_message_two_expectations() {
        let err = SyntaxError::new(
            vec![Expectation::other("quote"), Expectation::other("operator")],
            Some('x'),
            location(0, 1),
        );
        assert_eq!(err.message, "Expected operator or quote but \"x\" found.");
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(literal_escape("a\tb"), "a\\tb");
        assert_eq!(literal_escape("\u{1}"), "\\x01");
        assert_eq!(literal_escape("\u{1b}"), "\\x1B");
        assert_eq!(class_escape("-"), "\\-");
        assert_eq!(class_escape("]"), "\\]");
    }

    #[test]
    fn test_render_points_at_column() {
        let input = "from:\"unterminated";
        let err = SyntaxError::new(
            vec![Expectation::literal("\"")],
            None,
            Location {
                source: Some("search".to_string()),
                start: position(18, 19),
                end: position(18, 19),
            },
        );
        let rendered = err.render(input);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Error: Expected \"\\\"\" but end of input found.");
        assert_eq!(lines[1], " --> search:1:19");
        assert_eq!(lines[2], "  |");
        assert_eq!(lines[3], "1 | from:\"unterminated");
        assert_eq!(lines[4], format!("  | {}^", " ".repeat(18)));
    }

    #[test]
    fn test_render_without_source_line() {
        let err = SyntaxError::new(
            vec![Expectation::End],
            Some('x'),
            Location {
                source: None,
                start: SourcePosition {
                    offset: 0,
                    line: 4,
                    column: 1,
                },
                end: SourcePosition {
                    offset: 1,
                    line: 4,
                    column: 2,
                },
            },
        );
        assert!(err.render("x").ends_with("\n at <input>:4:1"));
    }
}
