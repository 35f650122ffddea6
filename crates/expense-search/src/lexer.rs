//! Lexical primitives for search queries.
//!
//! Character classes, the ordered operator table and the splitting of bare
//! runs into comma-separated value tokens. The parser drives these; nothing
//! here tracks failures.

use std::fmt;

use serde::Serialize;

use crate::ast::{Operator, ValueToken};
use crate::error::class_escape;

/// A set of characters, optionally inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CharClass {
    /// The listed characters.
    pub parts: &'static [char],
    /// If `true`, the class matches any character *not* listed.
    pub inverted: bool,
}

impl CharClass {
    /// Creates a character class.
    pub const fn new(parts: &'static [char], inverted: bool) -> Self {
        Self { parts, inverted }
    }

    /// Returns `true` if `c` belongs to the class.
    pub fn matches(&self, c: char) -> bool {
        self.parts.contains(&c) != self.inverted
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if self.inverted {
            f.write_str("^")?;
        }
        for part in self.parts {
            f.write_str(&class_escape(&part.to_string()))?;
        }
        f.write_str("]")
    }
}

/// Padding between tokens.
pub const WHITESPACE: CharClass = CharClass::new(&[' ', '\t', '\r', '\n'], false);

/// Body of a quoted string.
pub const QUOTED_CHAR: CharClass = CharClass::new(&['"', '\r', '\n'], true);

/// Body of a bare word.
pub const BARE_CHAR: CharClass = CharClass::new(&[' ', '"', '\t', '\n', '\r'], true);

/// The single-character spellings of the equality operator.
pub const EQUALS: CharClass = CharClass::new(&[':', '='], false);

/// The delimiter of quoted values.
pub const QUOTE: &str = "\"";

/// How an operator is spelled in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperatorPattern {
    /// One character from a class.
    Class(CharClass),
    /// An exact literal.
    Literal(&'static str),
}

/// Operators in match order.
///
/// `[:=]` and the two-character operators come before the bare `>`/`<` so
/// that `>=` is never read as `>` followed by a stray `=`.
pub(crate) const OPERATOR_TABLE: [(OperatorPattern, Operator); 6] = [
    (OperatorPattern::Class(EQUALS), Operator::Eq),
    (OperatorPattern::Literal("!="), Operator::Neq),
    (OperatorPattern::Literal(">="), Operator::Gte),
    (OperatorPattern::Literal(">"), Operator::Gt),
    (OperatorPattern::Literal("<="), Operator::Lte),
    (OperatorPattern::Literal("<"), Operator::Lt),
];

/// Returns the character starting at byte offset `pos`.
pub(crate) fn char_at(input: &str, pos: usize) -> Option<char> {
    input.get(pos..)?.chars().next()
}

/// Splits a bare run into value tokens.
///
/// The run is trimmed and split on `,`; empty pieces are dropped. `start` is
/// the byte offset of the run in the input, and each token's span is the
/// exact span of its piece.
pub(crate) fn split_bare_run(run: &str, start: usize) -> Vec<ValueToken> {
    let trimmed_start = run.trim_start();
    let lead = run.len() - trimmed_start.len();
    let trimmed = trimmed_start.trim_end();

    let mut tokens = Vec::new();
    let mut offset = start + lead;
    for piece in trimmed.split(',') {
        if !piece.is_empty() {
            tokens.push(ValueToken {
                value: piece.to_string(),
                start: offset,
                length: piece.len(),
            });
        }
        offset += piece.len() + 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &[ValueToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_whitespace_class() {
        for c in [' ', '\t', '\r', '\n'] {
            assert!(WHITESPACE.matches(c));
        }
        assert!(!WHITESPACE.matches('a'));
        assert!(!WHITESPACE.matches('\u{a0}'));
    }

    #[test]
    fn test_quoted_char_class() {
        assert!(QUOTED_CHAR.matches(' '));
        assert!(QUOTED_CHAR.matches(','));
        assert!(!QUOTED_CHAR.matches('"'));
        assert!(!QUOTED_CHAR.matches('\n'));
        assert!(!QUOTED_CHAR.matches('\r'));
    }

    #[test]
    fn test_bare_char_class() {
        assert!(BARE_CHAR.matches(':'));
        assert!(BARE_CHAR.matches(','));
        assert!(BARE_CHAR.matches('é'));
        assert!(!BARE_CHAR.matches(' '));
        assert!(!BARE_CHAR.matches('\t'));
        assert!(!BARE_CHAR.matches('"'));
    }

    #[test]
    fn test_class_display() {
        assert_eq!(EQUALS.to_string(), "[:=]");
        assert_eq!(BARE_CHAR.to_string(), "[^ \"\\t\\n\\r]");
    }

    #[test]
    fn test_operator_table_order() {
        let ops: Vec<Operator> = OPERATOR_TABLE.iter().map(|(_, op)| *op).collect();
        assert_eq!(
            ops,
            vec![
                Operator::Eq,
                Operator::Neq,
                Operator::Gte,
                Operator::Gt,
                Operator::Lte,
                Operator::Lt
            ]
        );
    }

    #[test]
    fn test_char_at() {
        assert_eq!(char_at("a€b", 0), Some('a'));
        assert_eq!(char_at("a€b", 1), Some('€'));
        assert_eq!(char_at("a€b", 4), Some('b'));
        assert_eq!(char_at("a€b", 5), None);
        assert_eq!(char_at("a€b", 2), None);
    }

    #[test]
    fn test_split_single_value() {
        let tokens = split_bare_run("food", 4);
        assert_eq!(
            tokens,
            vec![ValueToken {
                value: "food".to_string(),
                start: 4,
                length: 4
            }]
        );
    }

    #[test]
    fn test_split_comma_list_offsets() {
        let tokens = split_bare_run("a,bb,ccc", 4);
        assert_eq!(values(&tokens), vec!["a", "bb", "ccc"]);
        let spans: Vec<_> = tokens.iter().map(|t| (t.start, t.length)).collect();
        assert_eq!(spans, vec![(4, 1), (6, 2), (9, 3)]);
    }

    #[test]
    fn test_split_drops_empty_pieces_but_keeps_offsets_exact() {
        let tokens = split_bare_run(",a,,b,", 10);
        assert_eq!(values(&tokens), vec!["a", "b"]);
        let spans: Vec<_> = tokens.iter().map(|t| (t.start, t.length)).collect();
        assert_eq!(spans, vec![(11, 1), (14, 1)]);
    }

    #[test]
    fn test_split_only_commas() {
        assert!(split_bare_run(",,", 0).is_empty());
    }

    #[test]
    fn test_split_trims_unicode_whitespace() {
        let run = "\u{a0}x\u{a0}";
        let tokens = split_bare_run(run, 0);
        assert_eq!(values(&tokens), vec!["x"]);
        assert_eq!(tokens[0].start, '\u{a0}'.len_utf8());
    }
}
