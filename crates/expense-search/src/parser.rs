//! Backtracking recursive descent parser for search queries.

use tracing::{debug, trace};

use crate::ast::{AutocompleteHint, Filter, FilterRange, Operator, ParseResult, SearchKey, ValueToken};
use crate::error::{Expectation, QueryResult, SyntaxError};
use crate::lexer::{
    char_at, split_bare_run, CharClass, OperatorPattern, BARE_CHAR, OPERATOR_TABLE, QUOTE,
    QUOTED_CHAR, WHITESPACE,
};
use crate::options::ParseOptions;
use crate::position::PositionTracker;

/// Parser for expense search queries.
///
/// Every call builds a fresh parser, so the autocomplete hint and the failure
/// bookkeeping never leak between calls.
///
/// # Grammar
///
/// ```text
/// query         ::= _ filterList _
/// filterList    ::= (filter (and filter)*)?
/// and           ::= _
/// filter        ::= defaultFilter | freeTextFilter
/// defaultFilter ::= _ key _ operator _ identifier?
/// freeText      ::= _ identifier _
/// key           ::= "in" | "currency" | "tag" | "category" | "to"
///                 | "taxRate" | "from" | "expenseType" | "type" | "status"
/// operator      ::= [:=] | "!=" | ">=" | ">" | "<=" | "<"
/// identifier    ::= (quotedString | word)+
/// quotedString  ::= '"' [^"\r\n]* '"'
/// word          ::= [^ "\t\n\r]+
/// _             ::= [ \t\r\n]*
/// ```
///
/// Alternatives are tried in order and a failed alternative rolls back to the
/// position it started from. Nothing is memoized.
///
/// # Example
///
/// ```
/// use expense_search_rs::{Filter, QueryParser, SearchKey};
///
/// let result = QueryParser::parse("tag:travel,food lunch").unwrap();
/// assert_eq!(
///     result.filters,
///     vec![
///         Filter::new(SearchKey::Tag, "travel"),
///         Filter::new(SearchKey::Tag, "food"),
///     ]
/// );
/// // The trailing free-text term clears the hint.
/// assert!(result.autocomplete.is_none());
/// ```
pub struct QueryParser<'a> {
    input: &'a str,
    position: usize,
    /// Furthest position at which a match failed.
    max_fail_position: usize,
    /// Expectations recorded at `max_fail_position`.
    max_fail_expected: Vec<Expectation>,
    /// Nesting depth of named rules; failures inside them are not recorded.
    silent_fails: usize,
    autocomplete: Option<AutocompleteHint>,
    cursor: usize,
    include_free_text: bool,
    positions: PositionTracker<'a>,
}

impl<'a> QueryParser<'a> {
    /// Parses a search query with default options.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the input cannot be consumed entirely.
    /// In practice this means an unterminated quoted value.
    pub fn parse(input: &'a str) -> QueryResult<ParseResult> {
        Self::parse_with_options(input, &ParseOptions::default())
    }

    /// Parses a search query.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the input cannot be consumed entirely.
    pub fn parse_with_options(input: &'a str, options: &ParseOptions) -> QueryResult<ParseResult> {
        debug!(len = input.len(), cursor = ?options.cursor, "parsing search query");

        let mut parser = Self::new(input, options);
        let ranges = parser.parse_query();

        if parser.position == input.len() {
            return Ok(ParseResult {
                filters: ranges.iter().map(Filter::from).collect(),
                ranges,
                autocomplete: parser.autocomplete,
            });
        }

        parser.fail(Expectation::End);
        let error = parser.syntax_error(options.grammar_source.clone());
        debug!(
            offset = error.offset(),
            expected = error.expected.len(),
            "search query rejected"
        );
        Err(error)
    }

    fn new(input: &'a str, options: &ParseOptions) -> Self {
        let cursor = options
            .cursor
            .map_or(input.len(), |cursor| cursor.min(input.len()));
        Self {
            input,
            position: 0,
            max_fail_position: 0,
            max_fail_expected: Vec::new(),
            silent_fails: 0,
            autocomplete: None,
            cursor,
            include_free_text: options.include_free_text,
            positions: PositionTracker::new(input),
        }
    }

    fn syntax_error(&mut self, source: Option<String>) -> SyntaxError {
        let pos = self.max_fail_position;
        let found = char_at(self.input, pos);
        let end = found.map_or(pos, |c| pos + c.len_utf8());
        let location = self.positions.location(pos, end, source);
        SyntaxError::new(std::mem::take(&mut self.max_fail_expected), found, location)
    }

    // ==================== Failure Tracking ====================

    /// Records a failed expectation at the current position.
    fn fail(&mut self, expected: Expectation) {
        if self.silent_fails > 0 || self.position < self.max_fail_position {
            return;
        }
        if self.position > self.max_fail_position {
            self.max_fail_position = self.position;
            self.max_fail_expected.clear();
        }
        self.max_fail_expected.push(expected);
    }

    fn silently<T>(&mut self, rule: impl FnOnce(&mut Self) -> T) -> T {
        self.silent_fails += 1;
        let result = rule(self);
        self.silent_fails -= 1;
        result
    }

    /// Runs `rule` silently and reports `description` if it fails.
    fn named<T>(
        &mut self,
        description: &'static str,
        rule: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let result = self.silently(rule);
        if result.is_none() {
            self.fail(Expectation::other(description));
        }
        result
    }

    // ==================== Primitives ====================

    fn match_literal(&mut self, literal: &'static str) -> bool {
        let matched = self
            .input
            .get(self.position..)
            .is_some_and(|rest| rest.starts_with(literal));
        if matched {
            self.position += literal.len();
        } else {
            self.fail(Expectation::literal(literal));
        }
        matched
    }

    fn match_class(&mut self, class: CharClass) -> Option<char> {
        match char_at(self.input, self.position) {
            Some(c) if class.matches(c) => {
                self.position += c.len_utf8();
                Some(c)
            }
            _ => {
                self.fail(Expectation::class(class));
                None
            }
        }
    }

    /// `_ ::= [ \t\r\n]*`
    fn skip_whitespace(&mut self) {
        self.silently(|p| while p.match_class(WHITESPACE).is_some() {});
        self.fail(Expectation::other("whitespace"));
    }

    // ==================== Rules ====================

    /// `query ::= _ filterList _`
    fn parse_query(&mut self) -> Vec<FilterRange> {
        self.skip_whitespace();
        let filters = self.parse_filter_list();
        self.skip_whitespace();
        filters
    }

    /// `filterList ::= (filter (and filter)*)?`
    fn parse_filter_list(&mut self) -> Vec<FilterRange> {
        let mut filters = Vec::new();
        let Some(first) = self.parse_filter() else {
            return filters;
        };
        filters.extend(first);

        loop {
            let start = self.position;
            self.parse_logical_and();
            match self.parse_filter() {
                Some(next) => filters.extend(next),
                None => {
                    self.position = start;
                    break;
                }
            }
        }
        filters
    }

    /// `and ::= _`
    fn parse_logical_and(&mut self) {
        self.skip_whitespace();
    }

    /// `filter ::= defaultFilter | freeTextFilter`
    fn parse_filter(&mut self) -> Option<Vec<FilterRange>> {
        let start = self.position;
        if let Some(filters) = self.parse_default_filter() {
            return Some(filters);
        }
        if let Some(filters) = self.parse_free_text_filter() {
            return Some(filters);
        }
        self.position = start;
        None
    }

    /// `defaultFilter ::= _ key _ operator _ identifier?`
    fn parse_default_filter(&mut self) -> Option<Vec<FilterRange>> {
        let start = self.position;
        self.skip_whitespace();
        let key_start = self.position;

        let Some(key) = self.parse_key() else {
            self.position = start;
            return None;
        };
        self.skip_whitespace();
        let Some(operator) = self.parse_operator() else {
            self.position = start;
            return None;
        };
        self.skip_whitespace();
        let tokens = self.parse_identifier().unwrap_or_default();

        let at_cursor = key_start <= self.cursor;
        let Some(last) = tokens.last() else {
            if at_cursor {
                let hint = AutocompleteHint {
                    key,
                    operator,
                    value: None,
                    start: self.position,
                    length: 0,
                };
                self.set_hint(Some(hint));
            }
            return Some(Vec::new());
        };

        if at_cursor {
            let hint = AutocompleteHint {
                key,
                operator,
                value: Some(last.value.clone()),
                start: last.start,
                length: last.length,
            };
            self.set_hint(Some(hint));
        }
        Some(
            tokens
                .into_iter()
                .map(|token| FilterRange::new(Some(key), token))
                .collect(),
        )
    }

    /// `freeTextFilter ::= _ identifier _`
    fn parse_free_text_filter(&mut self) -> Option<Vec<FilterRange>> {
        let start = self.position;
        self.skip_whitespace();
        let text_start = self.position;

        let Some(tokens) = self.parse_identifier() else {
            self.position = start;
            return None;
        };
        self.skip_whitespace();

        if text_start <= self.cursor {
            self.set_hint(None);
        }
        if !self.include_free_text {
            return Some(Vec::new());
        }
        Some(
            tokens
                .into_iter()
                .map(|token| FilterRange::new(None, token))
                .collect(),
        )
    }

    fn set_hint(&mut self, hint: Option<AutocompleteHint>) {
        trace!(?hint, "autocomplete hint updated");
        self.autocomplete = hint;
    }

    /// Matches the first key literal, in [`SearchKey::ALL`] order.
    fn parse_key(&mut self) -> Option<SearchKey> {
        self.named("key", |p| {
            SearchKey::ALL
                .into_iter()
                .find(|key| p.match_literal(key.as_str()))
        })
    }

    fn parse_operator(&mut self) -> Option<Operator> {
        self.named("operator", |p| {
            OPERATOR_TABLE.iter().find_map(|(pattern, operator)| {
                let matched = match pattern {
                    OperatorPattern::Class(class) => p.match_class(*class).is_some(),
                    OperatorPattern::Literal(literal) => p.match_literal(*literal),
                };
                matched.then_some(*operator)
            })
        })
    }

    /// `identifier ::= (quotedString | word)+`
    ///
    /// Returns `None` if no segment matched. A match may still yield zero
    /// tokens, e.g. for a run of bare commas.
    fn parse_identifier(&mut self) -> Option<Vec<ValueToken>> {
        let mut tokens = Vec::new();
        let mut matched = false;
        loop {
            if let Some(token) = self.parse_quoted_string() {
                tokens.push(token);
            } else if let Some(run) = self.parse_word() {
                tokens.extend(run);
            } else {
                break;
            }
            matched = true;
        }
        matched.then_some(tokens)
    }

    /// `quotedString ::= '"' [^"\r\n]* '"'`
    ///
    /// The content is a single value and is not split on commas. Once the
    /// opening quote is consumed a missing closing quote is recorded where it
    /// was needed.
    fn parse_quoted_string(&mut self) -> Option<ValueToken> {
        let start = self.position;
        if !self.silently(|p| p.match_literal(QUOTE)) {
            self.fail(Expectation::other("quote"));
            return None;
        }

        let body_start = self.position;
        self.silently(|p| while p.match_class(QUOTED_CHAR).is_some() {});
        let body_end = self.position;

        if !self.match_literal(QUOTE) {
            self.position = start;
            self.fail(Expectation::other("quote"));
            return None;
        }

        Some(ValueToken {
            value: self.input[body_start..body_end].to_string(),
            start,
            length: self.position - start,
        })
    }

    /// `word ::= [^ "\t\n\r]+`, trimmed and split on commas.
    fn parse_word(&mut self) -> Option<Vec<ValueToken>> {
        let start = self.position;
        self.named("word", |p| {
            while p.match_class(BARE_CHAR).is_some() {}
            (p.position > start).then(|| split_bare_run(&p.input[start..p.position], start))
        })
    }
}
