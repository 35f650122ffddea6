//! Output types produced by the query parser.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeywordError;

/// A filter key recognized by the query grammar.
///
/// Keys are matched case-sensitively and in the order of [`SearchKey::ALL`];
/// the first literal that matches at the current position wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchKey {
    /// `in` - the report or workspace an expense lives in.
    In,
    /// `currency`
    Currency,
    /// `tag`
    Tag,
    /// `category`
    Category,
    /// `to` - the recipient.
    To,
    /// `taxRate`
    TaxRate,
    /// `from` - the submitter.
    From,
    /// `expenseType`
    ExpenseType,
    /// `type`
    Type,
    /// `status`
    Status,
}

impl SearchKey {
    /// All keys in match-priority order.
    pub const ALL: [SearchKey; 10] = [
        SearchKey::In,
        SearchKey::Currency,
        SearchKey::Tag,
        SearchKey::Category,
        SearchKey::To,
        SearchKey::TaxRate,
        SearchKey::From,
        SearchKey::ExpenseType,
        SearchKey::Type,
        SearchKey::Status,
    ];

    /// Returns the literal spelling of the key as it appears in a query.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKey::In => "in",
            SearchKey::Currency => "currency",
            SearchKey::Tag => "tag",
            SearchKey::Category => "category",
            SearchKey::To => "to",
            SearchKey::TaxRate => "taxRate",
            SearchKey::From => "from",
            SearchKey::ExpenseType => "expenseType",
            SearchKey::Type => "type",
            SearchKey::Status => "status",
        }
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKey {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| KeywordError::unknown_key(s))
    }
}

/// A comparison operator between a key and its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// `:` or `=`
    Eq,
    /// `!=`
    Neq,
    /// `>=`
    Gte,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `<`
    Lt,
}

impl Operator {
    /// All operators.
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gte,
        Operator::Gt,
        Operator::Lte,
        Operator::Lt,
    ];

    /// Returns the operator tag (`eq`, `neq`, `gte`, `gt`, `lte`, `lt`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gte => "gte",
            Operator::Gt => "gt",
            Operator::Lte => "lte",
            Operator::Lt => "lt",
        }
    }

    /// Returns the canonical source spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => ":",
            Operator::Neq => "!=",
            Operator::Gte => ">=",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Lt => "<",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = KeywordError;

    /// Accepts either the tag (`gte`) or a source spelling (`>=`, `=`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "=" {
            return Ok(Operator::Eq);
        }
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s || op.symbol() == s)
            .ok_or_else(|| KeywordError::unknown_operator(s))
    }
}

/// One key/value constraint extracted from a query.
///
/// A comma-separated value list produces one `Filter` per value, all sharing
/// the same key. Filters never carry the operator; it only influences the
/// autocomplete hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    /// The filter key, or `None` for a free-text term.
    pub key: Option<SearchKey>,
    /// The value, without surrounding quotes.
    pub value: String,
}

impl Filter {
    /// Creates a keyed filter.
    pub fn new(key: SearchKey, value: impl Into<String>) -> Self {
        Self {
            key: Some(key),
            value: value.into(),
        }
    }

    /// Creates a free-text filter.
    pub fn free_text(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    /// Returns `true` if this filter has no key.
    pub fn is_free_text(&self) -> bool {
        self.key.is_none()
    }
}

/// Renders the canonical source form: `key:value`, or just `value` for free text.
///
/// Values that are empty or contain whitespace or commas are double-quoted so
/// that they parse back into a single value. Free text that begins with a key
/// literal is quoted too, so it cannot be read back as a keyed filter.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted = match self.key {
            Some(key) => {
                write!(f, "{}:", key)?;
                needs_quotes(&self.value)
            }
            None => needs_quotes(&self.value) || starts_with_key(&self.value),
        };
        if quoted {
            write!(f, "\"{}\"", self.value)
        } else {
            f.write_str(&self.value)
        }
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c == ',' || c.is_whitespace())
}

fn starts_with_key(value: &str) -> bool {
    SearchKey::ALL
        .iter()
        .any(|key| value.starts_with(key.as_str()))
}

/// A single value produced by the identifier rule, with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValueToken {
    /// The value text (quotes stripped).
    pub(crate) value: String,
    /// Byte offset of the token in the input.
    pub(crate) start: usize,
    /// Byte length of the token in the input, including any quotes.
    pub(crate) length: usize,
}

/// Where a filter's value sits in the input, for highlighting.
///
/// `ParseResult::ranges` holds one entry per filter, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRange {
    /// The filter key, or `None` for a free-text term.
    pub key: Option<SearchKey>,
    /// The value, without surrounding quotes.
    pub value: String,
    /// Byte offset of the value in the input.
    pub start: usize,
    /// Byte length of the value in the input, including any quotes.
    pub length: usize,
}

impl FilterRange {
    pub(crate) fn new(key: Option<SearchKey>, token: ValueToken) -> Self {
        Self {
            key,
            value: token.value,
            start: token.start,
            length: token.length,
        }
    }

    /// Returns the byte range of the value in the input.
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.length
    }
}

impl From<&FilterRange> for Filter {
    fn from(range: &FilterRange) -> Self {
        Self {
            key: range.key,
            value: range.value.clone(),
        }
    }
}

/// Describes the key/value the cursor is positioned in, for suggestion UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteHint {
    /// The key whose value is being typed.
    pub key: SearchKey,
    /// The operator between the key and the value.
    pub operator: Operator,
    /// The value typed so far, or `None` when only the key and operator exist.
    pub value: Option<String>,
    /// Byte offset of the value in the input.
    pub start: usize,
    /// Byte length of the value in the input (zero when there is no value).
    pub length: usize,
}

impl AutocompleteHint {
    /// Returns the byte range a suggestion should replace.
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.length
    }
}

/// The result of parsing a search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Filters in left-to-right input order.
    pub filters: Vec<Filter>,
    /// The source span of each filter, parallel to `filters`.
    #[serde(default)]
    pub ranges: Vec<FilterRange>,
    /// The autocomplete hint for the clause at the cursor, if any.
    pub autocomplete: Option<AutocompleteHint>,
}

impl ParseResult {
    /// Returns `true` if no filters were produced.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the values given for `key`, in input order.
    pub fn values_for(&self, key: SearchKey) -> impl Iterator<Item = &str> + '_ {
        self.filters
            .iter()
            .filter(move |filter| filter.key == Some(key))
            .map(|filter| filter.value.as_str())
    }

    /// Re-serializes the filters into a canonical query string.
    ///
    /// Parsing the returned string yields the same filter sequence.
    pub fn to_query_string(&self) -> String {
        self.filters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_round_trips_literal() {
        for key in SearchKey::ALL {
            assert_eq!(key.as_str().parse::<SearchKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_search_key_is_case_sensitive() {
        assert!("TaxRate".parse::<SearchKey>().is_err());
        assert_eq!("taxRate".parse::<SearchKey>().unwrap(), SearchKey::TaxRate);
    }

    #[test]
    fn test_operator_from_tag_and_symbol() {
        assert_eq!("gte".parse::<Operator>().unwrap(), Operator::Gte);
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::Gte);
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!(":".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!(
            "~".parse::<Operator>().unwrap_err(),
            KeywordError::unknown_operator("~")
        );
    }

    #[test]
    fn test_filter_display_quotes_when_needed() {
        assert_eq!(Filter::new(SearchKey::Tag, "a").to_string(), "tag:a");
        assert_eq!(
            Filter::new(SearchKey::From, "john doe").to_string(),
            "from:\"john doe\""
        );
        assert_eq!(Filter::new(SearchKey::Tag, "a,b").to_string(), "tag:\"a,b\"");
        assert_eq!(Filter::new(SearchKey::Tag, "").to_string(), "tag:\"\"");
        assert_eq!(Filter::free_text("lunch").to_string(), "lunch");
    }

    #[test]
    fn test_serde_uses_wire_spelling() {
        let filter = Filter::new(SearchKey::ExpenseType, "cash");
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"key": "expenseType", "value": "cash"}));

        let json = serde_json::to_value(Operator::Neq).unwrap();
        assert_eq!(json, serde_json::json!("neq"));
    }

    #[test]
    fn test_values_for() {
        let result = ParseResult {
            filters: vec![
                Filter::new(SearchKey::Tag, "a"),
                Filter::new(SearchKey::From, "me"),
                Filter::new(SearchKey::Tag, "b"),
            ],
            ranges: Vec::new(),
            autocomplete: None,
        };
        let tags: Vec<_> = result.values_for(SearchKey::Tag).collect();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_free_text_starting_with_key_is_quoted() {
        assert_eq!(Filter::free_text("status:open").to_string(), "\"status:open\"");
        assert_eq!(Filter::free_text("tag").to_string(), "\"tag\"");
        assert_eq!(Filter::free_text("lunch").to_string(), "lunch");
        // A keyed value may start with a key literal; it follows the operator.
        assert_eq!(Filter::new(SearchKey::Tag, "to:me").to_string(), "tag:to:me");
    }

    #[test]
    fn test_filter_range_span_and_filter() {
        let range = FilterRange::new(
            Some(SearchKey::From),
            ValueToken {
                value: "john doe".to_string(),
                start: 5,
                length: 10,
            },
        );
        assert_eq!(range.span(), 5..15);
        assert_eq!(Filter::from(&range), Filter::new(SearchKey::From, "john doe"));
    }

    #[test]
    fn test_parse_result_without_ranges_deserializes() {
        let json = r#"{"filters": [{"key": "tag", "value": "a"}], "autocomplete": null}"#;
        let result: ParseResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.filters, vec![Filter::new(SearchKey::Tag, "a")]);
        assert!(result.ranges.is_empty());
    }
}
