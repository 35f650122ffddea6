//! Options for a single parse call.

use serde::{Deserialize, Serialize};

/// Per-call parse options.
///
/// The defaults reproduce the plain behaviour: no source name, the hint
/// describes the last clause in the input, and free text is consumed without
/// producing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Name reported as the source of error locations.
    #[serde(alias = "source", skip_serializing_if = "Option::is_none")]
    pub grammar_source: Option<String>,

    /// Byte offset of the text cursor.
    ///
    /// Clauses starting after the cursor do not touch the autocomplete hint.
    /// Offsets past the end of the input are clamped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<usize>,

    /// Emit free-text terms as filters with no key.
    #[serde(alias = "free_text")]
    pub include_free_text: bool,
}

impl ParseOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name used in error locations.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.grammar_source = Some(source.into());
        self
    }

    /// Sets the cursor offset.
    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Enables or disables free-text filters.
    pub fn with_free_text(mut self, include: bool) -> Self {
        self.include_free_text = include;
        self
    }
}
