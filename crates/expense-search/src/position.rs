//! Line/column tracking for byte offsets.

use std::collections::BTreeMap;

use crate::error::{Location, SourcePosition};

/// A 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineColumn {
    line: usize,
    column: usize,
}

/// Maps byte offsets to line/column pairs.
///
/// Results are cached sparsely. A lookup walks forward from the nearest cached
/// offset at or before the requested one instead of rescanning from the start.
#[derive(Debug)]
pub(crate) struct PositionTracker<'a> {
    input: &'a str,
    cache: BTreeMap<usize, LineColumn>,
}

impl<'a> PositionTracker<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        let mut cache = BTreeMap::new();
        cache.insert(0, LineColumn { line: 1, column: 1 });
        Self { input, cache }
    }

    fn line_column(&mut self, pos: usize) -> LineColumn {
        if let Some(details) = self.cache.get(&pos) {
            return *details;
        }

        let (from, nearest) = self
            .cache
            .range(..pos)
            .next_back()
            .map(|(&offset, &details)| (offset, details))
            .unwrap_or((0, LineColumn { line: 1, column: 1 }));

        let mut details = nearest;
        let end = pos.min(self.input.len());
        for c in self.input.get(from..end).unwrap_or_default().chars() {
            if c == '\n' {
                details.line += 1;
                details.column = 1;
            } else {
                details.column += 1;
            }
        }

        self.cache.insert(pos, details);
        details
    }

    /// Returns the full position for a byte offset.
    pub(crate) fn position(&mut self, offset: usize) -> SourcePosition {
        let LineColumn { line, column } = self.line_column(offset);
        SourcePosition {
            offset,
            line,
            column,
        }
    }

    /// Returns the location spanning `start..end`.
    pub(crate) fn location(&mut self, start: usize, end: usize, source: Option<String>) -> Location {
        Location {
            source,
            start: self.position(start),
            end: self.position(end),
        }
    }

    #[cfg(test)]
    fn cached_offsets(&self) -> Vec<usize> {
        self.cache.keys().copied().collect()
    }
}
