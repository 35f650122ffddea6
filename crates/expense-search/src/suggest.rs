//! "Did you mean" suggestions for mistyped keys.

use strsim::levenshtein;

use crate::ast::SearchKey;

/// Maximum Levenshtein distance to consider a key as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Finds the key closest to `word`, ignoring case.
///
/// Returns `None` when `word` already is a key's exact spelling or when no
/// key is within the distance threshold.
///
/// # Example
///
/// ```
/// use expense_search_rs::{suggest_key, SearchKey};
///
/// assert_eq!(suggest_key("catgory"), Some(SearchKey::Category));
/// assert_eq!(suggest_key("TaxRate"), Some(SearchKey::TaxRate));
/// assert_eq!(suggest_key("tag"), None);
/// assert_eq!(suggest_key("merchant"), None);
/// ```
pub fn suggest_key(word: &str) -> Option<SearchKey> {
    if word.is_empty() {
        return None;
    }
    let word_lower = word.to_lowercase();

    let (best_match, best_distance) = SearchKey::ALL
        .into_iter()
        .map(|key| (key, levenshtein(&word_lower, &key.as_str().to_lowercase())))
        .min_by_key(|(_, distance)| *distance)?;

    if best_match.as_str() != word && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}

/// Splits a free-text term shaped like `key<op>value` and suggests a key for it.
///
/// Returns the mistyped prefix and the suggested key. Terms without an
/// operator character are not considered.
pub fn suggest_for_term(term: &str) -> Option<(&str, SearchKey)> {
    let idx = term.find(&[':', '=', '!', '<', '>'][..])?;
    let prefix = &term[..idx];
    suggest_key(prefix).map(|key| (prefix, key))
}
