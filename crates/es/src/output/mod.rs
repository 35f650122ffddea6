//! Output formatting utilities for the es CLI.
//!
//! - [`parse`] - Parse result output (filters table, autocomplete hint, JSON)
//! - [`keys`] - Key and operator listing
//! - [`helpers`] - Common formatting utilities (truncation, key labels, caret markers)

pub mod helpers;
mod keys;
mod parse;

pub use keys::{format_keys_json, format_keys_table};
pub use parse::{format_parse_json, format_parse_table};
