//! Text header helpers for formats with key/value headers.
//!
//! - [`tokenize`] - Quote-aware line splitting
//! - [`Classifier`] - Category table, "other" table and first-token fallback

mod classifier;
mod tokenize;

pub use classifier::{Classifier, KeyTable, KeyValue, MatchTier};
pub use tokenize::{join_tokens, tokenize};
