//! Chunk relevance selection for one (question, document) pair.

mod run;
mod selector;
mod signals;
mod topics;
#[cfg(test)]
mod tests;

pub use run::run;
pub use selector::{
    DEFAULT_SEARCH_K, REJECTION_MARKER, SelectorThresholds, best_fragment_for_document,
};
pub use topics::DEFAULT_QUESTIONS;

#[cfg(test)]
use selector::{RejectReason, Selection, preview_text, select_fragment};
#[cfg(test)]
use signals::{CandidateSignals, has_header_marker, keyword_hits, relevance_score};
#[cfg(test)]
use topics::QueryKeywords;
