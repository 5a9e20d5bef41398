//! JSONL fragment loading and embedding refresh.

mod records;
mod run;

pub use records::{load_fragments, parse_fragment_records};
pub use run::run;
