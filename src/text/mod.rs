//! Cell text handling shared by the relevance matcher and the chunk selector.

mod normalize;
mod tokenize;
mod zero;

pub use normalize::{CellValue, normalize_cell};
pub use tokenize::{extract_keywords, tokenize};
pub use zero::is_zero_cell;
