//! Question x document verdict grid.

mod build;
mod run;
#[cfg(test)]
mod tests;

pub use build::{build_question_matrix, default_questions};
pub use run::run;
