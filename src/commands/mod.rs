pub mod documents;
pub mod load;
pub mod matrix;
pub mod score;
pub mod select;
pub mod status;
