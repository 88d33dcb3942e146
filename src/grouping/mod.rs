//! Cross-source alignment: base-item keys and the grouped comparison table.

pub mod comparison;
pub mod normalizer;

pub use comparison::{filter_rows, group_records, summarize, ComparisonError};
pub use normalizer::BaseItemDictionary;
