//! Model output parsing
//!
//! Tolerant extraction of structured tool calls from free text.

pub mod extractor;
pub mod literal;

// Re-export commonly used types
pub use extractor::{StructuredCallExtractor, ARGUMENTS_KEY, MISSPELLED_ARGUMENTS_KEY};
pub use literal::parse_python_literal;
