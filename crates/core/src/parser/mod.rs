//! Source parsing using tree-sitter

pub mod source_parser;
pub mod utils;

// Re-export commonly used items
pub use source_parser::SourceParser;
pub use utils::{ensure_well_formed, node_text};
