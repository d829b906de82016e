use crate::error::Result;
use tree_sitter::Node;

/// Recognises the handler-export convention of one language.
pub trait HandlerPattern: Send + Sync {
    /// Inspect one top-level node and return the exported function name when
    /// the node declares a handler.
    ///
    /// Malformed constructs are reported as `Err`; the scanner logs and skips
    /// them without aborting the rest of the file.
    fn detect(&self, node: &Node, source: &str) -> Result<Option<String>>;
}
