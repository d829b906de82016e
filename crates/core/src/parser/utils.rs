use crate::error::{Error, Result};
use tree_sitter::Node;

pub fn node_text<'a>(node: &Node, source: &'a str) -> Result<&'a str> {
    node.utf8_text(source.as_bytes())
        .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in {}: {e}", node.kind())))
}

/// Fail when `node` contains syntax errors, naming the line it starts on.
pub fn ensure_well_formed(node: &Node, source: &str) -> Result<()> {
    if !node.is_error() && !node.has_error() {
        return Ok(());
    }
    let line = node.start_position().row + 1;
    let snippet: String = source
        .get(node.start_byte()..node.end_byte())
        .unwrap_or_default()
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(60)
        .collect();
    Err(Error::ParseError(format!(
        "malformed {} at line {line}: {snippet}",
        node.kind()
    )))
}

/// Number of declared parameters in a parameter list node
pub fn named_param_count(params: &Node) -> usize {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .count()
}
