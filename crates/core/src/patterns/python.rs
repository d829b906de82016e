use crate::{
    error::Result,
    parser::utils::{ensure_well_formed, named_param_count, node_text},
    patterns::HandlerPattern,
};
use tree_sitter::Node;

/// Detects module-level `def name(event, context):` functions, decorated or not.
pub struct PythonHandlerPattern;

impl HandlerPattern for PythonHandlerPattern {
    fn detect(&self, node: &Node, source: &str) -> Result<Option<String>> {
        let function = match node.kind() {
            "function_definition" => *node,
            "decorated_definition" => match node.child_by_field_name("definition") {
                Some(definition) if definition.kind() == "function_definition" => definition,
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        ensure_well_formed(node, source)?;

        let Some(params) = function.child_by_field_name("parameters") else {
            return Ok(None);
        };
        if named_param_count(&params) != 2 {
            return Ok(None);
        }

        match function.child_by_field_name("name") {
            Some(name) => Ok(Some(node_text(&name, source)?.to_string())),
            None => Ok(None),
        }
    }
}
