use crate::{
    error::Result,
    parser::utils::{ensure_well_formed, named_param_count, node_text},
    patterns::HandlerPattern,
};
use tree_sitter::Node;

/// Handlers take `(event, context, callback)`; anything outside 1..=3 is not one
const MAX_PARAMS: usize = 3;

/// Detects exported functions in CommonJS and ES module sources:
///
/// - `exports.name = (event) => ...`
/// - `module.exports.name = function (event, context) { ... }`
/// - `export function name(event) { ... }`
/// - `export const name = async (event) => ...`
pub struct JavaScriptHandlerPattern;

impl HandlerPattern for JavaScriptHandlerPattern {
    fn detect(&self, node: &Node, source: &str) -> Result<Option<String>> {
        match node.kind() {
            "expression_statement" => {
                ensure_well_formed(node, source)?;
                detect_commonjs_export(node, source)
            }
            "export_statement" => {
                ensure_well_formed(node, source)?;
                detect_es_export(node, source)
            }
            _ => Ok(None),
        }
    }
}

fn detect_commonjs_export(node: &Node, source: &str) -> Result<Option<String>> {
    let Some(assignment) = node.named_child(0) else {
        return Ok(None);
    };
    if assignment.kind() != "assignment_expression" {
        return Ok(None);
    }
    let (Some(left), Some(right)) = (
        assignment.child_by_field_name("left"),
        assignment.child_by_field_name("right"),
    ) else {
        return Ok(None);
    };
    if left.kind() != "member_expression" || !is_exports_object(&left, source)? {
        return Ok(None);
    }
    let Some(property) = left.child_by_field_name("property") else {
        return Ok(None);
    };
    if !is_handler_function(&right) {
        return Ok(None);
    }
    Ok(Some(node_text(&property, source)?.to_string()))
}

/// `exports` or `module.exports`
fn is_exports_object(member: &Node, source: &str) -> Result<bool> {
    let Some(object) = member.child_by_field_name("object") else {
        return Ok(false);
    };
    match object.kind() {
        "identifier" => Ok(node_text(&object, source)? == "exports"),
        "member_expression" => {
            let (Some(inner), Some(property)) = (
                object.child_by_field_name("object"),
                object.child_by_field_name("property"),
            ) else {
                return Ok(false);
            };
            Ok(node_text(&inner, source)? == "module" && node_text(&property, source)? == "exports")
        }
        _ => Ok(false),
    }
}

fn detect_es_export(node: &Node, source: &str) -> Result<Option<String>> {
    let Some(declaration) = node.child_by_field_name("declaration") else {
        return Ok(None);
    };

    match declaration.kind() {
        "function_declaration" => {
            if !has_handler_arity(&declaration) {
                return Ok(None);
            }
            match declaration.child_by_field_name("name") {
                Some(name) => Ok(Some(node_text(&name, source)?.to_string())),
                None => Ok(None),
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            for declarator in declaration.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let (Some(name), Some(value)) = (
                    declarator.child_by_field_name("name"),
                    declarator.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if name.kind() == "identifier" && is_handler_function(&value) {
                    return Ok(Some(node_text(&name, source)?.to_string()));
                }
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

fn is_handler_function(value: &Node) -> bool {
    matches!(
        value.kind(),
        "arrow_function" | "function_expression" | "function"
    ) && has_handler_arity(value)
}

fn has_handler_arity(function: &Node) -> bool {
    let count = if let Some(params) = function.child_by_field_name("parameters") {
        named_param_count(&params)
    } else if function.child_by_field_name("parameter").is_some() {
        // `event => ...`
        1
    } else {
        0
    };
    (1..=MAX_PARAMS).contains(&count)
}
