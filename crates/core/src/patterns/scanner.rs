use crate::{
    document::TextDocument,
    patterns::{HandlerPattern, JavaScriptHandlerPattern, PythonHandlerPattern},
    parser::SourceParser,
    types::{HandlerCandidate, Language, SourceRange},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tree_sitter::{Node, Tree};

/// Finds handler entry points in a document.
#[derive(Debug, Default, Clone)]
pub struct HandlerScanner;

impl HandlerScanner {
    pub fn new() -> Self {
        Self
    }

    /// Parse `document` and prepare a lazy scan over its top-level declarations.
    ///
    /// Unsupported languages, and documents tree-sitter cannot parse at all,
    /// yield an empty scan.
    pub fn scan<'d>(&self, document: &'d TextDocument, cancel: &CancellationToken) -> HandlerScan<'d> {
        let Some(language) = document.language() else {
            debug!(
                "No handler scanner for language '{}' ({})",
                document.language_id(),
                document.path().display()
            );
            return HandlerScan::empty(document, cancel);
        };

        let tree = SourceParser::new(language).and_then(|mut parser| parser.parse(document.text()));
        match tree {
            Ok(tree) => HandlerScan {
                document,
                tree: Some(tree),
                pattern: Some(pattern_for(language)),
                module_name: module_name(document),
                cancel: cancel.clone(),
            },
            Err(e) => {
                warn!("Failed to parse {}: {e}", document.path().display());
                HandlerScan::empty(document, cancel)
            }
        }
    }
}

fn pattern_for(language: Language) -> Box<dyn HandlerPattern> {
    match language {
        Language::JavaScript => Box::new(JavaScriptHandlerPattern),
        Language::Python => Box::new(PythonHandlerPattern),
    }
}

/// `app.js` exports handlers as `app.<name>`
fn module_name(document: &TextDocument) -> String {
    document
        .path()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index")
        .to_string()
}

/// A parsed document whose handlers can be iterated any number of times.
pub struct HandlerScan<'d> {
    document: &'d TextDocument,
    tree: Option<Tree>,
    pattern: Option<Box<dyn HandlerPattern>>,
    module_name: String,
    cancel: CancellationToken,
}

impl<'d> HandlerScan<'d> {
    fn empty(document: &'d TextDocument, cancel: &CancellationToken) -> Self {
        Self {
            document,
            tree: None,
            pattern: None,
            module_name: String::new(),
            cancel: cancel.clone(),
        }
    }

    /// Start a fresh pass over the document's top-level declarations
    pub fn iter(&self) -> HandlerIter<'_, 'd> {
        let nodes = match &self.tree {
            Some(tree) => {
                let root = tree.root_node();
                let mut cursor = root.walk();
                let nodes: Vec<_> = root.named_children(&mut cursor).collect();
                nodes
            }
            None => Vec::new(),
        };
        HandlerIter {
            scan: self,
            nodes: nodes.into_iter(),
        }
    }

    pub fn candidates(&self) -> Vec<HandlerCandidate> {
        self.iter().collect()
    }

    pub fn document(&self) -> &'d TextDocument {
        self.document
    }
}

impl<'s, 'd> IntoIterator for &'s HandlerScan<'d> {
    type Item = HandlerCandidate;
    type IntoIter = HandlerIter<'s, 'd>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct HandlerIter<'s, 'd> {
    scan: &'s HandlerScan<'d>,
    nodes: std::vec::IntoIter<Node<'s>>,
}

impl Iterator for HandlerIter<'_, '_> {
    type Item = HandlerCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        let pattern = self.scan.pattern.as_ref()?;
        let document = self.scan.document;

        loop {
            if self.scan.cancel.is_cancelled() {
                debug!("Handler scan of {} cancelled", document.path().display());
                return None;
            }
            let node = self.nodes.next()?;

            if node.is_error() {
                warn!(
                    "Skipping malformed code at {}:{}",
                    document.path().display(),
                    node.start_position().row + 1
                );
                continue;
            }

            match pattern.detect(&node, document.text()) {
                Ok(Some(name)) => {
                    let range = SourceRange::new(
                        document.char_offset(node.start_byte()),
                        document.char_offset(node.end_byte()),
                    );
                    let handler_name = format!("{}.{}", self.scan.module_name, name);
                    debug!(
                        "Found handler '{handler_name}' at {}..{}",
                        range.position_start, range.position_end
                    );
                    return Some(HandlerCandidate::new(handler_name, range));
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping construct in {}: {e}", document.path().display());
                    continue;
                }
            }
        }
    }
}
