use crate::{
    error::{Error, Result},
    types::Language,
};
use tree_sitter::Parser;

/// A tree-sitter parser configured for one of the supported languages.
pub struct SourceParser {
    parser: Parser,
    language: Language,
}

impl SourceParser {
    pub fn new(language: Language) -> Result<Self> {
        let grammar: tree_sitter::Language = match language {
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
        };
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| Error::TreeSitterError(format!("Failed to set language: {e}")))?;
        Ok(Self { parser, language })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn parse(&mut self, source: &str) -> Result<tree_sitter::Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| Error::ParseError("Failed to parse source code".to_string()))
    }
}
