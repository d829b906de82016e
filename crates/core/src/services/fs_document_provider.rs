//! Document provider reading straight from the file system

use crate::{
    document::TextDocument,
    error::Result,
    interfaces::DocumentProvider,
    types::Language,
};
use async_trait::async_trait;
use std::path::Path;

/// Reads documents from disk and infers the language from the extension.
#[derive(Debug, Default, Clone)]
pub struct FsDocumentProvider {
    language_override: Option<String>,
}

impl FsDocumentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every opened document to report `language_id`
    pub fn with_language(language_id: impl Into<String>) -> Self {
        Self {
            language_override: Some(language_id.into()),
        }
    }
}

#[async_trait]
impl DocumentProvider for FsDocumentProvider {
    async fn open(&self, path: &Path) -> Result<TextDocument> {
        let text = tokio::fs::read_to_string(path).await?;
        let language_id = self
            .language_override
            .clone()
            .or_else(|| Language::id_for_path(path).map(str::to_string))
            .unwrap_or_else(|| "plaintext".to_string());
        Ok(TextDocument::new(path, text, language_id))
    }
}
