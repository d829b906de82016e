//! Document loading interface

use crate::{document::TextDocument, error::Result};
use async_trait::async_trait;
use std::path::Path;

/// Trait for obtaining the text and language of a source file
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    /// Load the full document at `path`
    async fn open(&self, path: &Path) -> Result<TextDocument>;
}
