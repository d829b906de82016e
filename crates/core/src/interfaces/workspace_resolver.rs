//! Workspace folder resolution interface

use crate::types::WorkspaceFolder;
use std::path::Path;

/// Trait for mapping a document location to the workspace folder owning it
pub trait WorkspaceResolver: Send + Sync {
    /// The folder containing `path`, or `None` when it is outside the workspace
    fn folder_for(&self, path: &Path) -> Option<WorkspaceFolder>;

    /// All known workspace folders
    fn folders(&self) -> Vec<WorkspaceFolder>;
}
