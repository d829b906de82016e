use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A root directory the user opened as part of their workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceFolder {
    pub name: String,
    pub path: PathBuf,
}

impl WorkspaceFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    /// Check if a file lives somewhere below this folder
    pub fn contains(&self, file: &Path) -> bool {
        file.starts_with(&self.path)
    }
}
