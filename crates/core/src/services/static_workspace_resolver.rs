//! Workspace resolver over a fixed list of folders

use crate::{interfaces::WorkspaceResolver, types::WorkspaceFolder};
use std::path::{Path, PathBuf};

/// Resolves documents against folders known up front. Nested folders win
/// over their parents.
#[derive(Debug, Default, Clone)]
pub struct StaticWorkspaceResolver {
    folders: Vec<WorkspaceFolder>,
}

impl StaticWorkspaceResolver {
    pub fn new(folders: Vec<WorkspaceFolder>) -> Self {
        Self { folders }
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(paths.into_iter().map(WorkspaceFolder::new).collect())
    }
}

impl WorkspaceResolver for StaticWorkspaceResolver {
    fn folder_for(&self, path: &Path) -> Option<WorkspaceFolder> {
        self.folders
            .iter()
            .filter(|folder| folder.contains(path))
            .max_by_key(|folder| folder.path.components().count())
            .cloned()
    }

    fn folders(&self) -> Vec<WorkspaceFolder> {
        self.folders.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepest_folder_wins() {
        let resolver = StaticWorkspaceResolver::from_paths(["/work", "/work/service"]);
        let folder = resolver
            .folder_for(Path::new("/work/service/src/app.js"))
            .unwrap();
        assert_eq!(folder.path, PathBuf::from("/work/service"));
        assert_eq!(folder.name, "service");
    }

    #[test]
    fn test_outside_workspace() {
        let resolver = StaticWorkspaceResolver::from_paths(["/work"]);
        assert!(resolver.folder_for(Path::new("/elsewhere/app.js")).is_none());
        // Prefix match must be on whole components
        assert!(resolver.folder_for(Path::new("/workshop/app.js")).is_none());
    }
}
