use anyhow::{Context, Result};
use sam_runner_core::Language;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories never worth scanning for handlers
const SKIPPED_DIRS: &[&str] = &["node_modules", "__pycache__", ".aws-sam", ".sam-runner", "target"];

/// Resolve `path` against the current directory, following symlinks when it exists
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read the current directory")?
            .join(path)
    };
    Ok(std::fs::canonicalize(&absolute).unwrap_or(absolute))
}

/// All JavaScript and Python sources below `root`, sorted by path
pub fn collect_source_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| Language::id_for_path(entry.path()).is_some())
        .map(DirEntry::into_path)
        .collect();
    files.sort();
    files
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && (name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()))
}
