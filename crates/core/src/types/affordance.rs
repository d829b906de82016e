use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::language::Language;
use super::range::SourceRange;
use super::workspace::WorkspaceFolder;

/// Dispatch key of the configure command
pub const CONFIGURE_COMMAND: &str = "sam.configure";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordanceAction {
    Run,
    Debug,
    Configure,
}

impl AffordanceAction {
    pub fn title(&self) -> &'static str {
        match self {
            AffordanceAction::Run => "Run Locally",
            AffordanceAction::Debug => "Debug Locally",
            AffordanceAction::Configure => "Configure",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, AffordanceAction::Debug)
    }
}

/// An actionable item bound to a source range.
///
/// Data only; the presentation layer decides how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordance {
    pub document: PathBuf,
    pub handler_name: String,
    pub range: SourceRange,
    pub workspace_folder: WorkspaceFolder,
    pub language: Language,
    pub action: AffordanceAction,
    /// Key in the command dispatch table
    pub command: String,
    pub title: String,
}
