use crate::impl_case_insensitive_deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Source languages with a handler scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
}

impl_case_insensitive_deserialize!(
    Language,
    JavaScript => "javascript",
    Python => "python"
);

impl Language {
    pub const ALL: [Language; 2] = [Language::JavaScript, Language::Python];

    /// Map an editor language identifier to a supported language.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "javascript" | "js" => Some(Language::JavaScript),
            "python" | "py" => Some(Language::Python),
            _ => None,
        }
    }

    /// Guess the language id from a file extension.
    pub fn id_for_path(path: &Path) -> Option<&'static str> {
        match path.extension().and_then(|e| e.to_str())? {
            "js" | "mjs" | "cjs" => Some("javascript"),
            "py" => Some("python"),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
        }
    }

    /// Lambda runtime used when a handler has no configured override
    pub fn default_runtime(&self) -> &'static str {
        match self {
            Language::JavaScript => "nodejs18.x",
            Language::Python => "python3.11",
        }
    }

    /// Dispatch key of the local invoke command for this language
    pub fn invoke_command_key(&self) -> String {
        format!("sam.local.invoke.{}", self.id())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which languages get a "Debug Locally" affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugPolicy {
    enabled: BTreeSet<Language>,
}

impl Default for DebugPolicy {
    fn default() -> Self {
        // Python debugging is not wired up in the local emulator yet
        Self {
            enabled: BTreeSet::from([Language::JavaScript]),
        }
    }
}

impl DebugPolicy {
    pub fn none() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.enabled.insert(language);
        self
    }

    pub fn supports(&self, language: Language) -> bool {
        self.enabled.contains(&language)
    }
}
