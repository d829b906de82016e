use std::io;
use std::path::PathBuf;

/// Errors that can occur during sam-runner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    #[error("Source file {} is external to the current workspace", .0.display())]
    WorkspaceResolution(PathBuf),

    #[error(
        "Invalid handler name: '{0}'. Handler names can contain only letters, numbers, hyphens, underscores and periods"
    )]
    HandlerNameValidation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Process error: {0}")]
    ProcessError(String),

    #[error("No command registered for '{0}'")]
    UnknownCommand(String),

    #[error("Command '{command}' received unexpected arguments")]
    InvalidCommandArgs { command: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sam-runner operations
pub type Result<T> = std::result::Result<T, Error>;
