//! sam-runner - Find serverless handlers in source code and run them locally
//!
//! This crate provides functionality to:
//! - Scan JavaScript and Python sources for handler entry points
//! - Turn handlers into run/debug/configure affordances bound to source ranges
//! - Detect and validate the SAM CLI
//! - Build and invoke handlers locally through `sam build` and `sam local invoke`
pub mod affordance;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod interfaces;
pub mod invoke;
pub mod parser;
pub mod patterns;
pub mod probe;
pub mod runner;
pub mod services;
pub mod single_flight;
pub mod telemetry;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use config::Config;
pub use dispatch::{CommandArgs, CommandOutput, CommandRegistry};
pub use document::TextDocument;
pub use invoke::{InvocationRequest, InvocationResult, InvocationStatus};
pub use probe::{ToolDetectionResult, ValidationOutcome};
pub use runner::{SamRunner, SamServices};
