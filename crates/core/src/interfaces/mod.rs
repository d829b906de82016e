//! Boundaries to the collaborators the core does not own
//!
//! The host (an editor extension, the bundled CLI, a test harness) supplies
//! implementations of these traits. Default implementations live in
//! [`crate::services`].

pub mod document_provider;
pub mod notifier;
pub mod process_runner;
pub mod workspace_resolver;

pub use document_provider::DocumentProvider;
pub use notifier::{NotificationLevel, Notifier};
pub use process_runner::{NullOutputSink, OutputSink, ProcessOutput, ProcessRunner, ProcessSpec};
pub use workspace_resolver::WorkspaceResolver;
