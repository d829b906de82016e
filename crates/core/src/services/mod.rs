//! Default implementations of the interface traits
//!
//! These are what the bundled CLI wires together. Hosts embedding the core
//! can swap any of them out.

pub mod fs_document_provider;
pub mod static_workspace_resolver;
pub mod tokio_process_runner;
pub mod tracing_notifier;
pub mod tracing_output_sink;

pub use fs_document_provider::FsDocumentProvider;
pub use static_workspace_resolver::StaticWorkspaceResolver;
pub use tokio_process_runner::TokioProcessRunner;
pub use tracing_notifier::TracingNotifier;
pub use tracing_output_sink::TracingOutputSink;
