//! String-keyed command table
//!
//! Every registered handler runs through [`with_telemetry`], so each dispatch
//! produces exactly one telemetry datum.

use crate::{
    error::{Error, Result},
    invoke::{InvocationRequest, InvocationResult},
    probe::{ToolDetectionResult, ValidationOutcome},
    telemetry::{TelemetryMetadata, TelemetryOutcome, TelemetrySink, default_metadata, with_telemetry},
};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

pub const DETECT_COMMAND: &str = "sam.detect";
pub const VALIDATE_VERSION_COMMAND: &str = "sam.validate.version";

#[derive(Debug, Clone)]
pub enum CommandArgs {
    Invoke(Box<InvocationRequest>),
    Configure {
        workspace_folder: PathBuf,
        handler_name: String,
    },
    None,
}

impl CommandArgs {
    fn telemetry_metadata(&self) -> TelemetryMetadata {
        match self {
            CommandArgs::Invoke(request) => {
                let mut metadata = default_metadata(Some(&request.runtime), request.is_debug);
                metadata.insert("handler".to_string(), request.handler_name.clone());
                metadata
            }
            CommandArgs::Configure { handler_name, .. } => {
                TelemetryMetadata::from([("handler".to_string(), handler_name.clone())])
            }
            CommandArgs::None => TelemetryMetadata::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandOutput {
    Invocation(InvocationResult),
    Configured(PathBuf),
    Detection(ToolDetectionResult),
    Validation(ValidationOutcome),
}

impl CommandOutput {
    pub fn succeeded(&self) -> bool {
        match self {
            CommandOutput::Invocation(result) => result.is_success(),
            CommandOutput::Configured(_) => true,
            CommandOutput::Detection(result) => result.found,
            CommandOutput::Validation(outcome) => outcome.is_valid(),
        }
    }
}

type CommandHandler = Arc<dyn Fn(CommandArgs) -> BoxFuture<'static, Result<CommandOutput>> + Send + Sync>;

/// Outcome as seen by telemetry: an `Ok` carrying a failed invocation is still a failure
struct Dispatched(Result<CommandOutput>);

impl TelemetryOutcome for Dispatched {
    fn succeeded(&self) -> bool {
        matches!(&self.0, Ok(output) if output.succeeded())
    }
}

#[derive(Clone)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, CommandHandler>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl CommandRegistry {
    pub fn new(telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            handlers: BTreeMap::new(),
            telemetry,
        }
    }

    /// Register `handler` under `key`, replacing any previous registration
    pub fn register<F, Fut>(&mut self, key: impl Into<String>, handler: F)
    where
        F: Fn(CommandArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CommandOutput>> + Send + 'static,
    {
        let handler: CommandHandler = Arc::new(move |args| handler(args).boxed());
        self.handlers.insert(key.into(), handler);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub async fn execute(&self, key: &str, args: CommandArgs) -> Result<CommandOutput> {
        let handler = self
            .handlers
            .get(key)
            .ok_or_else(|| Error::UnknownCommand(key.to_string()))?;

        let metadata = args.telemetry_metadata();
        let operation = handler(args).map(Dispatched);
        with_telemetry(self.telemetry.as_ref(), key, metadata, operation)
            .await
            .0
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::ErrorKind;
    use crate::telemetry::MemoryTelemetrySink;
    use crate::types::{Language, WorkspaceFolder};

    fn request() -> InvocationRequest {
        InvocationRequest::new(
            "app.handler",
            "/work/app.js",
            WorkspaceFolder::new("/work"),
            Language::JavaScript,
        )
        .with_debug_port(5858)
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let sink = Arc::new(MemoryTelemetrySink::new());
        let registry = CommandRegistry::new(sink.clone());

        let err = registry.execute("sam.nope", CommandArgs::None).await.unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(key) if key == "sam.nope"));
        assert!(sink.data().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_records_runtime_and_debug() {
        let sink = Arc::new(MemoryTelemetrySink::new());
        let mut registry = CommandRegistry::new(sink.clone());
        registry.register(Language::JavaScript.invoke_command_key(), |_args| async {
            Ok(CommandOutput::Invocation(InvocationResult::success("ok")))
        });

        let output = registry
            .execute(
                "sam.local.invoke.javascript",
                CommandArgs::Invoke(Box::new(request())),
            )
            .await
            .unwrap();

        assert_eq!(output, CommandOutput::Invocation(InvocationResult::success("ok")));
        let data = sink.data();
        assert_eq!(data.len(), 1);
        assert!(data[0].success);
        assert_eq!(data[0].metadata["runtime"], "nodejs18.x");
        assert_eq!(data[0].metadata["debug"], "true");
        assert_eq!(data[0].metadata["handler"], "app.handler");
    }

    #[tokio::test]
    async fn test_failed_invocation_is_recorded_as_failure() {
        let sink = Arc::new(MemoryTelemetrySink::new());
        let mut registry = CommandRegistry::new(sink.clone());
        registry.register("sam.local.invoke.python", |_args| async {
            Ok(CommandOutput::Invocation(InvocationResult::failure(
                ErrorKind::Build,
                "build failed",
                None,
            )))
        });

        let output = registry
            .execute("sam.local.invoke.python", CommandArgs::Invoke(Box::new(request())))
            .await
            .unwrap();

        assert!(!output.succeeded());
        assert!(!sink.data()[0].success);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let sink = Arc::new(MemoryTelemetrySink::new());
        let mut registry = CommandRegistry::new(sink.clone());
        registry.register(DETECT_COMMAND, |_args| async {
            Err(Error::Other("detect failed".to_string()))
        });

        let err = registry.execute(DETECT_COMMAND, CommandArgs::None).await.unwrap_err();
        assert_eq!(err.to_string(), "detect failed");
        assert_eq!(sink.data().len(), 1);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec![DETECT_COMMAND]);
    }
}
