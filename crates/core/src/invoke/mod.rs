//! Local build-and-invoke of a handler through the SAM CLI

mod artifacts;
mod orchestrator;

pub use artifacts::{FUNCTION_LOGICAL_ID, InvocationArtifacts};
pub use orchestrator::LocalInvoker;

use crate::{
    config::Config,
    interfaces::ProcessOutput,
    telemetry::TelemetryOutcome,
    types::{Affordance, Language, WorkspaceFolder},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Everything one local invocation needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub handler_name: String,
    /// Source file defining the handler
    pub document: PathBuf,
    pub workspace_folder: WorkspaceFolder,
    pub language: Language,
    pub runtime: String,
    pub is_debug: bool,
    /// Only set for debug runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_port: Option<u16>,
    pub event: serde_json::Value,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment_variables: BTreeMap<String, String>,
}

impl InvocationRequest {
    pub fn new(
        handler_name: impl Into<String>,
        document: impl Into<PathBuf>,
        workspace_folder: WorkspaceFolder,
        language: Language,
    ) -> Self {
        Self {
            handler_name: handler_name.into(),
            document: document.into(),
            workspace_folder,
            language,
            runtime: language.default_runtime().to_string(),
            is_debug: false,
            debug_port: None,
            event: serde_json::Value::Object(Default::default()),
            environment_variables: BTreeMap::new(),
        }
    }

    /// Build a request for `affordance`, pulling handler settings from `config`
    pub fn from_affordance(affordance: &Affordance, is_debug: bool, config: &Config) -> Self {
        let mut request = Self::new(
            affordance.handler_name.clone(),
            affordance.document.clone(),
            affordance.workspace_folder.clone(),
            affordance.language,
        );

        if let Some(handler) = config.handler(&affordance.handler_name) {
            request.event = handler.event.clone();
            request.environment_variables = handler.environment_variables.clone();
            if let Some(runtime) = &handler.runtime {
                request.runtime = runtime.clone();
            }
        }

        if is_debug {
            request.is_debug = true;
            request.debug_port = Some(config.debug.port);
        }
        request
    }

    pub fn with_debug_port(mut self, port: u16) -> Self {
        self.is_debug = true;
        self.debug_port = Some(port);
        self
    }
}

/// Lifecycle of a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Idle,
    Building,
    Invoking,
    Succeeded,
    Failed,
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvocationState::Idle => "idle",
            InvocationState::Building => "building",
            InvocationState::Invoking => "invoking",
            InvocationState::Succeeded => "succeeded",
            InvocationState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ToolNotFound,
    Prepare,
    Build,
    Invoke,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_output: Option<ProcessOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: InvocationStatus,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl InvocationResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Succeeded,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(
        kind: ErrorKind,
        message: impl Into<String>,
        process_output: Option<ProcessOutput>,
    ) -> Self {
        let output = process_output
            .as_ref()
            .map(|p| p.stderr.clone())
            .unwrap_or_default();
        Self {
            status: InvocationStatus::Failed,
            output,
            error: Some(ErrorDetail {
                kind,
                message: message.into(),
                process_output,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Succeeded
    }
}

impl TelemetryOutcome for InvocationResult {
    fn succeeded(&self) -> bool {
        self.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandlerConfig;
    use crate::types::{AffordanceAction, SourceRange};

    fn affordance() -> Affordance {
        Affordance {
            document: PathBuf::from("/work/project/src/app.js"),
            handler_name: "app.handler".to_string(),
            range: SourceRange::new(0, 10),
            workspace_folder: WorkspaceFolder::new("/work/project"),
            language: Language::JavaScript,
            action: AffordanceAction::Debug,
            command: Language::JavaScript.invoke_command_key(),
            title: AffordanceAction::Debug.title().to_string(),
        }
    }

    #[test]
    fn test_request_defaults() {
        let request = InvocationRequest::from_affordance(&affordance(), false, &Config::default());
        assert_eq!(request.runtime, "nodejs18.x");
        assert_eq!(request.debug_port, None);
        assert_eq!(request.event, serde_json::json!({}));
    }

    #[test]
    fn test_request_uses_handler_config() {
        let mut config = Config::default();
        config.debug.port = 9229;
        config.handlers.insert(
            "app.handler".to_string(),
            HandlerConfig {
                event: serde_json::json!({ "id": 1 }),
                environment_variables: BTreeMap::from([("STAGE".to_string(), "dev".to_string())]),
                runtime: Some("nodejs20.x".to_string()),
            },
        );

        let request = InvocationRequest::from_affordance(&affordance(), true, &config);
        assert_eq!(request.runtime, "nodejs20.x");
        assert_eq!(request.debug_port, Some(9229));
        assert_eq!(request.event, serde_json::json!({ "id": 1 }));
        assert_eq!(request.environment_variables["STAGE"], "dev");
    }
}
