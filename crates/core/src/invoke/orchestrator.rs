use super::{
    ErrorKind, FUNCTION_LOGICAL_ID, InvocationArtifacts, InvocationRequest, InvocationResult,
    InvocationState,
};
use crate::{
    config::SamCliConfig,
    interfaces::{OutputSink, ProcessOutput, ProcessRunner, ProcessSpec},
    probe::ToolProbe,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives `sam build` followed by `sam local invoke` for one handler at a time.
///
/// Invocations are independent of each other; nothing is retried.
#[derive(Clone)]
pub struct LocalInvoker {
    probe: ToolProbe,
    runner: Arc<dyn ProcessRunner>,
    build_timeout: Duration,
    invoke_timeout: Duration,
}

impl LocalInvoker {
    pub fn new(probe: ToolProbe, runner: Arc<dyn ProcessRunner>) -> Self {
        let defaults = SamCliConfig::default();
        Self {
            probe,
            runner,
            build_timeout: defaults.build_timeout(),
            invoke_timeout: defaults.invoke_timeout(),
        }
    }

    pub fn with_timeouts(mut self, settings: &SamCliConfig) -> Self {
        self.build_timeout = settings.build_timeout();
        self.invoke_timeout = settings.invoke_timeout();
        self
    }

    /// The commands an invocation of `request` would run, without running them
    pub async fn plan(&self, request: &InvocationRequest) -> Option<Vec<ProcessSpec>> {
        let sam = self.probe.detect(false).await.path?;
        let artifacts = InvocationArtifacts::planned(request);
        let cwd = working_dir(request);
        Some(vec![
            self.build_spec(&sam, &artifacts, &cwd),
            self.invoke_spec(&sam, request, &artifacts, &cwd),
        ])
    }

    pub async fn invoke(&self, request: &InvocationRequest, sink: &dyn OutputSink) -> InvocationResult {
        let mut run = Run::new(&request.handler_name);

        let detection = self.probe.detect(false).await;
        let Some(sam) = detection.path.filter(|_| detection.found) else {
            return run.fail(InvocationResult::failure(
                ErrorKind::ToolNotFound,
                "SAM CLI was not found",
                None,
            ));
        };
        if !detection.validation_outcome.is_valid() {
            warn!(
                "Invoking with SAM CLI at {} ({})",
                sam.display(),
                detection.validation_outcome
            );
        }

        let artifacts = match InvocationArtifacts::prepare(request).await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                return run.fail(InvocationResult::failure(
                    ErrorKind::Prepare,
                    format!("Failed to prepare invocation files: {e}"),
                    None,
                ));
            }
        };
        let cwd = working_dir(request);

        run.transition(InvocationState::Building);
        let build = self.build_spec(&sam, &artifacts, &cwd);
        if let Err(failure) = self.execute(&build, sink, ErrorKind::Build).await {
            return run.fail(failure);
        }

        run.transition(InvocationState::Invoking);
        let invoke = self.invoke_spec(&sam, request, &artifacts, &cwd);
        match self.execute(&invoke, sink, ErrorKind::Invoke).await {
            Ok(output) => {
                run.transition(InvocationState::Succeeded);
                InvocationResult::success(output.stdout)
            }
            Err(failure) => run.fail(failure),
        }
    }

    fn build_spec(&self, sam: &Path, artifacts: &InvocationArtifacts, cwd: &Path) -> ProcessSpec {
        ProcessSpec::new(sam)
            .arg("build")
            .arg("--template")
            .arg(artifacts.template.to_string_lossy())
            .arg("--build-dir")
            .arg(artifacts.build_dir.to_string_lossy())
            .with_working_dir(cwd)
            .with_timeout(self.build_timeout)
    }

    fn invoke_spec(
        &self,
        sam: &Path,
        request: &InvocationRequest,
        artifacts: &InvocationArtifacts,
        cwd: &Path,
    ) -> ProcessSpec {
        let mut spec = ProcessSpec::new(sam)
            .args(["local", "invoke", FUNCTION_LOGICAL_ID, "--template"])
            .arg(artifacts.built_template().to_string_lossy())
            .arg("--event")
            .arg(artifacts.event.to_string_lossy());

        if let Some(env_vars) = &artifacts.env_vars {
            spec = spec.arg("--env-vars").arg(env_vars.to_string_lossy());
        }
        if let Some(port) = request.debug_port.filter(|_| request.is_debug) {
            spec = spec.arg("--debug-port").arg(port.to_string());
        }

        spec.with_working_dir(cwd).with_timeout(self.invoke_timeout)
    }

    /// Run one step; anything but a clean exit becomes a failed result
    async fn execute(
        &self,
        spec: &ProcessSpec,
        sink: &dyn OutputSink,
        kind: ErrorKind,
    ) -> Result<ProcessOutput, InvocationResult> {
        info!("Running: {}", spec.to_shell_command());

        let output = match self.runner.run(spec, sink).await {
            Ok(output) => output,
            Err(e) => {
                return Err(InvocationResult::failure(
                    kind,
                    format!("Failed to run `{}`: {e}", spec.to_shell_command()),
                    None,
                ));
            }
        };

        if output.timed_out {
            let message = format!(
                "`{}` timed out after {}s",
                spec.to_shell_command(),
                spec.timeout.as_secs()
            );
            return Err(InvocationResult::failure(ErrorKind::Timeout, message, Some(output)));
        }
        if !output.success() {
            let message = match output.exit_code {
                Some(code) => format!("`{}` exited with code {code}", spec.to_shell_command()),
                None => format!("`{}` was terminated", spec.to_shell_command()),
            };
            return Err(InvocationResult::failure(kind, message, Some(output)));
        }
        Ok(output)
    }
}

/// Build and invoke from the directory holding the handler's source
fn working_dir(request: &InvocationRequest) -> PathBuf {
    super::artifacts::code_uri(&request.document)
        .unwrap_or_else(|_| request.workspace_folder.path.clone())
}

/// State of one invocation, logged on every transition
struct Run<'a> {
    handler_name: &'a str,
    state: InvocationState,
}

impl<'a> Run<'a> {
    fn new(handler_name: &'a str) -> Self {
        debug!("Invocation of '{handler_name}' is {}", InvocationState::Idle);
        Self {
            handler_name,
            state: InvocationState::Idle,
        }
    }

    fn transition(&mut self, next: InvocationState) {
        info!(
            "Invocation of '{}': {} -> {next}",
            self.handler_name, self.state
        );
        self.state = next;
    }

    fn fail(&mut self, result: InvocationResult) -> InvocationResult {
        if let Some(error) = &result.error {
            warn!(
                "Invocation of '{}' failed while {}: {}",
                self.handler_name, self.state, error.message
            );
        }
        self.transition(InvocationState::Failed);
        result
    }
}
