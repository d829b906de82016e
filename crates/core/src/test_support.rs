//! Fakes shared by unit tests

use crate::{
    error::{Error, Result},
    interfaces::{NotificationLevel, Notifier, OutputSink, ProcessOutput, ProcessRunner, ProcessSpec},
    probe::SamCliLocator,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

pub(crate) fn exited(code: i32, stdout: &str, stderr: &str) -> ProcessOutput {
    ProcessOutput {
        exit_code: Some(code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        timed_out: false,
    }
}

pub(crate) fn timed_out(stderr: &str) -> ProcessOutput {
    ProcessOutput {
        exit_code: None,
        stdout: String::new(),
        stderr: stderr.to_string(),
        timed_out: true,
    }
}

/// Answers by the first argument (`--version`, `build`, `local`) and records
/// every spec it is asked to run.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    responses: HashMap<String, ProcessOutput>,
    spawn_failures: Vec<String>,
    delay: Duration,
    calls: Mutex<Vec<ProcessSpec>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self {
            delay: Duration::from_millis(10),
            ..Self::default()
        }
    }

    /// A runner whose `sam --version` prints `version_output`
    pub(crate) fn sam(version_output: &str) -> Self {
        Self::new().respond("--version", exited(0, version_output, ""))
    }

    pub(crate) fn respond(mut self, first_arg: &str, output: ProcessOutput) -> Self {
        self.responses.insert(first_arg.to_string(), output);
        self
    }

    pub(crate) fn fail_to_spawn(mut self, first_arg: &str) -> Self {
        self.spawn_failures.push(first_arg.to_string());
        self
    }

    pub(crate) fn specs(&self) -> Vec<ProcessSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_for(&self, first_arg: &str) -> usize {
        self.specs()
            .iter()
            .filter(|spec| spec.args.first().map(String::as_str) == Some(first_arg))
            .count()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, spec: &ProcessSpec, sink: &dyn OutputSink) -> Result<ProcessOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        tokio::time::sleep(self.delay).await;

        let key = spec.args.first().cloned().unwrap_or_default();
        if self.spawn_failures.contains(&key) {
            return Err(Error::ProcessError(format!(
                "Failed to spawn {}",
                spec.program.display()
            )));
        }

        let output = self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| exited(0, "", ""));
        output.stdout.lines().for_each(|line| sink.on_stdout(line));
        output.stderr.lines().for_each(|line| sink.on_stderr(line));
        Ok(output)
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub messages: Mutex<Vec<(NotificationLevel, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

#[derive(Default)]
pub(crate) struct CollectingSink {
    pub stdout: Mutex<Vec<String>>,
    pub stderr: Mutex<Vec<String>>,
}

impl OutputSink for CollectingSink {
    fn on_stdout(&self, line: &str) {
        self.stdout.lock().unwrap().push(line.to_string());
    }

    fn on_stderr(&self, line: &str) {
        self.stderr.lock().unwrap().push(line.to_string());
    }
}

/// Put an executable `sam` in `dir` and return a locator that only finds it
pub(crate) fn installed_sam(dir: &TempDir) -> (SamCliLocator, PathBuf) {
    let path = dir.path().join("sam");
    std::fs::write(&path, "#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    (SamCliLocator::isolated().with_configured(&path), path)
}
