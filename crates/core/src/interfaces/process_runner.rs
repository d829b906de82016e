//! Subprocess execution interface

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything needed to launch one external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl ProcessSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Render as a copy-pasteable shell line
    pub fn to_shell_command(&self) -> String {
        let mut cmd = quote(&self.program.to_string_lossy());
        for arg in &self.args {
            cmd.push(' ');
            cmd.push_str(&quote(arg));
        }
        cmd
    }
}

fn quote(arg: &str) -> String {
    if arg.contains(' ') {
        format!("'{arg}'")
    } else {
        arg.to_string()
    }
}

/// Captured result of a finished (or killed) process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal or timed out
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Receives process output line by line while the process is running.
pub trait OutputSink: Send + Sync {
    fn on_stdout(&self, line: &str);
    fn on_stderr(&self, line: &str);
}

/// Discards streamed output
pub struct NullOutputSink;

impl OutputSink for NullOutputSink {
    fn on_stdout(&self, _line: &str) {}
    fn on_stderr(&self, _line: &str) {}
}

/// Trait for launching external processes
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `spec` to completion or timeout. Spawn failures are errors; a
    /// non-zero exit is reported through [`ProcessOutput`].
    async fn run(&self, spec: &ProcessSpec, sink: &dyn OutputSink) -> Result<ProcessOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_command_quotes_spaces() {
        let spec = ProcessSpec::new("sam")
            .arg("build")
            .arg("--template")
            .arg("/tmp/my project/template.yaml");
        assert_eq!(
            spec.to_shell_command(),
            "sam build --template '/tmp/my project/template.yaml'"
        );
    }

    #[test]
    fn test_output_success_requires_zero_exit() {
        let ok = ProcessOutput {
            exit_code: Some(0),
            ..Default::default()
        };
        assert!(ok.success());

        let timed_out = ProcessOutput {
            exit_code: Some(0),
            timed_out: true,
            ..Default::default()
        };
        assert!(!timed_out.success());
        assert!(!ProcessOutput::default().success());
    }
}
