//! Process runner backed by `tokio::process`

use crate::{
    error::{Error, Result},
    interfaces::{OutputSink, ProcessOutput, ProcessRunner, ProcessSpec},
};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Spawns real processes, streams their output and enforces the `ProcessSpec` timeout.
#[derive(Debug, Default, Clone)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ProcessSpec, sink: &dyn OutputSink) -> Result<ProcessOutput> {
        let mut command = Command::new(&spec.program);
        command.kill_on_drop(true);
        command.args(&spec.args);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        if let Some(dir) = spec.working_dir() {
            command.current_dir(dir);
        }

        debug!("Spawning: {}", spec.to_shell_command());
        let mut child = command.spawn().map_err(|e| {
            Error::ProcessError(format!("failed to spawn '{}': {e}", spec.program.display()))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut stdout_buf = String::new();
        let mut stderr_buf = String::new();

        let finished = tokio::time::timeout(spec.timeout, async {
            tokio::join!(
                read_lines(stdout, &mut stdout_buf, |line| sink.on_stdout(line)),
                read_lines(stderr, &mut stderr_buf, |line| sink.on_stderr(line)),
                child.wait(),
            )
        })
        .await;

        match finished {
            Ok((out, err, status)) => {
                out?;
                err?;
                let status = status?;
                debug!("Process exited with {status}");
                Ok(ProcessOutput {
                    exit_code: status.code(),
                    stdout: stdout_buf,
                    stderr: stderr_buf,
                    timed_out: false,
                })
            }
            Err(_) => {
                warn!(
                    "'{}' timed out after {}ms, killing it",
                    spec.program.display(),
                    spec.timeout.as_millis()
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out process: {e}");
                }
                Ok(ProcessOutput {
                    exit_code: None,
                    stdout: stdout_buf,
                    stderr: stderr_buf,
                    timed_out: true,
                })
            }
        }
    }
}

/// Stream `reader` line by line. Output is decoded lossily so a stray
/// non-UTF-8 byte never stops the pipe from being drained.
async fn read_lines<R>(
    reader: Option<R>,
    buffer: &mut String,
    mut on_line: impl FnMut(&str),
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(());
    };
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            return Ok(());
        }
        let bytes = raw.strip_suffix(b"\n").unwrap_or(&raw[..]);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        let line = String::from_utf8_lossy(bytes);
        on_line(&line);
        buffer.push_str(&line);
        buffer.push('\n');
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::interfaces::NullOutputSink;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct CollectingSink {
        lines: Mutex<Vec<String>>,
    }

    impl OutputSink for CollectingSink {
        fn on_stdout(&self, line: &str) {
            self.lines.lock().unwrap().push(format!("out:{line}"));
        }
        fn on_stderr(&self, line: &str) {
            self.lines.lock().unwrap().push(format!("err:{line}"));
        }
    }

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let spec = ProcessSpec::new("sh").arg("-c").arg("echo hello; echo oops >&2; exit 3");
        let sink = CollectingSink::default();
        let output = TokioProcessRunner::new().run(&spec, &sink).await.unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
        assert!(!output.success());

        let lines = sink.lines.lock().unwrap();
        assert!(lines.contains(&"out:hello".to_string()));
        assert!(lines.contains(&"err:oops".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_utf8_output_is_decoded_lossily() {
        let spec = ProcessSpec::new("sh")
            .arg("-c")
            .arg("printf 'ok\\377\\n'; printf 'bad\\376\\n' >&2; exit 0");
        let sink = CollectingSink::default();
        let output = TokioProcessRunner::new().run(&spec, &sink).await.unwrap();

        assert_eq!(output.exit_code, Some(0));
        assert!(output.success());
        assert_eq!(output.stdout, "ok\u{fffd}\n");
        assert_eq!(output.stderr, "bad\u{fffd}\n");
        assert!(sink.lines.lock().unwrap().contains(&"out:ok\u{fffd}".to_string()));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let spec = ProcessSpec::new("sh")
            .arg("-c")
            .arg("sleep 5")
            .with_timeout(Duration::from_millis(100));
        let output = TokioProcessRunner::new()
            .run(&spec, &NullOutputSink)
            .await
            .unwrap();

        assert!(output.timed_out);
        assert_eq!(output.exit_code, None);
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let spec = ProcessSpec::new("/definitely/not/a/real/binary");
        let result = TokioProcessRunner::new().run(&spec, &NullOutputSink).await;
        assert!(matches!(result, Err(Error::ProcessError(_))));
    }
}
