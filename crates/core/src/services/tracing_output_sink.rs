use crate::interfaces::OutputSink;

/// Forwards process output lines to the log
#[derive(Debug, Default, Clone)]
pub struct TracingOutputSink;

impl OutputSink for TracingOutputSink {
    fn on_stdout(&self, line: &str) {
        tracing::info!(target: "sam_runner::process", "{line}");
    }

    fn on_stderr(&self, line: &str) {
        tracing::debug!(target: "sam_runner::process", stream = "stderr", "{line}");
    }
}
