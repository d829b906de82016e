use sam_runner_core::interfaces::{NotificationLevel, Notifier, OutputSink};

/// Prints user-facing messages to stderr
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        let prefix = match level {
            NotificationLevel::Info => "ℹ️ ",
            NotificationLevel::Warning => "⚠️ ",
            NotificationLevel::Error => "❌",
        };
        eprintln!("{prefix} {message}");
    }
}

/// Streams SAM CLI output to stderr so stdout only carries the handler's result
#[derive(Debug, Default, Clone)]
pub struct ConsoleOutputSink;

impl OutputSink for ConsoleOutputSink {
    fn on_stdout(&self, line: &str) {
        eprintln!("   {line}");
    }

    fn on_stderr(&self, line: &str) {
        eprintln!("   {line}");
    }
}
