//! Notifier that writes user-facing messages to the log

use crate::interfaces::{NotificationLevel, Notifier};

#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Info => tracing::info!(target: "sam_runner::notify", "{message}"),
            NotificationLevel::Warning => tracing::warn!(target: "sam_runner::notify", "{message}"),
            NotificationLevel::Error => tracing::error!(target: "sam_runner::notify", "{message}"),
        }
    }
}
