//! Outcome recording for command executions
//!
//! [`with_telemetry`] runs an operation exactly once and then hands one
//! [`TelemetryDatum`] to a [`TelemetrySink`]. Sinks are infallible: a sink
//! that cannot write logs the problem and carries on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub type TelemetryMetadata = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryDatum {
    pub command: String,
    pub metadata: TelemetryMetadata,
    pub success: bool,
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Metadata every datum starts from: the runtime and whether it was a debug run.
pub fn default_metadata(runtime: Option<&str>, is_debug: bool) -> TelemetryMetadata {
    TelemetryMetadata::from([
        ("runtime".to_string(), runtime.unwrap_or("none").to_string()),
        ("debug".to_string(), is_debug.to_string()),
    ])
}

pub trait TelemetrySink: Send + Sync {
    fn record(&self, datum: &TelemetryDatum);
}

/// Anything whose success can be read back after the operation finished
pub trait TelemetryOutcome {
    fn succeeded(&self) -> bool;
}

impl<T, E> TelemetryOutcome for Result<T, E> {
    fn succeeded(&self) -> bool {
        self.is_ok()
    }
}

/// Run `operation`, then record exactly one datum and return its output untouched.
///
/// `metadata` is merged over [`default_metadata`] with no runtime and `debug=false`.
pub async fn with_telemetry<R, Fut>(
    sink: &dyn TelemetrySink,
    command: &str,
    metadata: TelemetryMetadata,
    operation: Fut,
) -> R
where
    Fut: Future<Output = R>,
    R: TelemetryOutcome,
{
    let mut merged = default_metadata(None, false);
    merged.extend(metadata);

    debug!(command, "Command started");
    let started = Instant::now();
    let output = operation.await;
    let duration = started.elapsed();
    let success = output.succeeded();

    if success {
        debug!(command, duration_ms = duration.as_millis() as u64, "Command completed");
    } else {
        warn!(command, duration_ms = duration.as_millis() as u64, "Command failed");
    }

    sink.record(&TelemetryDatum {
        command: command.to_string(),
        metadata: merged,
        success,
        duration,
    });
    output
}

/// Logs each datum as a structured event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, datum: &TelemetryDatum) {
        info!(
            target: "sam_runner::telemetry",
            command = %datum.command,
            success = datum.success,
            duration_ms = datum.duration.as_millis() as u64,
            metadata = ?datum.metadata,
            "telemetry"
        );
    }
}

/// Drops everything; used when telemetry is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _datum: &TelemetryDatum) {}
}

/// Appends data as JSON lines to a file
#[derive(Debug)]
pub struct FileTelemetrySink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTelemetrySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, datum: &TelemetryDatum) -> std::io::Result<()> {
        let line = serde_json::to_string(datum)?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl TelemetrySink for FileTelemetrySink {
    fn record(&self, datum: &TelemetryDatum) {
        if let Err(e) = self.append(datum) {
            warn!(
                "Failed to write telemetry to {}: {e}",
                self.path.display()
            );
        }
    }
}

/// Keeps every datum in memory
#[derive(Debug, Default)]
pub struct MemoryTelemetrySink {
    data: Mutex<Vec<TelemetryDatum>>,
}

impl MemoryTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Vec<TelemetryDatum> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TelemetrySink for MemoryTelemetrySink {
    fn record(&self, datum: &TelemetryDatum) {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(datum.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_one_datum_per_call() {
        let sink = MemoryTelemetrySink::new();

        let value: Result<u32> = with_telemetry(&sink, "sam.detect", TelemetryMetadata::new(), async {
            Ok(7)
        })
        .await;

        assert_eq!(value.unwrap(), 7);
        let data = sink.data();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].command, "sam.detect");
        assert!(data[0].success);
        assert_eq!(data[0].metadata, default_metadata(None, false));
    }

    #[tokio::test]
    async fn test_failure_is_recorded_and_returned_unchanged() {
        let sink = MemoryTelemetrySink::new();

        let result: Result<()> = with_telemetry(&sink, "sam.configure", TelemetryMetadata::new(), async {
            Err(Error::Other("no workspace".to_string()))
        })
        .await;

        assert_eq!(result.unwrap_err().to_string(), "no workspace");
        assert!(!sink.data()[0].success);
    }

    #[tokio::test]
    async fn test_supplied_metadata_overrides_defaults() {
        let sink = MemoryTelemetrySink::new();
        let mut metadata = default_metadata(Some("nodejs18.x"), true);
        metadata.insert("handler".to_string(), "app.handler".to_string());

        let _: Result<()> = with_telemetry(&sink, "sam.local.invoke.javascript", metadata, async { Ok(()) }).await;

        let recorded = &sink.data()[0].metadata;
        assert_eq!(recorded["runtime"], "nodejs18.x");
        assert_eq!(recorded["debug"], "true");
        assert_eq!(recorded["handler"], "app.handler");
    }

    #[tokio::test]
    async fn test_repeated_pure_operation_records_equal_data() {
        let sink = MemoryTelemetrySink::new();
        for _ in 0..2 {
            let metadata = default_metadata(Some("python3.11"), false);
            let _: Result<u8> = with_telemetry(&sink, "sam.local.invoke.python", metadata, async { Ok(1) }).await;
        }

        let data = sink.data();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].success, data[1].success);
        assert_eq!(data[0].metadata, data[1].metadata);
    }

    #[tokio::test]
    async fn test_file_sink_writes_json_lines() {
        let dir = TempDir::new().unwrap();
        let sink = FileTelemetrySink::new(dir.path().join("telemetry.jsonl"));

        for command in ["sam.detect", "sam.validate.version"] {
            let _: Result<()> = with_telemetry(&sink, command, TelemetryMetadata::new(), async { Ok(()) }).await;
        }

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let data: Vec<TelemetryDatum> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].command, "sam.validate.version");
        assert!(contents.contains("\"duration_ms\""));
    }

    #[test]
    fn test_file_sink_swallows_write_errors() {
        let sink = FileTelemetrySink::new("/nonexistent/dir/telemetry.jsonl");
        sink.record(&TelemetryDatum {
            command: "sam.detect".to_string(),
            metadata: TelemetryMetadata::new(),
            success: true,
            duration: Duration::from_millis(3),
        });
    }
}
