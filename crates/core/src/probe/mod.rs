//! Detection and version validation of the SAM CLI

mod cache;
mod locator;
mod version;

pub use cache::DetectionCache;
pub use locator::SamCliLocator;
pub use version::{SupportedRange, ValidationOutcome, parse_version};

use crate::{
    interfaces::{NotificationLevel, Notifier, NullOutputSink, ProcessRunner, ProcessSpec},
    single_flight::SingleFlight,
};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Single-flight key shared by every detection
pub const DETECT_KEY: &str = "samcli.detect";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDetectionResult {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    pub validation_outcome: ValidationOutcome,
}

impl ToolDetectionResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            path: None,
            version: None,
            validation_outcome: ValidationOutcome::NotFound,
        }
    }
}

/// Finds the SAM CLI, asks it for its version and remembers the answer.
#[derive(Clone)]
pub struct ToolProbe {
    locator: SamCliLocator,
    runner: Arc<dyn ProcessRunner>,
    notifier: Arc<dyn Notifier>,
    range: SupportedRange,
    timeout: Duration,
    cache: DetectionCache,
    flights: SingleFlight<ToolDetectionResult>,
}

impl ToolProbe {
    pub fn new(
        locator: SamCliLocator,
        runner: Arc<dyn ProcessRunner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            locator,
            runner,
            notifier,
            range: SupportedRange::default(),
            timeout: Duration::from_secs(10),
            cache: DetectionCache::new(),
            flights: SingleFlight::new(),
        }
    }

    pub fn with_range(mut self, range: SupportedRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &DetectionCache {
        &self.cache
    }

    pub fn range(&self) -> &SupportedRange {
        &self.range
    }

    /// Detect the SAM CLI, reusing the cached result unless `force_refresh`.
    ///
    /// Concurrent callers share one probe. Never fails: a missing or broken
    /// tool is reported through the result.
    pub async fn detect(&self, force_refresh: bool) -> ToolDetectionResult {
        if !force_refresh {
            if let Some(cached) = self.cache.get() {
                debug!("Using cached SAM CLI detection");
                return cached;
            }
        }

        let locator = self.locator.clone();
        let runner = Arc::clone(&self.runner);
        let cache = self.cache.clone();
        let range = self.range.clone();
        let timeout = self.timeout;

        let outcome = self
            .flights
            .get_existing_or_create(DETECT_KEY, move || async move {
                let result = probe(&locator, runner.as_ref(), &range, timeout).await;
                cache.set(result.clone());
                Ok(result)
            })
            .await;

        match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!("SAM CLI detection failed: {e}");
                ToolDetectionResult::not_found()
            }
        }
    }

    /// Classify the detected tool and tell the user about anything but `Valid`.
    pub async fn validate_and_notify(&self) -> ValidationOutcome {
        let detection = self.detect(false).await;
        let outcome = detection.validation_outcome;

        let message = match outcome {
            ValidationOutcome::Valid => {
                debug!("SAM CLI version is supported");
                return outcome;
            }
            ValidationOutcome::NotFound => {
                "SAM CLI was not found. Install it or set sam_cli.location in .sam-runner.json"
                    .to_string()
            }
            ValidationOutcome::VersionNotParseable => {
                "Unable to determine the SAM CLI version. Check that the SAM CLI is installed correctly"
                    .to_string()
            }
            ValidationOutcome::TooOld => format!(
                "SAM CLI {} is too old. Supported versions: {}. Upgrade the SAM CLI",
                display_version(&detection),
                self.range
            ),
            ValidationOutcome::TooNew => format!(
                "SAM CLI {} is newer than supported ({}). Update sam-runner",
                display_version(&detection),
                self.range
            ),
        };

        let level = match outcome {
            ValidationOutcome::NotFound | ValidationOutcome::VersionNotParseable => {
                NotificationLevel::Error
            }
            _ => NotificationLevel::Warning,
        };
        self.notifier.notify(level, &message);
        outcome
    }
}

fn display_version(detection: &ToolDetectionResult) -> String {
    detection
        .version
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn probe(
    locator: &SamCliLocator,
    runner: &dyn ProcessRunner,
    range: &SupportedRange,
    timeout: Duration,
) -> ToolDetectionResult {
    let Some(path) = locator.locate() else {
        info!("SAM CLI not found");
        return ToolDetectionResult::not_found();
    };

    let spec = ProcessSpec::new(&path).arg("--version").with_timeout(timeout);
    let version = match runner.run(&spec, &NullOutputSink).await {
        Ok(output) if output.success() => parse_version(&output.stdout)
            // Older releases print the version on stderr
            .or_else(|| parse_version(&output.stderr)),
        Ok(output) => {
            warn!(
                "`{}` exited with {:?}: {}",
                spec.to_shell_command(),
                output.exit_code,
                output.stderr.trim()
            );
            None
        }
        Err(e) => {
            warn!("Failed to run `{}`: {e}", spec.to_shell_command());
            None
        }
    };

    let validation_outcome = match &version {
        Some(version) => range.classify(version),
        None => ValidationOutcome::VersionNotParseable,
    };
    info!(
        "Detected SAM CLI at {} (version {}, {validation_outcome})",
        path.display(),
        version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );

    ToolDetectionResult {
        found: true,
        path: Some(path),
        version,
        validation_outcome,
    }
}
