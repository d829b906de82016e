use crate::{
    error::{Error, Result},
    types::{DebugPolicy, Language},
};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = ".sam-runner.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub sam_cli: SamCliConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    // Per-handler invocation settings, keyed by handler name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub handlers: BTreeMap<String, HandlerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SamCliConfig {
    /// Explicit path to the `sam` executable, checked before any search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    /// Oldest supported version (inclusive)
    pub min_version: Version,
    /// First unsupported version (exclusive)
    pub max_version: Version,
    pub detect_timeout_ms: u64,
    pub build_timeout_ms: u64,
    pub invoke_timeout_ms: u64,
}

impl Default for SamCliConfig {
    fn default() -> Self {
        Self {
            location: None,
            min_version: Version::new(0, 7, 0),
            max_version: Version::new(2, 0, 0),
            detect_timeout_ms: 10_000,
            build_timeout_ms: 300_000,
            invoke_timeout_ms: 120_000,
        }
    }
}

impl SamCliConfig {
    pub fn detect_timeout(&self) -> Duration {
        Duration::from_millis(self.detect_timeout_ms)
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_millis(self.build_timeout_ms)
    }

    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_millis(self.invoke_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DebugConfig {
    pub port: u16,
    /// Languages to enable debugging for on top of the built-in ones
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            port: 5858,
            languages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Append telemetry as JSON lines to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct HandlerConfig {
    /// Payload passed to the handler as its event
    pub event: serde_json::Value,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment_variables: BTreeMap<String, String>,
    /// Overrides the language's default runtime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            event: serde_json::Value::Object(Default::default()),
            environment_variables: BTreeMap::new(),
            runtime: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Walk up from `start_path` looking for a config file
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest config above `start_path`, or defaults if there is none
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sam_cli.min_version >= self.sam_cli.max_version {
            return Err(Error::ConfigError(format!(
                "sam_cli.min_version ({}) must be lower than sam_cli.max_version ({})",
                self.sam_cli.min_version, self.sam_cli.max_version
            )));
        }
        Ok(())
    }

    pub fn debug_policy(&self) -> DebugPolicy {
        self.debug
            .languages
            .iter()
            .fold(DebugPolicy::default(), |policy, lang| policy.with_language(*lang))
    }

    pub fn handler(&self, handler_name: &str) -> Option<&HandlerConfig> {
        self.handlers.get(handler_name)
    }

    /// Ensure `handler_name` has an entry in the config of `workspace_folder`,
    /// creating the file if needed. Returns the config file path.
    pub fn configure_handler(workspace_folder: &Path, handler_name: &str) -> Result<PathBuf> {
        let path = workspace_folder.join(CONFIG_FILE_NAME);
        let mut config = if path.is_file() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };

        if config.handlers.contains_key(handler_name) {
            tracing::debug!("Handler '{handler_name}' already configured in {}", path.display());
            return Ok(path);
        }

        config
            .handlers
            .insert(handler_name.to_string(), HandlerConfig::default());
        config.save_to_file(&path)?;
        tracing::info!("Added handler '{handler_name}' to {}", path.display());
        Ok(path)
    }
}
