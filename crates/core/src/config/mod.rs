//! Configuration management for sam-runner

mod settings;

// Re-export main types
pub use settings::{
    CONFIG_FILE_NAME, Config, DebugConfig, HandlerConfig, SamCliConfig, TelemetryConfig,
};
