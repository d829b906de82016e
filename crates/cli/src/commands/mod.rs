pub mod analyze;
pub mod configure;
pub mod detect;
pub mod run;
pub mod validate;

pub use analyze::analyze_command;
pub use configure::configure_command;
pub use detect::detect_command;
pub use run::run_command;
pub use validate::validate_command;

use anyhow::Result;
use sam_runner_core::{Config, SamRunner, SamServices};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::display::{ConsoleNotifier, ConsoleOutputSink};

/// Runner configured from the nearest `.sam-runner.json` above `start`,
/// reporting to the console
pub(crate) fn console_runner(start: &Path, workspaces: Vec<PathBuf>) -> Result<SamRunner> {
    let config = Config::discover(start)?;
    config.validate()?;

    let services = SamServices::new(&config, workspaces)
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_output(Arc::new(ConsoleOutputSink));
    Ok(SamRunner::with_services(config, services))
}

/// Config lookup for commands that are not tied to a source file
pub(crate) fn workspace_runner(workspaces: Vec<PathBuf>) -> Result<SamRunner> {
    let start = match workspaces.first() {
        Some(folder) => folder.clone(),
        None => std::env::current_dir()?,
    };
    console_runner(&start, workspaces)
}
