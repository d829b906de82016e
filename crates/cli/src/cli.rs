use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    analyze_command, configure_command, detect_command, run_command, validate_command,
};

#[derive(Parser, Debug)]
#[command(name = "sam-runner")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Workspace folder; repeat for multi-root workspaces (defaults to the current directory)
    #[arg(short, long = "workspace", global = true)]
    pub workspaces: Vec<PathBuf>,

    /// Enable debug logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List handlers and their run/debug/configure actions
    #[command(visible_alias = "a")]
    Analyze {
        /// Source file or directory to scan
        path: String,

        /// Print affordances as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build and invoke a handler locally
    #[command(visible_alias = "r")]
    Run {
        /// Source file with optional line number (e.g., src/app.js:12)
        filepath: String,

        /// Handler to run (e.g., app.handler)
        #[arg(long)]
        handler: Option<String>,

        /// Start the handler with a debugger attached
        #[arg(short, long)]
        debug: bool,

        /// Print the SAM CLI commands without executing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Add a handler entry to .sam-runner.json
    Configure {
        /// Source file defining the handler
        filepath: String,

        /// Handler to configure (e.g., app.handler)
        #[arg(long)]
        handler: String,
    },
    /// Locate the SAM CLI and report its version
    Detect {
        /// Ignore any cached detection
        #[arg(short, long)]
        force: bool,
    },
    /// Check that the installed SAM CLI version is supported
    Validate,
}

impl Cli {
    pub fn workspace_folders(&self) -> Result<Vec<PathBuf>> {
        if self.workspaces.is_empty() {
            return Ok(vec![crate::utils::absolute_path(&std::env::current_dir()?)?]);
        }
        self.workspaces
            .iter()
            .map(|w| crate::utils::absolute_path(w))
            .collect()
    }

    /// Execute the command
    pub async fn execute(self) -> Result<()> {
        let workspaces = self.workspace_folders()?;

        match self.command {
            Commands::Analyze { path, json } => analyze_command(&path, json, workspaces).await,
            Commands::Run {
                filepath,
                handler,
                debug,
                dry_run,
            } => run_command(&filepath, handler.as_deref(), debug, dry_run, workspaces).await,
            Commands::Configure { filepath, handler } => {
                configure_command(&filepath, &handler, workspaces).await
            }
            Commands::Detect { force } => detect_command(force, workspaces).await,
            Commands::Validate => validate_command(workspaces).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "sam-runner",
            "run",
            "src/app.js:12",
            "--debug",
            "-w",
            "/work",
            "-w",
            "/other",
        ]);
        assert_eq!(cli.workspaces, vec![PathBuf::from("/work"), PathBuf::from("/other")]);
        let Commands::Run {
            filepath,
            debug,
            dry_run,
            handler,
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(filepath, "src/app.js:12");
        assert!(debug);
        assert!(!dry_run);
        assert_eq!(handler, None);
    }

    #[test]
    fn test_configure_requires_handler() {
        assert!(Cli::try_parse_from(["sam-runner", "configure", "app.js"]).is_err());
    }
}
