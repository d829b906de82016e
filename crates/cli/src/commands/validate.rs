use anyhow::{Result, bail};
use sam_runner_core::{
    CommandArgs, CommandOutput, ValidationOutcome, dispatch::VALIDATE_VERSION_COMMAND,
    probe::SupportedRange,
};
use std::path::PathBuf;

use super::workspace_runner;

pub async fn validate_command(workspaces: Vec<PathBuf>) -> Result<()> {
    let runner = workspace_runner(workspaces)?;
    let sam_cli = &runner.config().sam_cli;
    let range = SupportedRange::new(sam_cli.min_version.clone(), sam_cli.max_version.clone());

    let outcome = match runner
        .commands()
        .execute(VALIDATE_VERSION_COMMAND, CommandArgs::None)
        .await?
    {
        CommandOutput::Validation(outcome) => outcome,
        other => bail!("Unexpected output from {VALIDATE_VERSION_COMMAND}: {other:?}"),
    };

    match outcome {
        ValidationOutcome::Valid => {
            println!("✅ SAM CLI version is supported ({range})");
            Ok(())
        }
        other => bail!("SAM CLI validation failed: {other} (supported: {range})"),
    }
}
