use anyhow::{Result, bail};
use sam_runner_core::{CommandArgs, CommandOutput, dispatch::DETECT_COMMAND};
use std::path::PathBuf;

use super::workspace_runner;
use crate::display::print_detection;

pub async fn detect_command(force: bool, workspaces: Vec<PathBuf>) -> Result<()> {
    let runner = workspace_runner(workspaces)?;

    // The registered detect command always refreshes
    let result = if force {
        match runner.commands().execute(DETECT_COMMAND, CommandArgs::None).await? {
            CommandOutput::Detection(result) => result,
            other => bail!("Unexpected output from {DETECT_COMMAND}: {other:?}"),
        }
    } else {
        runner.detect_tool(false).await
    };

    print_detection(&result);
    if !result.found {
        bail!("SAM CLI was not found");
    }
    Ok(())
}
