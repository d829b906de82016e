use anyhow::{Result, bail};
use sam_runner_core::{CONFIGURE_COMMAND, CommandArgs, CommandOutput};
use std::path::{Path, PathBuf};

use super::console_runner;
use crate::utils::{absolute_path, parse_filepath_with_line};

pub async fn configure_command(filepath_arg: &str, handler: &str, workspaces: Vec<PathBuf>) -> Result<()> {
    let (filepath, _) = parse_filepath_with_line(filepath_arg);
    let path = absolute_path(Path::new(&filepath))?;
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    let runner = console_runner(&path, workspaces)?;
    let folder = runner.workspace_folder_for(&path)?;

    let args = CommandArgs::Configure {
        workspace_folder: folder.path.clone(),
        handler_name: handler.to_string(),
    };
    match runner.commands().execute(CONFIGURE_COMMAND, args).await? {
        CommandOutput::Configured(config_path) => {
            println!("⚙️  Configured {handler} in {}", config_path.display());
            Ok(())
        }
        other => bail!("Unexpected output from {CONFIGURE_COMMAND}: {other:?}"),
    }
}
