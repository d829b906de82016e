use super::InvocationRequest;
use crate::error::{Error, Result};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Logical id of the single function in a generated template
pub const FUNCTION_LOGICAL_ID: &str = "SamRunnerFunction";

const ARTIFACTS_DIR: &str = ".sam-runner";

/// Files generated for one invocation under `<workspace>/.sam-runner/<handler>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationArtifacts {
    pub dir: PathBuf,
    pub template: PathBuf,
    pub event: PathBuf,
    pub env_vars: Option<PathBuf>,
    pub build_dir: PathBuf,
}

impl InvocationArtifacts {
    pub fn location(request: &InvocationRequest) -> PathBuf {
        request
            .workspace_folder
            .path
            .join(ARTIFACTS_DIR)
            .join(dir_name(&request.handler_name))
    }

    /// Template written by `sam build`
    pub fn built_template(&self) -> PathBuf {
        self.build_dir.join("template.yaml")
    }

    /// Paths an invocation of `request` uses, without touching the disk
    pub fn planned(request: &InvocationRequest) -> Self {
        let dir = Self::location(request);
        Self {
            template: dir.join("template.json"),
            event: dir.join("event.json"),
            env_vars: (!request.environment_variables.is_empty())
                .then(|| dir.join("env-vars.json")),
            build_dir: dir.join("build"),
            dir,
        }
    }

    /// Write the template, event and environment files for `request`.
    pub async fn prepare(request: &InvocationRequest) -> Result<Self> {
        let artifacts = Self::planned(request);
        tokio::fs::create_dir_all(&artifacts.dir).await?;

        let code_uri = code_uri(&request.document)?;
        write_json(&artifacts.template, &render_template(request, &code_uri)).await?;
        write_json(&artifacts.event, &request.event).await?;
        if let Some(env_vars) = &artifacts.env_vars {
            write_json(
                env_vars,
                &json!({ FUNCTION_LOGICAL_ID: request.environment_variables }),
            )
            .await?;
        }

        debug!("Prepared invocation artifacts in {}", artifacts.dir.display());
        Ok(artifacts)
    }
}

/// Directory containing the handler's source file
pub(crate) fn code_uri(document: &Path) -> Result<PathBuf> {
    document
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            Error::Other(format!(
                "Cannot determine the code directory of {}",
                document.display()
            ))
        })
}

fn render_template(request: &InvocationRequest, code_uri: &Path) -> serde_json::Value {
    let mut properties = json!({
        "Handler": request.handler_name,
        "Runtime": request.runtime,
        "CodeUri": code_uri,
    });
    // `sam local invoke --env-vars` only overrides variables declared here
    if !request.environment_variables.is_empty() {
        properties["Environment"] = json!({ "Variables": request.environment_variables });
    }

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Transform": "AWS::Serverless-2016-10-31",
        "Resources": {
            FUNCTION_LOGICAL_ID: {
                "Type": "AWS::Serverless::Function",
                "Properties": properties,
            }
        }
    })
}

fn dir_name(handler_name: &str) -> String {
    handler_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, contents).await?;
    Ok(())
}
