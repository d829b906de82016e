use crate::{
    document::TextDocument,
    error::{Error, Result},
    interfaces::WorkspaceResolver,
    types::{
        Affordance, AffordanceAction, CONFIGURE_COMMAND, DebugPolicy, HandlerCandidate, Language,
        WorkspaceFolder,
    },
};
use std::path::Path;
use tracing::{debug, error};

/// Check that a fully qualified handler name only uses `[A-Za-z0-9_.-]`.
///
/// Periods are allowed since the module path is part of the name.
pub fn validate_handler_name(handler_name: &str) -> Result<()> {
    let valid = !handler_name.is_empty()
        && handler_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::HandlerNameValidation(handler_name.to_string()))
    }
}

/// Turn scanner output into run, debug and configure affordances.
///
/// Per candidate, in discovery order: `Run`, then `Debug` if `policy` supports
/// the language, then `Configure` unless the handler name is invalid. Fails as
/// a whole if the document is outside every workspace folder.
pub fn make_affordances(
    document: &TextDocument,
    candidates: &[HandlerCandidate],
    language: Language,
    resolver: &dyn WorkspaceResolver,
    policy: &DebugPolicy,
) -> Result<Vec<Affordance>> {
    let mut affordances = Vec::with_capacity(candidates.len() * 3);

    for candidate in candidates {
        let workspace_folder = workspace_folder_for(document.path(), resolver)?;
        let range = candidate.range.normalize(document);

        let make = |action: AffordanceAction, command: String| Affordance {
            document: document.path().to_path_buf(),
            handler_name: candidate.handler_name.clone(),
            range,
            workspace_folder: workspace_folder.clone(),
            language,
            action,
            command,
            title: action.title().to_string(),
        };

        affordances.push(make(AffordanceAction::Run, language.invoke_command_key()));
        if policy.supports(language) {
            affordances.push(make(AffordanceAction::Debug, language.invoke_command_key()));
        }

        match validate_handler_name(&candidate.handler_name) {
            Ok(()) => affordances.push(make(
                AffordanceAction::Configure,
                CONFIGURE_COMMAND.to_string(),
            )),
            Err(e) => error!(
                "Could not generate 'configure' affordance for handler '{}': {e}",
                candidate.handler_name
            ),
        }
    }

    debug!(
        "Generated {} affordances for {}",
        affordances.len(),
        document.path().display()
    );
    Ok(affordances)
}

/// First affordance of kind `action` whose range contains `offset`
pub fn affordance_at(
    affordances: &[Affordance],
    offset: usize,
    action: AffordanceAction,
) -> Option<&Affordance> {
    affordances
        .iter()
        .find(|a| a.action == action && a.range.contains(offset))
}

/// The workspace folder owning `path`; a path outside every folder is an error
pub fn workspace_folder_for(path: &Path, resolver: &dyn WorkspaceResolver) -> Result<WorkspaceFolder> {
    resolver
        .folder_for(path)
        .ok_or_else(|| Error::WorkspaceResolution(path.to_path_buf()))
}
