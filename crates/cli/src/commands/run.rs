use anyhow::{Result, anyhow, bail};
use sam_runner_core::{Affordance, AffordanceAction, TextDocument};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::analyze::spans_line;
use super::console_runner;
use crate::display::print_command_breakdown;
use crate::utils::{absolute_path, parse_filepath_with_line};

pub async fn run_command(
    filepath_arg: &str,
    handler: Option<&str>,
    debug: bool,
    dry_run: bool,
    workspaces: Vec<PathBuf>,
) -> Result<()> {
    debug!("Running handler from: {}", filepath_arg);

    let (filepath, line) = parse_filepath_with_line(filepath_arg);
    let path = absolute_path(Path::new(&filepath))?;
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    let runner = console_runner(&path, workspaces)?;
    let document = runner.open(&path).await?;
    let language = document
        .language()
        .ok_or_else(|| anyhow!("No handler support for {}", path.display()))?;
    let affordances = runner.build_affordances(&document, language)?;

    let action = if debug {
        AffordanceAction::Debug
    } else {
        AffordanceAction::Run
    };
    let affordance = select_affordance(&document, &affordances, action, handler, line)?;

    if dry_run {
        let plan = runner
            .plan(affordance, debug)
            .await
            .ok_or_else(|| anyhow!("SAM CLI was not found"))?;

        println!("🔍 Dry run: {}", affordance.handler_name);
        println!("{}", "=".repeat(80));
        for spec in &plan {
            println!("\n$ {}", spec.to_shell_command());
            print_command_breakdown(spec);
        }
        return Ok(());
    }

    eprintln!(
        "🚀 {} {} ({})",
        if debug { "Debugging" } else { "Running" },
        affordance.handler_name,
        affordance.language
    );
    let result = runner.invoke(affordance, debug).await;

    if let Some(error) = &result.error {
        if !result.output.is_empty() {
            eprintln!("{}", result.output.trim_end());
        }
        bail!("{}", error.message);
    }

    println!("{}", result.output.trim_end());
    eprintln!("✅ {} succeeded", affordance.handler_name);
    Ok(())
}

/// Pick the affordance to run: by name, then by line, then the only one
fn select_affordance<'a>(
    document: &TextDocument,
    affordances: &'a [Affordance],
    action: AffordanceAction,
    handler: Option<&str>,
    line: Option<usize>,
) -> Result<&'a Affordance> {
    if affordances.is_empty() {
        bail!("No handlers found in {}", document.path().display());
    }

    let matching: Vec<&Affordance> = affordances.iter().filter(|a| a.action == action).collect();
    if matching.is_empty() {
        bail!(
            "Debugging is not supported for {} handlers",
            affordances[0].language
        );
    }

    if let Some(name) = handler {
        return matching
            .into_iter()
            .find(|a| a.handler_name == name)
            .ok_or_else(|| {
                anyhow!(
                    "Handler '{name}' not found. Available: {}",
                    handler_names(affordances)
                )
            });
    }

    let candidates: Vec<&Affordance> = match line {
        Some(line) => matching
            .into_iter()
            .filter(|a| spans_line(document, a, line))
            .collect(),
        None => matching,
    };

    match candidates.as_slice() {
        [only] => Ok(*only),
        [] => bail!(
            "No handler at line {}. Available: {}",
            line.map(|l| l + 1).unwrap_or_default(),
            handler_names(affordances)
        ),
        _ => bail!(
            "Multiple handlers found, choose one with --handler: {}",
            handler_names(affordances)
        ),
    }
}

fn handler_names(affordances: &[Affordance]) -> String {
    let mut names: Vec<&str> = affordances.iter().map(|a| a.handler_name.as_str()).collect();
    names.dedup();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sam_runner_core::{Language, SourceRange, WorkspaceFolder};

    const SOURCE: &str = "exports.first = (e) => e;\n\nexports.second = (e) => e;\n";

    fn document() -> TextDocument {
        TextDocument::new("/work/app.js", SOURCE, "javascript")
    }

    fn affordance(name: &str, range: SourceRange, action: AffordanceAction) -> Affordance {
        Affordance {
            document: "/work/app.js".into(),
            handler_name: name.to_string(),
            range,
            workspace_folder: WorkspaceFolder::new("/work"),
            language: Language::JavaScript,
            action,
            command: Language::JavaScript.invoke_command_key(),
            title: action.title().to_string(),
        }
    }

    fn affordances() -> Vec<Affordance> {
        let first = SourceRange::new(0, 25);
        let second = SourceRange::new(27, 53);
        vec![
            affordance("app.first", first, AffordanceAction::Run),
            affordance("app.first", first, AffordanceAction::Debug),
            affordance("app.second", second, AffordanceAction::Run),
            affordance("app.second", second, AffordanceAction::Debug),
        ]
    }

    #[test]
    fn test_select_by_name() {
        let doc = document();
        let all = affordances();
        let selected =
            select_affordance(&doc, &all, AffordanceAction::Debug, Some("app.second"), None).unwrap();
        assert_eq!(selected.handler_name, "app.second");
        assert_eq!(selected.action, AffordanceAction::Debug);
    }

    #[test]
    fn test_select_by_line() {
        let doc = document();
        let all = affordances();
        let selected = select_affordance(&doc, &all, AffordanceAction::Run, None, Some(2)).unwrap();
        assert_eq!(selected.handler_name, "app.second");

        let err = select_affordance(&doc, &all, AffordanceAction::Run, None, Some(1)).unwrap_err();
        assert!(err.to_string().contains("No handler at line 2"));
    }

    #[test]
    fn test_ambiguous_selection_lists_handlers() {
        let doc = document();
        let all = affordances();
        let err = select_affordance(&doc, &all, AffordanceAction::Run, None, None).unwrap_err();
        assert!(err.to_string().contains("app.first, app.second"));
    }

    #[test]
    fn test_debug_without_debug_affordances() {
        let doc = document();
        let runs: Vec<_> = affordances()
            .into_iter()
            .filter(|a| a.action == AffordanceAction::Run)
            .collect();
        let err = select_affordance(&doc, &runs, AffordanceAction::Debug, None, Some(0)).unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }
}
