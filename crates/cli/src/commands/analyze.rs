use anyhow::{Result, bail};
use sam_runner_core::{Affordance, AffordanceAction, TextDocument};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::console_runner;
use crate::display::format_affordances;
use crate::utils::{absolute_path, collect_source_files, parse_filepath_with_line};

pub async fn analyze_command(path_arg: &str, json: bool, workspaces: Vec<PathBuf>) -> Result<()> {
    debug!("Analyzing: {}", path_arg);

    let (filepath, line) = parse_filepath_with_line(path_arg);
    let path = absolute_path(Path::new(&filepath))?;
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    let runner = console_runner(&path, workspaces)?;
    let files = if path.is_dir() {
        collect_source_files(&path)
    } else {
        vec![path.clone()]
    };

    let mut analyzed = Vec::new();
    for file in &files {
        let document = runner.open(file).await?;
        let Some(language) = document.language() else {
            debug!("Skipping {}: no handler support", file.display());
            continue;
        };

        let mut affordances = runner.build_affordances(&document, language)?;
        if let Some(line) = line {
            affordances.retain(|a| spans_line(&document, a, line));
        }
        analyzed.push((document, affordances));
    }

    if json {
        let all: Vec<&Affordance> = analyzed.iter().flat_map(|(_, a)| a).collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!(
        "🔍 Analyzing: {}{}",
        filepath,
        line.map(|l| format!(":{}", l + 1)).unwrap_or_default()
    );
    println!("{}", "=".repeat(80));

    let mut handler_count = 0;
    for (document, affordances) in &analyzed {
        if affordances.is_empty() {
            continue;
        }
        handler_count += affordances
            .iter()
            .filter(|a| a.action == AffordanceAction::Run)
            .count();
        println!("\n📄 {}", display_path(document.path(), &path));
        print!("{}", format_affordances(document, affordances));
    }

    if handler_count == 0 {
        println!("\n   No handlers found");
    } else {
        println!("\n{}", "=".repeat(80));
        println!("✅ {handler_count} handler(s) found");
    }
    Ok(())
}

/// Whether the 0-based `line` falls within the affordance's range
pub(crate) fn spans_line(document: &TextDocument, affordance: &Affordance, line: usize) -> bool {
    let start = document.position_at(affordance.range.position_start).line as usize;
    let end = document.position_at(affordance.range.position_end).line as usize;
    (start..=end).contains(&line)
}

fn display_path(file: &Path, root: &Path) -> String {
    let relative = if root.is_dir() {
        file.strip_prefix(root).unwrap_or(file)
    } else {
        file
    };
    relative.display().to_string()
}
