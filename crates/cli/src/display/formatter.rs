use sam_runner_core::{
    Affordance, AffordanceAction, TextDocument, ToolDetectionResult, ValidationOutcome,
};

/// Render the affordances of one document, grouped by handler
pub fn format_affordances(document: &TextDocument, affordances: &[Affordance]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for affordance in affordances {
        if current != Some(affordance.handler_name.as_str()) {
            current = Some(affordance.handler_name.as_str());
            let start = document.position_at(affordance.range.position_start);
            let end = document.position_at(affordance.range.position_end);
            out.push_str(&format!(
                "\n⚡ {} ({}, lines {}-{})\n",
                affordance.handler_name,
                affordance.language,
                start.line + 1,
                end.line + 1
            ));
        }
        out.push_str(&format!(
            "   {} {:<14} → {}\n",
            action_icon(affordance.action),
            affordance.title,
            affordance.command
        ));
    }
    out
}

fn action_icon(action: AffordanceAction) -> &'static str {
    match action {
        AffordanceAction::Run => "▶️ ",
        AffordanceAction::Debug => "🐛",
        AffordanceAction::Configure => "⚙️ ",
    }
}

pub fn print_detection(result: &ToolDetectionResult) {
    if !result.found {
        println!("❌ SAM CLI not found");
        return;
    }

    if let Some(path) = &result.path {
        println!("📍 SAM CLI: {}", path.display());
    }
    match &result.version {
        Some(version) => println!("🏷️  Version: {version}"),
        None => println!("🏷️  Version: unknown"),
    }
    let status = match result.validation_outcome {
        ValidationOutcome::Valid => "✅ supported".to_string(),
        other => format!("⚠️  {other}"),
    };
    println!("   Status: {status}");
}
