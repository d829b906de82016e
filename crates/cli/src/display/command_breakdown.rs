use sam_runner_core::interfaces::ProcessSpec;

pub fn print_command_breakdown(spec: &ProcessSpec) {
    println!("   🔧 Command breakdown:");
    println!("      • program: {}", spec.program.display());

    let mut args = spec.args.iter().peekable();
    let mut subcommand = Vec::new();
    while let Some(arg) = args.next_if(|a| !a.starts_with("--")) {
        subcommand.push(arg.as_str());
    }
    if !subcommand.is_empty() {
        println!("      • subcommand: {}", subcommand.join(" "));
    }

    while let Some(flag) = args.next() {
        match args.next_if(|a| !a.starts_with("--")) {
            Some(value) => println!("      • {}: {}", flag.trim_start_matches("--"), value),
            None => println!("      • {}", flag.trim_start_matches("--")),
        }
    }

    if let Some(dir) = spec.working_dir() {
        println!("      • working directory: {}", dir.display());
    }
    println!("      • timeout: {}s", spec.timeout.as_secs());
}
