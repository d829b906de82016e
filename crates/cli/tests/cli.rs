use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const JS_HANDLERS: &str = r#"exports.handler = async (event, context) => {
    return { statusCode: 200 };
};

exports.other = function (event) {
    return event;
};
"#;

const PY_HANDLER: &str = r#"def lambda_handler(event, context):
    return {"statusCode": 200}
"#;

fn sam_runner(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sam-runner").unwrap();
    cmd.current_dir(workspace).env("RUST_LOG", "off");
    cmd
}

fn workspace_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

#[test]
fn test_analyze_javascript_lists_all_actions() {
    let ws = workspace_with(&[("app.js", JS_HANDLERS)]);

    sam_runner(ws.path())
        .args(["analyze", "app.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app.handler"))
        .stdout(predicate::str::contains("app.other"))
        .stdout(predicate::str::contains("Debug Locally"))
        .stdout(predicate::str::contains("2 handler(s) found"));
}

#[test]
fn test_analyze_json_output() {
    let ws = workspace_with(&[("app.js", JS_HANDLERS)]);

    let output = sam_runner(ws.path())
        .args(["analyze", "app.js:1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let affordances: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let affordances = affordances.as_array().unwrap();
    assert_eq!(affordances.len(), 3);
    assert_eq!(affordances[0]["action"], "run");
    assert_eq!(affordances[1]["action"], "debug");
    assert_eq!(affordances[2]["command"], "sam.configure");
    assert_eq!(affordances[0]["handler_name"], "app.handler");
}

#[test]
fn test_analyze_directory_skips_dependencies() {
    let ws = workspace_with(&[
        ("src/handler.py", PY_HANDLER),
        ("node_modules/lib/index.js", JS_HANDLERS),
    ]);

    sam_runner(ws.path())
        .args(["analyze", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("handler.lambda_handler"))
        .stdout(predicate::str::contains("Debug Locally").not())
        .stdout(predicate::str::contains("index.handler").not());
}

#[test]
fn test_analyze_outside_workspace_fails() {
    let ws = workspace_with(&[]);
    let elsewhere = workspace_with(&[("app.js", JS_HANDLERS)]);

    sam_runner(ws.path())
        .args(["analyze"])
        .arg(elsewhere.path().join("app.js"))
        .args(["--workspace"])
        .arg(ws.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("external to the current workspace"));
}

#[test]
fn test_configure_writes_config() {
    let ws = workspace_with(&[("app.js", JS_HANDLERS)]);

    sam_runner(ws.path())
        .args(["configure", "app.js", "--handler", "app.handler"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configured app.handler"));

    let written = fs::read_to_string(ws.path().join(".sam-runner.json")).unwrap();
    let config: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(config["handlers"]["app.handler"]["event"], serde_json::json!({}));
}

#[test]
fn test_configure_rejects_invalid_name() {
    let ws = workspace_with(&[("app.js", JS_HANDLERS)]);

    sam_runner(ws.path())
        .args(["configure", "app.js", "--handler", "app/handler"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid handler name"));
    assert!(!ws.path().join(".sam-runner.json").exists());
}

#[test]
fn test_run_requires_a_choice_between_handlers() {
    let ws = workspace_with(&[("app.js", JS_HANDLERS)]);

    sam_runner(ws.path())
        .args(["run", "app.js", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("app.handler, app.other"));
}

#[test]
fn test_debug_python_is_not_supported() {
    let ws = workspace_with(&[("handler.py", PY_HANDLER)]);

    sam_runner(ws.path())
        .args(["run", "handler.py", "--debug", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Debugging is not supported for python"));
}

#[cfg(unix)]
mod with_fake_sam {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Shell stand-in for the SAM CLI that records its arguments
    fn install_fake_sam(dir: &Path, version: &str) -> PathBuf {
        let path = dir.join("fake-sam");
        let script = format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
case "$1" in
    --version) echo "SAM CLI, version {version}" ;;
    build) echo "Build Succeeded" ;;
    local) echo '{{"statusCode": 200}}' ;;
esac
"#,
            log = dir.join("sam-calls.log").display()
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn workspace_with_sam(version: &str) -> (TempDir, TempDir) {
        let tools = TempDir::new().unwrap();
        let sam = install_fake_sam(tools.path(), version);
        let config = serde_json::json!({
            "sam_cli": { "location": sam },
            "telemetry": { "enabled": false },
            "handlers": {
                "app.handler": { "event": { "name": "test" } }
            }
        });
        let ws = workspace_with(&[
            ("app.js", JS_HANDLERS),
            (".sam-runner.json", &config.to_string()),
        ]);
        (tools, ws)
    }

    #[test]
    fn test_run_invokes_handler() {
        let (tools, ws) = workspace_with_sam("1.100.0");

        sam_runner(ws.path())
            .args(["run", "app.js", "--handler", "app.handler"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"statusCode": 200}"#));

        let calls = fs::read_to_string(tools.path().join("sam-calls.log")).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(calls[0], "--version");
        assert!(calls[1].starts_with("build --template"));
        assert!(calls[2].starts_with("local invoke SamRunnerFunction"));

        let event = ws.path().join(".sam-runner/app.handler/event.json");
        let event: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(event).unwrap()).unwrap();
        assert_eq!(event["name"], "test");
    }

    #[test]
    fn test_dry_run_prints_plan_without_building() {
        let (tools, ws) = workspace_with_sam("1.100.0");

        sam_runner(ws.path())
            .args(["run", "app.js:5", "--debug", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Dry run: app.other"))
            .stdout(predicate::str::contains("local invoke SamRunnerFunction"))
            .stdout(predicate::str::contains("--debug-port 5858"));

        let calls = fs::read_to_string(tools.path().join("sam-calls.log")).unwrap();
        assert_eq!(calls.trim(), "--version");
    }

    #[test]
    fn test_detect_reports_version() {
        let (_tools, ws) = workspace_with_sam("1.100.0");

        sam_runner(ws.path())
            .args(["detect", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Version: 1.100.0"))
            .stdout(predicate::str::contains("supported"));
    }

    #[test]
    fn test_validate_rejects_old_version() {
        let (_tools, ws) = workspace_with_sam("0.5.0");

        sam_runner(ws.path())
            .arg("validate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("too old"));
    }

    #[test]
    fn test_validate_accepts_supported_version() {
        let (_tools, ws) = workspace_with_sam("1.100.0");

        sam_runner(ws.path())
            .arg("validate")
            .assert()
            .success()
            .stdout(predicate::str::contains(">=0.7.0, <2.0.0"));
    }
}
