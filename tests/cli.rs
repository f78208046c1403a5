//! Runs the `link-dispatch` binary against config files.

use std::path::Path;
use std::process::{Command, Output};

mod common;

fn link_dispatch(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_link-dispatch"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_route_command() {
    let (_dir, path) = common::write_config(common::SAMPLE_CONFIG);
    let output = link_dispatch(
        &path,
        &["route", "https://www.apple.com", "https://old.reddit.com"],
    );

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Safari\nBrave Browser\n");
}

#[test]
fn test_route_invalid_url_exits_nonzero() {
    let (_dir, path) = common::write_config(common::SAMPLE_CONFIG);
    let output = link_dispatch(&path, &["route", "not a url", "https://apple.com"]);

    assert!(!output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Safari\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid URL \"not a url\""));
}

#[test]
fn test_route_explain() {
    let (_dir, path) = common::write_config(common::SAMPLE_CONFIG);
    let output = link_dispatch(&path, &["route", "--explain", "https://reddit.com"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["target"], "Brave Browser");
    assert_eq!(report["rule"]["index"], 2);
    assert_eq!(report["rule"]["name"], "reddit");
}

#[test]
fn test_check_command() {
    let (_dir, path) = common::write_config(common::SAMPLE_CONFIG);
    let output = link_dispatch(&path, &["check"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "default: Firefox Developer Edition");
    assert_eq!(lines.len(), 4);
    assert!(lines[3].ends_with("-> Brave Browser"));
}

#[test]
fn test_check_rejects_invalid_config() {
    let (_dir, path) = common::write_config("[[rules]]\ntarget = \"Safari\"\n");
    let output = link_dispatch(&path, &["check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Validation failed: default_target must not be empty"));
}
