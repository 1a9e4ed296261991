//! E2E tests for command-line workflows and exit statuses

use std::process::{Command, Output};

const CLI_BINARY: &str = env!("CARGO_BIN_EXE_riemann");

pub fn run_command(args: &[&str]) -> Output {
    Command::new(CLI_BINARY)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|_| panic!("Failed to execute {CLI_BINARY}"))
}

pub fn stdout_value(output: &Output) -> f64 {
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .expect("stdout should hold a single number")
}

#[test]
fn test_constant_function_is_exact() {
    let output = run_command(&["-n", "8", "-F", "one", "5", "10"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "5");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_identity_on_four_threads() {
    let output = run_command(&["-t", "4", "-n", "2e6", "-F", "x", "0", "2"]);

    assert!(output.status.success());
    assert!((stdout_value(&output) - 2.0).abs() < 1e-3);
}

#[test]
fn test_inline_expression() {
    let output = run_command(&["-t", "2", "-n", "1e6", "-F", "x^2", "0", "3"]);

    assert!(output.status.success());
    assert!((stdout_value(&output) - 9.0).abs() < 1e-3);
}

#[test]
fn test_negative_bounds() {
    let output = run_command(&["-n", "1024", "-F", "x", "-2", "0"]);

    assert!(output.status.success());
    assert!((stdout_value(&output) + 2.0).abs() < 1e-2);
}

#[test]
fn test_single_line_of_output() {
    let output = run_command(&["-t", "3", "-n", "1000", "-F", "sin", "0", "1"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);
}

#[test]
fn test_verbose_reports_time() {
    let output = run_command(&["-v", "-n", "1000", "-F", "square", "0", "1"]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr.trim();
    assert!(line.starts_with("Took "), "{line}");
    assert!(line.ends_with(" s"), "{line}");
}

#[test]
fn test_json_output() {
    let output = run_command(&["--json", "-t", "2", "-n", "4096", "-F", "one", "0", "4"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["result"], 4.0);
    assert_eq!(value["threads"], 2);
    assert_eq!(value["steps"], 4096);
    assert!(value["elapsed_s"].as_f64().unwrap() >= 0.0);
}

#[test]
fn test_auto_thread_count() {
    let output = run_command(&["--json", "-t", "0", "-n", "1e5", "-F", "x", "0", "1"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["threads"].as_u64().unwrap() >= 1);
}

#[test]
fn test_empty_interval_is_data_error() {
    let output = run_command(&["-F", "x", "1", "1"]);

    assert_eq!(output.status.code(), Some(65));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Convergence unreachable"));
}

#[test]
fn test_step_finer_than_bounds_is_data_error() {
    let output = run_command(&["-F", "one", "1e12", "1000000000001"]);

    assert_eq!(output.status.code(), Some(65));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Convergence unreachable"));
}

#[test]
fn test_plain_result_has_six_significant_digits() {
    let output = run_command(&["-t", "3", "-n", "1e5", "-F", "x", "0", "1"]);

    assert!(output.status.success());
    let line = String::from_utf8_lossy(&output.stdout);
    let digits = line.trim().chars().filter(char::is_ascii_digit).count();
    assert!(digits <= 7, "{line}");
}

#[test]
fn test_deeply_nested_expression_is_software_error() {
    let nested = format!("{}x{}", "(".repeat(5_000), ")".repeat(5_000));
    let output = run_command(&["-F", &nested, "0", "1"]);

    assert_eq!(output.status.code(), Some(70));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nested too deeply"));
}

#[test]
fn test_inverted_interval_is_data_error() {
    let output = run_command(&["-n", "100", "-F", "x", "3", "-3"]);

    assert_eq!(output.status.code(), Some(65));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unknown_function() {
    let output = run_command(&["-F", "no_such_function", "0", "1"]);

    assert_eq!(output.status.code(), Some(70));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: Dynamic loader"), "{stderr}");
    assert!(stderr.contains("ERR_UNKNOWN_NAME"), "{stderr}");
}

#[test]
fn test_usage_errors() {
    for args in [
        &[] as &[&str],
        &["0", "1"],
        &["-F", "x", "0"],
        &["-F", "x", "0", "1", "2"],
        &["-n", "0", "-F", "x", "0", "1"],
        &["-t", "-2", "-F", "x", "0", "1"],
        &["-F", "x", "zero", "1"],
        &["--bogus", "-F", "x", "0", "1"],
    ] {
        let output = run_command(args);
        assert_eq!(output.status.code(), Some(64), "{args:?}");
        assert!(output.stdout.is_empty(), "{args:?}");
    }
}

#[test]
fn test_help_and_version() {
    let output = run_command(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("--function"));

    let output = run_command(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("riemann "));
}

#[test]
fn test_log_filter_from_environment() {
    let output = Command::new(CLI_BINARY)
        .args(["-n", "1000", "-F", "cube", "0", "1"])
        .env("RUST_LOG", "info")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("resolved target function"));
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);
}
