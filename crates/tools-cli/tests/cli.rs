use mcp_openapi_test_support::SpecServer;
use mcp_openapi_test_support::fixtures::{DANGLING_REF_YAML, SAMPLE_OPENAPI_YAML, SAMPLE_SWAGGER_YAML};
use serde_json::{Value, json};
use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn bin(config_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_openapi-to-mcp"));
    cmd.arg("--config")
        .arg(config_dir.join("config.json"))
        .env_remove("RUST_LOG")
        .env_remove("OPENAPI_TO_MCP_SPEC_HASH")
        .env_remove("FORCE_COLOR")
        .env_remove("CLICOLOR_FORCE");
    cmd
}

fn write_spec(dir: &Path, text: &str) -> String {
    let path = dir.join("spec.yaml");
    std::fs::write(&path, text).unwrap();
    path.display().to_string()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

#[test]
fn test_convert_file() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), SAMPLE_OPENAPI_YAML);

    let output = bin(dir.path())
        .args(["convert", "--spec", &spec])
        .output()
        .unwrap();
    assert!(output.status.success());

    let out = stdout_json(&output);
    assert_eq!(out["errors"], json!([]));
    assert_eq!(out["result"][0]["toolDefinition"]["name"], json!("getUser"));
    assert_eq!(
        out["result"][0]["gatewayMapping"]["http"]["path"],
        json!("/user/:id")
    );
    assert_eq!(out["result"][1]["toolDefinition"]["name"], json!("post_user"));
}

#[test]
fn test_convert_stdin_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("tools.json");

    let mut child = bin(dir.path())
        .args(["convert", "--spec", "-", "--pretty", "--output"])
        .arg(&target)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(SAMPLE_SWAGGER_YAML.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("\n  \"result\""), "{written}");
    let out: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(out["result"].as_array().unwrap().len(), 2);
}

#[test]
fn test_check_exit_codes() {
    let dir = tempfile::tempdir().unwrap();

    let ok = write_spec(dir.path(), SAMPLE_OPENAPI_YAML);
    let output = bin(dir.path())
        .args(["check", "--spec", &ok])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 tool(s)"));

    let broken = write_spec(dir.path(), DANGLING_REF_YAML);
    let output = bin(dir.path())
        .args(["check", "--spec", &broken])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("[invalidRefs]"));
}

#[test]
fn test_report_is_plain_when_piped() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_spec(dir.path(), DANGLING_REF_YAML);

    let output = bin(dir.path())
        .args(["check", "--spec", &broken])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("error [invalidRefs] "), "{stdout}");
    assert!(!stdout.contains('\u{1b}'), "{stdout:?}");
}

#[test]
fn test_duplicates_are_warnings_for_check() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "openapi: 3.0.0\npaths:\n  /a:\n    get: { operationId: dup }\n  /b:\n    get: { operationId: dup }\n",
    );

    let output = bin(dir.path())
        .args(["check", "--spec", &spec])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("[duplicateName]"));
}

#[test]
fn test_hash_policy_fail() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), SAMPLE_OPENAPI_YAML);
    let wrong = format!("sha256:{}", "0".repeat(64));

    let output = bin(dir.path())
        .args(["convert", "--spec", &spec, "--spec-hash", &wrong, "--hash-policy", "fail"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Spec hash mismatch"));

    let output = bin(dir.path())
        .args(["convert", "--spec", &spec, "--spec-hash", &wrong])
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn test_config_file_options() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "pretty": true, "convert": { "autoDiscover": { "exclude": ["POST *"] } } }"#,
    )
    .unwrap();
    let spec = write_spec(dir.path(), SAMPLE_OPENAPI_YAML);

    let output = bin(dir.path())
        .args(["convert", "--spec", &spec, "--infer-annotations"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("{\n"));

    let out = stdout_json(&output);
    let tools = out["result"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(
        tools[0]["toolDefinition"]["annotations"]["readOnlyHint"],
        json!(true)
    );
}

#[test]
fn test_missing_spec_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = bin(dir.path())
        .args(["convert", "--spec"])
        .arg(dir.path().join("nope.yaml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("read spec"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_from_url() {
    let server = SpecServer::start(200, SAMPLE_OPENAPI_YAML).await.unwrap();
    let url = server.url("/openapi.yaml");
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        bin(&config_dir)
            .args(["convert", "--spec", &url])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(stdout_json(&output)["result"].as_array().unwrap().len(), 2);
}
