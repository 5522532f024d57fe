use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;

use escargot::CargoBuild;
use serde_json::Value;
use tempfile::TempDir;

static TOKENFORGE: LazyLock<escargot::CargoRun> = LazyLock::new(|| {
    CargoBuild::new()
        .bin("tokenforge")
        .run()
        .expect("failed to build tokenforge")
});

static LOG_DIR: LazyLock<TempDir> =
    LazyLock::new(|| TempDir::new().expect("failed to create log dir"));

fn tokenforge() -> Command {
    let mut command = TOKENFORGE.command();
    command.env("TOKENFORGE_LOG_DIR", LOG_DIR.path());
    command
}

fn run(args: &[&str]) -> Output {
    tokenforge().args(args).output().unwrap()
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = tokenforge()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Edit tokens and template interactively"));
    assert!(text.contains("Render a template with a JSON token list"));
    assert!(text.contains("Print the slug of each token name"));
}

#[test]
fn slug_prints_one_line_per_name() {
    let output = run(&["slug", "First Name", "a__b", "_a_", "!!!"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "first_name\na_b\na\ntoken\n");
}

#[test]
fn render_outputs_json_response() {
    let output = run_with_stdin(
        &[
            "render",
            "--template",
            "-",
            "--tokens-json",
            r#"[{"Name":"a","Value":"SHORT"},{"name":"ab","value":"LONG"}]"#,
        ],
        "{{AB}} / {{a}}",
    );
    assert!(output.status.success());
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["output"], "LONG / SHORT");
    let tokens = json["normalizedTokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0]["name"], "a");
    assert_eq!(tokens[1]["value"], "LONG");
    assert_eq!(tokens[1]["id"].as_str().unwrap().len(), 32);
}

#[test]
fn render_with_malformed_tokens_echoes_template() {
    let output = run_with_stdin(
        &["render", "--template", "-", "--tokens-json", "{oops", "--raw"],
        "Hello {{x}}",
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Hello {{x}}");
}

#[test]
fn render_reads_files() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.txt");
    let tokens = dir.path().join("tokens.json");
    std::fs::write(&template, "Dear {{first_name}},\n").unwrap();
    std::fs::write(&tokens, r#"[{"name":"First Name","value":"Ada"}]"#).unwrap();

    let output = run(&[
        "render",
        "--template",
        template.to_str().unwrap(),
        "--tokens",
        tokens.to_str().unwrap(),
        "--raw",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Dear Ada,\n");
}

#[test]
fn render_without_inputs_is_empty() {
    let output = run(&["render", "--raw"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
}

#[test]
fn render_fails_for_missing_template_file() {
    let output = run(&["render", "--template", "/no/such/template.txt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read /no/such/template.txt"));
}

#[test]
fn render_rejects_two_stdin_inputs() {
    let output = run(&["render", "--template", "-", "--tokens", "-"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot both read from standard input"));
}

#[test]
fn render_keeps_last_key_spelling() {
    let output = run_with_stdin(
        &[
            "render",
            "--template",
            "-",
            "--tokens-json",
            r#"[{"name":"a","Name":"b","value":"V"}]"#,
            "--raw",
        ],
        "{{a}}/{{b}}",
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output), "{{a}}/V");
}
