//! Integration tests that run the CLI binary.

use std::io::Write;
use std::process::{Command, Stdio};

fn bin() -> Command {
    // CARGO_BIN_EXE_<name> uses the binary target name; hyphens require concat! for env!()
    let bin = env!(concat!("CARGO_BIN_EXE_tutor", "-", "markdown"));
    let mut cmd = Command::new(bin);
    for var in ["TUTOR_MD_BULLET", "TUTOR_MD_RESPACE", "TUTOR_MD_WIDTH", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Run with `stdin` piped in, from a temp dir so no `.env` is picked up.
fn run_with_stdin(args: &[&str], stdin: &str) -> std::process::Output {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let mut child = bin()
        .args(args)
        .current_dir(tmp.path())
        .env("TUTOR_MD_CONFIG", tmp.path().join("config.json"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary not found - run cargo build first");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for binary")
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let output = bin()
        .arg("--help")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("normalize"), "expected usage text in output");
    assert!(stdout.contains("export"));
}

#[test]
fn cli_version_succeeds() {
    let output = bin()
        .arg("--version")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tutor-markdown"));
}

#[test]
fn cli_normalize_spaces_lists() {
    let output = run_with_stdin(&["normalize"], "a\n- x\n- y\nb");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a\n\n- x\n- y\n\nb");
}

#[test]
fn cli_normalize_user_text_unchanged() {
    let output = run_with_stdin(&["normalize", "--user", "-"], "a\n- x\nb");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a\n- x\nb");
}

#[test]
fn cli_export_table_to_array() {
    let output = run_with_stdin(
        &["export"],
        "<table><tr><th>x</th><th>y</th></tr><tr><td>1</td><td>2</td></tr></table>",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("$$\\begin{array}{|c|c|}"), "got: {}", stdout);
    assert!(stdout.trim_end().ends_with("\\end{array}$$"));
}

#[test]
fn cli_render_warns_on_unbalanced_math() {
    let output = run_with_stdin(&["render"], "Proof:\n\\begin{align*}\nx = 1");
    assert!(output.status.success(), "render must not fail on bad input");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unable to render content"), "got: {}", stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("x = 1"));
}

#[test]
fn cli_transcript_prints_labels() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let file = tmp.path().join("chat.json");
    std::fs::write(
        &file,
        r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "title": "Quadratics",
            "messages": [
                {"id": "67e55044-10b1-426f-9247-bb680e5fe0c9", "text": "Solve x^2=4", "isBot": false, "source": "user", "type": "text"},
                {"id": "67e55044-10b1-426f-9247-bb680e5fe0ca", "text": "Roots:\n- $x=2$\n- $x=-2$", "isBot": true, "source": "backend", "type": "text"}
            ]
        }"#,
    )
    .expect("write conversation");

    let output = bin()
        .arg("transcript")
        .arg(&file)
        .env("TUTOR_MD_CONFIG", tmp.path().join("config.json"))
        .output()
        .expect("binary not found - run cargo build first");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# Quadratics"));
    assert!(stdout.contains("User"));
    assert!(stdout.contains("[Source: backend]"));
    assert!(stdout.contains("Roots:\n\n- $x=2$"));
}

#[test]
fn cli_missing_input_file_exits_with_error() {
    let output = bin()
        .arg("normalize")
        .arg("definitely-missing-file.md")
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("definitely-missing-file.md"), "got: {}", stderr);
}

#[test]
fn cli_invalid_bullet_env_reported() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin()
        .arg("config")
        .current_dir(tmp.path())
        .env("TUTOR_MD_CONFIG", tmp.path().join("config.json"))
        .env("TUTOR_MD_BULLET", "#")
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TUTOR_MD_BULLET"), "got: {}", stderr);
}
