//! Integration tests for the `gaia` binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn gaia_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gaia"))
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_string_lossy().into_owned()
}

fn temp_out(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("gaia-cli-test").join(name);
    // Clean up from previous runs
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(gaia_bin())
        .args(args)
        .current_dir(fixtures_dir())
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run gaia")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn render_html_follows_front_matter_variant() {
    let output = run(&["render", &fixture("content/calculations/thermal.md"), "--format", "html"]);
    assert!(output.status.success());

    let html = stdout(&output);
    assert!(html.contains("<span class=\"gaia-math-inline\">\\(P = I^2 R\\)</span>"));
    assert!(html.contains("<ol class=\"gaia-list gaia-list-numbered\">"));
    assert!(!html.contains("<iframe"), "compact variant should not embed videos");
    assert!(!html.contains("variant: compact"));
}

#[test]
fn render_variant_flag_overrides_front_matter() {
    let output = run(&[
        "render",
        &fixture("content/calculations/thermal.md"),
        "--format",
        "html",
        "--variant",
        "full",
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\""));
}

#[test]
fn render_page_uses_front_matter_title() {
    let output = run(&["render", &fixture("content/roadmap/index.md"), "--format", "page"]);
    assert!(output.status.success());

    let html = stdout(&output);
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("<title>Roadmap 2026</title>"));
    assert!(html.contains("<meta name=\"description\" content=\"Where the rover stands\">"));
    assert!(html.contains("<html lang=\"fr\">"));
    assert!(html.contains("<!-- Built with gaia from index.md -->"));
}

#[test]
fn render_plain_and_terminal() {
    let plain = run(&["render", &fixture("content/roadmap/index.md"), "--format", "plain"]);
    assert!(plain.status.success());
    let text = stdout(&plain);
    assert!(text.starts_with("Roadmap 2026"));
    assert!(!text.contains('<'));

    let terminal = run(&["render", &fixture("content/roadmap/index.md")]);
    assert!(terminal.status.success());
    let text = stdout(&terminal);
    assert!(text.contains("Milestones"));
    assert!(text.contains("Chassis welded"));
}

#[test]
fn render_sections_json() {
    let output = run(&["render", &fixture("content/roadmap/sections.json"), "--format", "html"]);
    assert!(output.status.success());

    let html = stdout(&output);
    assert!(html.contains("<h2 class=\"gaia-h2\">Launch readiness</h2>"));
    assert!(html.contains("gaia-callout-warning"));
    assert!(html.contains(">Molicel</td>"));
}

#[test]
fn render_missing_file_fails() {
    let output = run(&["render", "does-not-exist.md"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read 'does-not-exist.md'"));
}

#[test]
fn validate_reports_codes_and_fails_on_errors() {
    let output = run(&["validate", &fixture("broken.md")]);
    assert_eq!(output.status.code(), Some(1));

    let text = stdout(&output);
    for code in ["G001", "G003", "G010", "G020", "G030", "G040"] {
        assert!(text.contains(&format!("[{code}]")), "missing {code} in:\n{text}");
    }
    assert!(text.contains("broken.md:3: error: [G003]"));
}

#[test]
fn validate_clean_files_print_ok() {
    let output = run(&[
        "validate",
        &fixture("content/calculations/thermal.md"),
        &fixture("content/roadmap/sections.json"),
    ]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert_eq!(text.matches(": OK").count(), 2, "unexpected output:\n{text}");
}

#[test]
fn build_renders_content_tree() {
    let out = temp_out("build-tree");
    let output = run(&["build", "--out", out.to_str().unwrap(), "--quiet"]);
    assert!(output.status.success(), "gaia build should succeed");

    assert!(out.join("roadmap/index.html").exists());
    assert!(out.join("roadmap/sections.html").exists());
    assert!(out.join("calculations/thermal.html").exists());

    let roadmap = fs::read_to_string(out.join("roadmap/index.html")).unwrap();
    assert!(roadmap.contains("<title>Roadmap 2026</title>"));
    assert!(roadmap.contains("<iframe"));
    assert!(roadmap.contains("<!-- Built with gaia from roadmap/index.md -->"));

    let thermal = fs::read_to_string(out.join("calculations/thermal.html")).unwrap();
    assert!(!thermal.contains("<iframe"));
    assert!(thermal.contains("<title>Thermal budget</title>"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn build_twice_reports_unchanged() {
    let out = temp_out("build-unchanged");
    let first = run(&["build", "--out", out.to_str().unwrap()]);
    assert!(first.status.success());
    assert!(stdout(&first).contains("3 created"));

    let second = run(&["build", "--out", out.to_str().unwrap()]);
    assert!(second.status.success());
    let text = stdout(&second);
    assert!(text.contains("3 unchanged"), "unexpected output:\n{text}");
    assert!(!text.contains("created"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn build_dry_run_writes_nothing() {
    let out = temp_out("build-dry-run");
    let output = run(&["build", "--out", out.to_str().unwrap(), "--dry-run"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("[DRY RUN]"));
    assert!(!out.exists());
}

#[test]
fn export_writes_plain_text() {
    let out = temp_out("export").join("roadmap.txt");
    let output = run(&[
        "export",
        &fixture("content/roadmap/index.md"),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Exported"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Roadmap 2026\n\nMilestones"));
    assert!(text.contains("\u{2022} [ ] Motor controller bring-up"));
    assert!(!text.contains("**"));
}

#[test]
fn replay_renders_streamed_reply() {
    let output = run(&["replay", &fixture("chat.sse")]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Next step"));
    assert!(text.contains("Order the motors"));
    assert!(!text.contains("data:"));
}

#[test]
fn replay_raw_prints_markdown() {
    let output = run(&["replay", &fixture("chat.sse"), "--raw", "--quiet"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "## Next step\n\n- [ ] Order the motors\n");
}

#[test]
fn init_then_build() {
    let project = temp_out("init-project");
    let status = Command::new(gaia_bin())
        .args(["init", project.to_str().unwrap(), "--quiet"])
        .status()
        .expect("failed to run gaia init");
    assert!(status.success());
    assert!(project.join("gaia.json").exists());

    let status = Command::new(gaia_bin())
        .args(["build", "--quiet"])
        .current_dir(&project)
        .status()
        .expect("failed to run gaia build");
    assert!(status.success());
    assert!(project.join("public/roadmap/index.html").exists());
    assert!(project.join("public/calculations/example.html").exists());

    let _ = fs::remove_dir_all(&project);
}
