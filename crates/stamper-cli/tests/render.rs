//! End-to-end tests for the `stamper` binary

use std::fs;
use std::process::Command;

const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>list</title></head><body>
<div stamper="list">
  <template s-temp="list"><li s-index="id" id="row-{{index}}"><span s-sequence="00"></span><button s-delete="list">x</button></li></template>
  <ul s-crate="list"></ul>
  <button s-cast="list">add</button>
</div>
</body></html>"#;

fn run(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_stamper"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn test_render_with_clicks() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, PAGE).unwrap();

    let (ok, stdout, _) = run(&[
        "render",
        page.to_str().unwrap(),
        "--click",
        "[s-cast=list]",
        "--click",
        "[s-cast=list]",
    ]);
    assert!(ok);
    assert!(stdout.contains(r#"stamper="list" s-inited="true""#));
    assert!(stdout.contains(r#"id="row-0""#));
    assert!(stdout.contains(r#"id="row-1""#));
    assert!(stdout.contains(">02<"));
}

#[test]
fn test_render_declined_delete() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, PAGE).unwrap();

    let (ok, stdout, stderr) = run(&[
        "render",
        page.to_str().unwrap(),
        "--click",
        "[s-cast=list]",
        "--click",
        "[s-delete=list]",
        "--decline",
    ]);
    assert!(ok);
    assert!(stdout.contains(r#"id="row-0""#));
    assert!(stderr.contains("confirm:"));
}

#[test]
fn test_render_add_from_data() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    fs::write(
        &page,
        PAGE.replace("<button s-delete", r#"<span s-slot="name"></span><button s-delete"#),
    )
    .unwrap();

    let (ok, stdout, _) = run(&["render", page.to_str().unwrap(), "--add", r#"list={"name": "Alice"}"#]);
    assert!(ok);
    assert!(stdout.contains(r#"<span s-slot="name">Alice</span>"#));
}

#[test]
fn test_render_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let (ok, _, stderr) = run(&["render", dir.path().join("absent.html").to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("failed to read"));
}

#[test]
fn test_render_unknown_scope() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, PAGE).unwrap();

    let (ok, _, stderr) = run(&["render", page.to_str().unwrap(), "--add", r#"other={}"#]);
    assert!(!ok);
    assert!(stderr.contains("no scope named"));
}
