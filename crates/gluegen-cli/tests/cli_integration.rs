//! CLI Integration Tests
//!
//! Run with: cargo test -p gluegen-cli --test cli_integration

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("gluegen-engine")
        .join("tests")
        .join("fixtures")
        .join("doxygen")
}

// =============================================================================
// DOCUMENT
// =============================================================================

#[test]
fn document_to_stdout() {
    let mut cmd = cargo_bin_cmd!("gluegen");
    cmd.arg("document").arg("--ast-dir").arg(fixture_dir());

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("\"type_definitions\"")
                .and(predicate::str::contains("\"type_name_cpp\": \"app::Box<float>\""))
                .and(predicate::str::contains("\"index\": \"21\"")),
        )
        .stderr(predicate::str::contains("warning").and(predicate::str::contains("app::ghost")));
}

#[test]
fn document_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("reflection.json");

    let mut cmd = cargo_bin_cmd!("gluegen");
    cmd.arg("--color")
        .arg("never")
        .arg("document")
        .arg("--ast-dir")
        .arg(fixture_dir())
        .arg("--output")
        .arg(&target);
    cmd.assert().success().stdout(predicate::str::contains("Wrote"));

    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("\"attribute_definitions\""));
    assert!(written.ends_with('\n'));
}

#[test]
fn document_compact_output_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("gluegen.toml");
    std::fs::write(&config, "[output]\npretty = false\nfile_comment = \"// test\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("gluegen");
    cmd.arg("document")
        .arg("--ast-dir")
        .arg(fixture_dir())
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"file_comment\":\"// test\""));
}

// =============================================================================
// CHECK
// =============================================================================

#[test]
fn check_prints_summary() {
    let mut cmd = cargo_bin_cmd!("gluegen");
    cmd.arg("--color")
        .arg("never")
        .arg("check")
        .arg("--ast-dir")
        .arg(fixture_dir());

    cmd.assert().success().stdout(
        predicate::str::contains("3 variables")
            .and(predicate::str::contains("1 class,"))
            .and(predicate::str::contains("2 attributes"))
            .and(predicate::str::contains("1 warning")),
    );
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn malformed_ast_fails_with_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("namespacebad.xml"), "<doxygen><compounddef>").unwrap();

    let mut cmd = cargo_bin_cmd!("gluegen");
    cmd.arg("check").arg("--ast-dir").arg(dir.path());
    cmd.assert()
        .failure()
        .code(1)
        .stderr(
            predicate::str::contains("error")
                .and(predicate::str::contains("namespacebad.xml")),
        );
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("gluegen.toml");
    std::fs::write(
        &config,
        "[naming.unique]\nopen = \"\"\nseparator = \"_\"\nclose = \"__\"\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("gluegen");
    cmd.arg("check")
        .arg("--ast-dir")
        .arg(fixture_dir())
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn missing_ast_dir_argument() {
    let mut cmd = cargo_bin_cmd!("gluegen");
    cmd.arg("document");
    cmd.assert().failure().stderr(predicate::str::contains("--ast-dir"));
}
