// End-to-end runs of the govariant binary.
// Requires: assert_cmd, predicates, tempfile in [dev-dependencies]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const SHAPES: &str = "package shapes

// @variant Shape
type _ interface {
\tCircle(radius float64)
\tSquare(side float64)
}
";

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    dir
}

fn govariant() -> Command {
    let mut cmd = Command::cargo_bin("govariant").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[test]
fn writes_generated_file_next_to_input() {
    let dir = workspace(&[("shapes.go", SHAPES)]);
    govariant().arg(dir.path().join("shapes.go")).assert().success();

    let output = read(&dir.path().join("shape_variant.go"));
    assert!(output.starts_with("// Code generated by govariant "));
    assert!(output.contains("; DO NOT EDIT.\npackage shapes\n"));
    assert!(output.contains("type ShapeVisitor struct {"));
    assert!(output.contains("_ Shape = struct{ Circle }{}"));
}

#[test]
fn flags_remove_optional_parts() {
    let dir = workspace(&[("shapes.go", SHAPES)]);
    govariant()
        .args(["--nocheck", "--nounpack", "--novisitor"])
        .arg(dir.path().join("shapes.go"))
        .assert()
        .success();

    let output = read(&dir.path().join("shape_variant.go"));
    assert!(output.contains("func (Circle) isShape() {}"));
    assert!(!output.contains("Unpack"));
    assert!(!output.contains("Visit"));
    assert!(!output.contains("var ("));
}

#[test]
fn directory_skips_tests_and_generated_files() {
    let dir = workspace(&[
        ("shapes.go", SHAPES),
        ("shapes_test.go", "package shapes\n\n// @variant Broken\nvar x = 1\n"),
        ("old_variant.go", "package shapes\n\n// @variant Broken\nvar x = 1\n"),
        ("nested/more.go", "package nested\n\n// @variant Token\ntype _ interface {\n\tEOF()\n}\n"),
    ]);
    govariant().arg(dir.path()).assert().success();

    assert!(dir.path().join("shape_variant.go").exists());
    assert!(!dir.path().join("broken_variant.go").exists());
    // Without -r sub-directories are left alone.
    assert!(!dir.path().join("nested/token_variant.go").exists());

    govariant().arg("-r").arg(dir.path()).assert().success();
    assert!(dir.path().join("nested/token_variant.go").exists());
}

#[test]
fn reports_diagnostics_with_go_positions() {
    let dir = workspace(&[(
        "bad.go",
        "package shapes\n\n// @variant Shape\ntype Shape interface {\n\tCircle()\n}\n",
    )]);
    govariant()
        .arg(dir.path().join("bad.go"))
        .assert()
        .failure()
        .stderr(contains("govariant::validate::").and(contains("bad.go:4:6")));

    assert!(!dir.path().join("shape_variant.go").exists());
}

#[test]
fn one_failing_file_does_not_stop_the_others() {
    let dir = workspace(&[
        ("a.go", "package p\n\n// @variant\ntype _ interface {\n\tX()\n}\n"),
        ("b.go", SHAPES),
    ]);
    govariant()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("a.go:3:1"));

    assert!(dir.path().join("shape_variant.go").exists());
}

#[test]
fn dump_model_prints_json_without_writing() {
    let dir = workspace(&[("shapes.go", SHAPES)]);
    govariant()
        .arg("--dump-model")
        .arg(dir.path().join("shapes.go"))
        .assert()
        .success()
        .stdout(
            contains("\"name\": \"Shape\"")
                .and(contains("\"type\": \"float64\""))
                .and(contains("\"radius\"")),
        );

    assert!(!dir.path().join("shape_variant.go").exists());
}

#[test]
fn missing_path_is_an_io_error() {
    govariant()
        .arg("does/not/exist.go")
        .assert()
        .failure()
        .stderr(contains("govariant::io::"));
}
