use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cli_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("lgo-convert"))
}

fn write_block(dir: &TempDir, name: &str, src: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, src).expect("write block");
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

#[test]
fn convert_prints_every_block() {
    let dir = TempDir::new().unwrap();
    let first = write_block(&dir, "a.go", "x := 1\n");
    let second = write_block(&dir, "b.go", "y := x + 1\n");

    cli_cmd()
        .args(["convert", arg(&first), arg(&second)])
        .assert()
        .success()
        .stdout(predicate::str::contains("// block 0: "))
        .stdout(predicate::str::contains("// block 1: "))
        .stdout(predicate::str::contains("var Def_x int"))
        .stdout(predicate::str::contains("Def_y = pkg0.Ref_x + 1"));
}

#[test]
fn convert_honours_options() {
    let dir = TempDir::new().unwrap();
    let block = write_block(&dir, "a.go", "count := 1\n");

    cli_cmd()
        .args(["convert", "--def-prefix", "D_", "--register-vars", arg(&block)])
        .assert()
        .success()
        .stdout(predicate::str::contains("var D_count int"))
        .stdout(predicate::str::contains("LgoRegisterVar(\"count\", &D_count)"));
}

#[test]
fn convert_reports_errors() {
    let dir = TempDir::new().unwrap();
    let block = write_block(&dir, "bad.go", "x := y\n");

    cli_cmd()
        .args(["convert", arg(&block)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("undefined: y"));
}

#[test]
fn convert_missing_file() {
    cli_cmd()
        .args(["convert", "/nonexistent/block.go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading /nonexistent/block.go"));
}

#[test]
fn inspect_prints_query_and_doc() {
    let dir = TempDir::new().unwrap();
    let prior = write_block(&dir, "a.go", "x := 1\n");
    let block = write_block(&dir, "b.go", "import \"strings\"\nstrings.Repeat(\"a\", x)\n");

    cli_cmd()
        .args(["inspect", arg(&block), "--at", "2:10", "--prior", arg(&prior)])
        .assert()
        .success()
        .stdout(predicate::str::diff("query: strings.Repeat\n"));

    cli_cmd()
        .args(["inspect", arg(&block), "--at", "2:21", "--prior", arg(&prior)])
        .assert()
        .success()
        .stdout(predicate::str::diff("var x int\n"));
}

#[test]
fn inspect_rejects_bad_position() {
    let dir = TempDir::new().unwrap();
    let block = write_block(&dir, "a.go", "x := 1\n");

    cli_cmd()
        .args(["inspect", arg(&block), "--at", "ten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected LINE:COL"));
}
