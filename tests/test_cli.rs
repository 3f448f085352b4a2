
use fixtures::*;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::process::Command;
use tempfile::tempdir;

#[test]
fn it_respects_directory_output() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let sample = catalog_sample();

    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.args(["-f", &f.to_string_lossy(), sample.to_str().unwrap()]);

    assert!(
        cmd.output().unwrap().stdout.is_empty(),
        "Expected output to be printed to file, but was printed to stdout"
    );

    let mut expected = vec![];

    File::open(&f).unwrap().read_to_end(&mut expected).unwrap();
    assert!(
        !expected.is_empty(),
        "Expected output to be printed to file"
    )
}

#[test]
fn it_creates_missing_parent_directories() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("nested").join("deeper").join("note.json");

    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.args(["-f", &f.to_string_lossy(), note_sample().to_str().unwrap()]);
    cmd.assert().success();

    assert_eq!(
        fs::read_to_string(&f).unwrap(),
        format!("{}\n", NOTE_COMPACT)
    );
}

#[test]
fn test_it_refuses_to_overwrite_directory() {
    let d = tempdir().unwrap();

    let sample = catalog_sample();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.args(["-f", &d.path().to_string_lossy(), sample.to_str().unwrap()]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("refusing to overwrite"));
}

#[test]
fn test_it_overwrites_file_anyways_if_passed_flag() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let mut file = File::create(&f).unwrap();
    file.write_all(b"I'm a file!").unwrap();

    let sample = catalog_sample();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.args([
        "-f",
        &f.to_string_lossy(),
        "--no-confirm-overwrite",
        "--indent",
        "2",
        sample.to_str().unwrap(),
    ]);

    cmd.assert().success();

    assert_eq!(
        fs::read_to_string(&f).unwrap(),
        format!("{}\n", CATALOG_INDENTED)
    );
}

#[test]
fn it_supports_stdin_input_with_dash() {
    let sample = catalog_sample();

    let mut cmd_file = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd_file.args(["-i", "2", sample.to_str().unwrap()]);
    let out_file = cmd_file.output().unwrap();
    assert!(
        out_file.status.success(),
        "expected file-input run to succeed"
    );

    let mut cmd_stdin = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd_stdin.args(["-i", "2", "-"]);
    cmd_stdin.stdin(File::open(&sample).unwrap());
    let out_stdin = cmd_stdin.output().unwrap();
    assert!(
        out_stdin.status.success(),
        "expected stdin-input run to succeed"
    );

    let mut cmd_implicit = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd_implicit.args(["-i", "2"]);
    cmd_implicit.stdin(File::open(&sample).unwrap());
    let out_implicit = cmd_implicit.output().unwrap();

    assert_eq!(
        out_stdin.stdout, out_file.stdout,
        "stdin and file input should produce identical output"
    );
    assert_eq!(out_implicit.stdout, out_file.stdout);
    assert_eq!(
        String::from_utf8(out_file.stdout).unwrap(),
        format!("{}\n", CATALOG_INDENTED)
    );
}

#[test]
fn it_defaults_to_compact_output() {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.arg(note_sample().to_str().unwrap());

    cmd.assert()
        .success()
        .stdout(format!("{}\n", NOTE_COMPACT));
}

#[test]
fn it_accepts_negative_indent() {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.args(["--indent", "-4", note_sample().to_str().unwrap()]);

    cmd.assert()
        .success()
        .stdout(format!("{}\n", NOTE_COMPACT));
}

#[test]
fn it_prints_the_tree_to_stderr() {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.args(["--debug-tree", note_sample().to_str().unwrap()]);

    cmd.assert()
        .success()
        .stdout(format!("{}\n", NOTE_COMPACT))
        .stderr(predicate::str::contains("to\n  Parent = note\n"));
}

#[test]
fn it_fails_on_missing_input() {
    let d = tempdir().unwrap();
    let missing = d.as_ref().join("missing.xml");

    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.arg(missing.to_str().unwrap());

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to open file"));
}

#[test]
fn it_fails_on_invalid_utf8() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("latin1.xml");
    fs::write(&f, b"<a>caf\xe9</a>").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo_bin!("xml2json"));
    cmd.arg(f.to_str().unwrap());

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("UTF-8"));
}
