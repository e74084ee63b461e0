extern crate assert_cmd;
extern crate tempfile;

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn progress_cat() -> Command {
    Command::cargo_bin("progress-cat").unwrap()
}

#[test]
fn copies_content_and_reports_progress() {
    let content: Vec<u8> = (0..250u32).map(|i| (i % 251) as u8).collect();
    let (_dir, path) = fixture("data.bin", &content);

    let output = progress_cat().arg(&path).output().unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, content);

    let stderr = String::from_utf8(output.stderr).unwrap();
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines[0], "data.bin: 040.00(100 / 250)");
    assert_eq!(lines[1], "data.bin: 080.00(200 / 250)");
    assert_eq!(*lines.last().unwrap(), "data.bin: 100.00(250 / 250)");
}

#[test]
fn async_progress_with_custom_name() {
    let (_dir, path) = fixture("README.md", b"Hello, World");

    let output = progress_cat()
        .args(&["--async", "--name", "readme", "--chunk-size", "5"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, b"Hello, World");

    let stderr = String::from_utf8(output.stderr).unwrap();
    let reads: Vec<&str> = stderr.lines().collect();
    assert_eq!(reads[0], "readme: 041.67( 5 / 12)");
    assert_eq!(reads[1], "readme: 083.33(10 / 12)");
    assert!(reads.iter().all(|line| line.starts_with("readme: ")));
}

#[test]
fn prints_sha1_digest() {
    let (_dir, path) = fixture("hello.txt", b"Hello, World");

    let output = progress_cat()
        .arg("--sha1")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "907d14fb3af2b0d4f18c2d46abe8aedce17367bd\n"
    );
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();
    progress_cat()
        .arg(dir.path().join("missing"))
        .assert()
        .failure();
}

#[test]
fn zero_chunk_size_fails() {
    let (_dir, path) = fixture("hello.txt", b"Hello, World");
    progress_cat()
        .args(&["--chunk-size", "0"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn progress_bar_keeps_content_intact() {
    let content: Vec<u8> = (0..180u8).collect();
    let (_dir, path) = fixture("bar.bin", &content);

    let output = progress_cat()
        .args(&["--bar", "--async"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, content);
    assert!(!String::from_utf8_lossy(&output.stderr).contains("bar.bin: "));
}
