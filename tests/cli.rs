//! Tests for the CLI file layer
//!
//! The conversion core is pure; everything filesystem-shaped (output
//! extension selection, the `@flow` pragma pre-filter, renames, deletes,
//! batch error handling) is exercised here against temporary directories.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::string_slice, clippy::panic)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use flow2ts::cli::run;

fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_cli(args: &[&str]) -> i32 {
    let mut full = vec!["flow2ts".to_string()];
    full.extend(args.iter().map(|a| a.to_string()));
    run(full).unwrap()
}

#[test]
fn test_write_new_picks_ts_extension() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), "a.js", "const a: ?number = null;\n");

    let code = run_cli(&[source.to_str().unwrap(), "--write", "new"]);
    assert_eq!(code, 0);

    let output = fs::read_to_string(dir.path().join("a.ts")).unwrap();
    assert_eq!(output, "const a: number | null | undefined = null;\n");
    assert!(source.exists(), "the original stays in place");
}

#[test]
fn test_write_new_picks_tsx_extension_for_markup() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), "view.js", "const b = <h1>hi</h1>;\n");

    run_cli(&[source.to_str().unwrap(), "--write", "new"]);

    assert!(dir.path().join("view.tsx").exists());
    assert!(!dir.path().join("view.ts").exists());
}

#[test]
fn test_write_replace_removes_original() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), "b.js", "let x: mixed = 1;\n");

    run_cli(&[source.to_str().unwrap(), "--write", "replace"]);

    assert!(!source.exists());
    let output = fs::read_to_string(dir.path().join("b.ts")).unwrap();
    assert_eq!(output, "let x: unknown = 1;\n");
}

#[test]
fn test_delete_source_after_write() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), "c.js", "const n: number = 1;\n");

    run_cli(&[source.to_str().unwrap(), "--write", "new", "--delete-source"]);

    assert!(!source.exists());
    assert!(dir.path().join("c.ts").exists());
}

#[test]
fn test_keep_untyped_skips_files_without_pragma() {
    let dir = TempDir::new().unwrap();
    let untyped = write_source(dir.path(), "plain.js", "const a = 1;\n");
    let typed = write_source(
        dir.path(),
        "typed.js",
        "// @flow\nconst a: ?number = null;\n",
    );

    let code = run_cli(&[
        untyped.to_str().unwrap(),
        typed.to_str().unwrap(),
        "--write",
        "new",
        "--keep-untyped",
    ]);
    assert_eq!(code, 0);

    assert!(!dir.path().join("plain.ts").exists());
    assert!(dir.path().join("typed.ts").exists());
}

#[test]
fn test_parse_error_fails_file_but_not_batch() {
    let dir = TempDir::new().unwrap();
    let broken = write_source(dir.path(), "broken.js", "const = ;\n");
    let good = write_source(dir.path(), "good.js", "const a: number = 1;\n");

    let code = run_cli(&[
        broken.to_str().unwrap(),
        good.to_str().unwrap(),
        "--write",
        "new",
    ]);

    assert_eq!(code, 1);
    assert!(!dir.path().join("broken.ts").exists());
    assert!(dir.path().join("good.ts").exists(), "the batch continues");
}

#[test]
fn test_formatting_flags_reach_the_formatter() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), "d.js", "const s: string = \"quoted\";\n");

    run_cli(&[
        source.to_str().unwrap(),
        "--write",
        "new",
        "--format",
        "--single-quote",
    ]);

    let output = fs::read_to_string(dir.path().join("d.ts")).unwrap();
    assert_eq!(output, "const s: string = 'quoted';\n");
}

#[test]
fn test_inline_utility_types_flag() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), "e.js", "type K = $Keys<{ a: number }>;\n");

    run_cli(&[
        source.to_str().unwrap(),
        "--write",
        "new",
        "--inline-utility-types",
    ]);

    let output = fs::read_to_string(dir.path().join("e.ts")).unwrap();
    assert_eq!(output, "type K = 'a';\n");
}
