//! Shared test utilities.
//!
//! Tests that repoint the real standard streams live one per file: each
//! `tests/*.rs` is its own process, and the test harness itself writes to
//! stdout between tests.

#![allow(dead_code, unused_imports)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn scratch() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).expect("Failed to read redirect target")
}

pub fn read_string(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read redirect target")
}

/// Write through the process stdout handle, bypassing the harness's
/// `print!` capture.
pub fn write_stdout(bytes: &[u8]) {
    io::stdout().write_all(bytes).expect("Failed to write stdout");
}

pub fn write_stderr(bytes: &[u8]) {
    io::stderr().write_all(bytes).expect("Failed to write stderr");
}

pub fn read_stdin_line() -> String {
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read stdin");
    line
}
