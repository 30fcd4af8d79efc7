//! Go toolchain validation and bulk formatting.
//!
//! Runs `go build`, `go vet` and `go test` as external processes, and applies
//! the formatter chain over whole files or directories. A missing `go`
//! binary is reported as an error; failing builds or tests are results, not
//! errors.

use crate::error::{GoSpliceError, Result};
use crate::format::{FormatOutcome, FormatterChain};
use crate::ingest::detect::is_go_source;
use crate::ingest::go_source_files;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Outcome of `go build ./...` and `go vet ./...`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// `go build` exited successfully.
    pub build_ok: bool,
    /// `go vet` exited successfully.
    pub vet_ok: bool,
    /// Output lines of a failed build.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub build_errors: Vec<String>,
    /// Output lines of a failed vet.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vet_errors: Vec<String>,
}

/// Outcome of `go test -v`.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// All tests passed.
    pub passed: bool,
    /// Combined stdout and stderr.
    pub output: String,
}

/// Files touched by a formatting run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatReport {
    /// Files whose bytes changed.
    pub files_changed: Vec<PathBuf>,
    /// Files no formatter could handle.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Build and vet every package under `dir`.
pub fn check(dir: &Path) -> Result<CheckResult> {
    let (build_ok, build_output) = run_go(dir, &["build", "./..."])?;
    let (vet_ok, vet_output) = run_go(dir, &["vet", "./..."])?;

    Ok(CheckResult {
        build_ok,
        vet_ok,
        build_errors: if build_ok { Vec::new() } else { split_lines(&build_output) },
        vet_errors: if vet_ok { Vec::new() } else { split_lines(&vet_output) },
    })
}

/// Run `go test -v` for `package` (default `./...`) from `dir`.
pub fn run_tests(dir: &Path, package: Option<&str>) -> Result<TestResult> {
    let (passed, output) = run_go(dir, &["test", "-v", package.unwrap_or("./...")])?;
    Ok(TestResult { passed, output })
}

/// Format `target` in place: a file, a directory (non-recursive), or `./...`
/// for every Go file under `root`.
pub fn format_target(target: &str, root: &Path, formatter: &FormatterChain) -> Result<FormatReport> {
    let files = if target == "./..." {
        go_source_files(root)
    } else {
        let path = PathBuf::from(target);
        if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(&path)
                .map_err(|e| GoSpliceError::io(&path, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_go_source(p))
                .collect();
            files.sort();
            files
        } else if path.is_file() {
            vec![path]
        } else {
            return Err(GoSpliceError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
    };

    let mut report = FormatReport {
        files_changed: Vec::new(),
        errors: Vec::new(),
    };
    for file in files {
        match formatter.format_file(&file) {
            Ok((true, _)) => report.files_changed.push(file),
            Ok((false, FormatOutcome::Unformatted)) => {
                report
                    .errors
                    .push(format!("{}: no formatter accepted the file", file.display()));
            }
            Ok((false, _)) => {}
            Err(e) => report.errors.push(e.to_string()),
        }
    }
    Ok(report)
}

fn run_go(dir: &Path, args: &[&str]) -> Result<(bool, String)> {
    let output = Command::new("go").args(args).current_dir(dir).output();
    match output {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            Ok((output.status.success(), text))
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(GoSpliceError::Other(
                    "go toolchain not found on PATH".to_string(),
                ));
            }
            Err(GoSpliceError::Other(format!("Failed to run go: {}", e)))
        }
    }
}

fn split_lines(output: &str) -> Vec<String> {
    output.trim().lines().map(str::to_string).collect()
}
