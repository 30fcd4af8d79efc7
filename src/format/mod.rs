//! Best-effort source formatting through external Go tools.
//!
//! A [`FormatterChain`] is an ordered list of programs that read Go source on
//! stdin and write the formatted result to stdout. The first one is the strict
//! canonical formatter; the rest are fallbacks. When every program fails the
//! edited bytes are returned untouched: formatting never blocks an edit.

use crate::error::{GoSpliceError, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use which::which;

/// Default chain: `gofmt`, then `goimports`.
pub const DEFAULT_FORMATTERS: &[&str] = &["gofmt", "goimports"];

/// How a buffer came out of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The canonical formatter accepted the buffer.
    Canonical,
    /// A fallback formatter (named) produced the buffer.
    Fallback(String),
    /// Every formatter failed; the buffer is unformatted.
    Unformatted,
    /// The chain is empty; formatting was not attempted.
    Skipped,
}

impl FormatOutcome {
    /// Non-fatal warning to report alongside a successful edit.
    pub fn warning(&self) -> Option<String> {
        match self {
            FormatOutcome::Unformatted => {
                Some("formatting failed; file was written unformatted".to_string())
            }
            _ => None,
        }
    }
}

/// A formatted buffer and how it was produced.
#[derive(Debug, Clone)]
pub struct Formatted {
    /// Resulting bytes.
    pub bytes: Vec<u8>,
    /// Which step of the chain produced them.
    pub outcome: FormatOutcome,
}

/// Ordered list of external formatter programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterChain {
    programs: Vec<String>,
}

impl Default for FormatterChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl FormatterChain {
    /// `gofmt` followed by `goimports`.
    pub fn standard() -> Self {
        Self::new(DEFAULT_FORMATTERS.iter().map(|p| p.to_string()).collect())
    }

    /// A chain that never runs anything.
    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    /// Chain over the given programs, canonical first.
    pub fn new(programs: Vec<String>) -> Self {
        Self { programs }
    }

    /// Parse a comma-separated program list such as `gofmt,goimports`.
    pub fn from_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Programs in chain order.
    pub fn programs(&self) -> &[String] {
        &self.programs
    }

    /// Format a buffer with no file context.
    pub fn format(&self, source: &[u8]) -> Formatted {
        self.format_in(source, None)
    }

    /// Format a buffer destined for `path`.
    ///
    /// The file's directory is passed to `goimports` so it resolves imports
    /// against the right module.
    pub fn format_for(&self, path: &Path, source: &[u8]) -> Formatted {
        self.format_in(source, path.parent())
    }

    /// Format a file in place. Returns whether the bytes on disk changed.
    pub fn format_file(&self, path: &Path) -> Result<(bool, FormatOutcome)> {
        let original = std::fs::read(path).map_err(|e| GoSpliceError::io(path, e))?;
        let formatted = self.format_for(path, &original);
        let changed = formatted.bytes != original;
        if changed {
            crate::patch::write_atomic(path, &formatted.bytes, "fmt")?;
        }
        Ok((changed, formatted.outcome))
    }

    fn format_in(&self, source: &[u8], dir: Option<&Path>) -> Formatted {
        if self.programs.is_empty() {
            return Formatted {
                bytes: source.to_vec(),
                outcome: FormatOutcome::Skipped,
            };
        }

        for (position, program) in self.programs.iter().enumerate() {
            if let Some(bytes) = run_formatter(program, source, dir) {
                let outcome = if position == 0 {
                    FormatOutcome::Canonical
                } else {
                    log::warn!(
                        "{} rejected the buffer; formatted with fallback {}",
                        self.programs[0],
                        program
                    );
                    FormatOutcome::Fallback(program.clone())
                };
                return Formatted { bytes, outcome };
            }
        }

        log::warn!(
            "All formatters failed ({}); keeping unformatted buffer",
            self.programs.join(", ")
        );
        Formatted {
            bytes: source.to_vec(),
            outcome: FormatOutcome::Unformatted,
        }
    }
}

/// Pipe `source` through one formatter. `None` on any failure.
fn run_formatter(program: &str, source: &[u8], dir: Option<&Path>) -> Option<Vec<u8>> {
    let binary = match which(program) {
        Ok(path) => path,
        Err(_) => {
            log::debug!("Formatter {} not found on PATH", program);
            return None;
        }
    };

    let mut command = Command::new(&binary);
    if let Some(dir) = dir {
        if is_goimports(program) && !dir.as_os_str().is_empty() {
            command.arg("-srcdir").arg(dir);
        }
    }

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| log::debug!("Failed to start {}: {}", program, e))
        .ok()?;

    // Feed stdin from a separate thread so a large output cannot deadlock the pipe.
    let Some(mut stdin) = child.stdin.take() else {
        log::debug!("{} has no stdin pipe", program);
        let _ = child.kill();
        let _ = child.wait();
        return None;
    };
    let input = source.to_vec();
    let writer = std::thread::spawn(move || stdin.write_all(&input));

    let output = child
        .wait_with_output()
        .map_err(|e| log::debug!("Failed to wait for {}: {}", program, e))
        .ok()?;
    let wrote = writer.join().map(|r| r.is_ok()).unwrap_or(false);

    if !wrote || !output.status.success() {
        log::debug!(
            "{} failed: {}",
            program,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }
    if output.stdout.is_empty() && !source.is_empty() {
        return None;
    }
    Some(output.stdout)
}

fn is_goimports(program: &str) -> bool {
    Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s == "goimports")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_chain_returns_input() {
        let formatted = FormatterChain::disabled().format(b"package x\nfunc  f(){}\n");
        assert_eq!(formatted.bytes, b"package x\nfunc  f(){}\n");
        assert_eq!(formatted.outcome, FormatOutcome::Skipped);
        assert!(formatted.outcome.warning().is_none());
    }

    #[test]
    fn test_missing_programs_degrade_to_unformatted() {
        let chain = FormatterChain::from_list("gosplice-no-such-formatter-a, gosplice-no-such-formatter-b");
        assert_eq!(chain.programs().len(), 2);

        let formatted = chain.format(b"package x\n");
        assert_eq!(formatted.bytes, b"package x\n");
        assert_eq!(formatted.outcome, FormatOutcome::Unformatted);
        assert!(formatted.outcome.warning().is_some());
    }

    #[test]
    fn test_fallback_formatter_is_reported() {
        let chain = FormatterChain::from_list("gosplice-no-such,cat");
        let formatted = chain.format(b"package x\n\nfunc f() {}\n");
        assert_eq!(formatted.bytes, b"package x\n\nfunc f() {}\n");
        assert_eq!(formatted.outcome, FormatOutcome::Fallback("cat".into()));
        assert!(formatted.outcome.warning().is_none());
    }

    #[test]
    fn test_formatter_with_empty_output_is_rejected() {
        // `true` exits without reading stdin or writing stdout.
        let formatted = FormatterChain::from_list("true").format(b"package x\n");
        assert_eq!(formatted.bytes, b"package x\n");
        assert_eq!(formatted.outcome, FormatOutcome::Unformatted);
    }

    #[test]
    fn test_from_list_skips_blanks() {
        let chain = FormatterChain::from_list("gofmt,, goimports ,");
        assert_eq!(chain.programs(), &["gofmt".to_string(), "goimports".to_string()]);
    }

    #[test]
    fn test_goimports_detection() {
        assert!(is_goimports("goimports"));
        assert!(is_goimports("/home/dev/go/bin/goimports"));
        assert!(!is_goimports("gofmt"));
    }
}
