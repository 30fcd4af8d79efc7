//! Text and regex search across a source tree.

use crate::error::{GoSpliceError, Result};
use crate::ingest::detect::{is_go_source, is_pruned_dir};
use crate::ingest::absolute;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for [`grep`].
#[derive(Debug, Clone, Default)]
pub struct GrepOptions {
    /// Treat the pattern as a regular expression.
    pub regex: bool,
    /// Case-insensitive matching.
    pub ignore_case: bool,
    /// Lines of leading context to attach to each match.
    pub context: usize,
    /// File-name glob; when set, only matching files are searched instead of `*.go`.
    pub file_pattern: Option<String>,
}

/// One matching line.
#[derive(Debug, Clone, Serialize)]
pub struct GrepMatch {
    /// File relative to the search root.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// 1-based byte column of the first hit.
    pub column: usize,
    /// The matching line, trimmed.
    pub text: String,
    /// Preceding lines plus the matching line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Search outcome.
#[derive(Debug, Clone, Serialize)]
pub struct GrepResult {
    /// The pattern searched for.
    pub query: String,
    /// Matches in traversal order.
    pub matches: Vec<GrepMatch>,
    /// Number of matches.
    pub count: usize,
}

enum Matcher {
    Literal { needle: String, fold: bool },
    Pattern(Regex),
}

impl Matcher {
    fn find(&self, line: &str) -> Option<usize> {
        match self {
            Matcher::Literal { needle, fold: true } => line.to_lowercase().find(needle.as_str()),
            Matcher::Literal { needle, fold: false } => line.find(needle.as_str()),
            Matcher::Pattern(re) => re.find(line).map(|m| m.start()),
        }
    }
}

/// Search every eligible file under `root` for `pattern`.
///
/// Hidden, `vendor`, `testdata` and `node_modules` directories are skipped.
pub fn grep(pattern: &str, root: &Path, options: &GrepOptions) -> Result<GrepResult> {
    let root = absolute(root)?;
    let matcher = if options.regex {
        Matcher::Pattern(
            RegexBuilder::new(pattern)
                .case_insensitive(options.ignore_case)
                .build()?,
        )
    } else {
        Matcher::Literal {
            needle: if options.ignore_case {
                pattern.to_lowercase()
            } else {
                pattern.to_string()
            },
            fold: options.ignore_case,
        }
    };

    let file_pattern = options
        .file_pattern
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .map_err(|e| GoSpliceError::InvalidArgument(format!("invalid file pattern: {}", e)))?;

    let mut matches = Vec::new();
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir()
                    && (is_pruned_dir(e.file_name()) || e.file_name() == "node_modules"))
        });

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let eligible = match &file_pattern {
            Some(glob) => glob.matches(&entry.file_name().to_string_lossy()),
            None => is_go_source(path),
        };
        if !eligible {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(path) else {
            log::debug!("Skipping unreadable file {}", path.display());
            continue;
        };
        let rel = path.strip_prefix(&root).unwrap_or(path).to_path_buf();
        let lines: Vec<&str> = content.lines().collect();

        for (i, line) in lines.iter().enumerate() {
            let Some(col) = matcher.find(line) else {
                continue;
            };
            let context = (options.context > 0 && i >= options.context)
                .then(|| lines[i - options.context..=i].join("\n"));
            matches.push(GrepMatch {
                file: rel.clone(),
                line: i + 1,
                column: col + 1,
                text: line.trim().to_string(),
                context,
            });
        }
    }

    Ok(GrepResult {
        query: pattern.to_string(),
        count: matches.len(),
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(
            dir.path().join("main.go"),
            "package main\n\nfunc main() {\n\tProcessOrder(1)\n}\n",
        )
        .expect("write main.go");
        std::fs::create_dir(dir.path().join("node_modules")).expect("mkdir");
        std::fs::write(
            dir.path().join("node_modules").join("x.go"),
            "ProcessOrder\n",
        )
        .expect("write x.go");
        std::fs::write(dir.path().join("notes.txt"), "ProcessOrder later\n").expect("write notes");
        dir
    }

    #[test]
    fn test_literal_search_skips_excluded_dirs() {
        let dir = workspace();
        let result = grep("ProcessOrder", dir.path(), &GrepOptions::default()).expect("grep");
        assert_eq!(result.count, 1);
        assert_eq!(result.matches[0].file, PathBuf::from("main.go"));
        assert_eq!(result.matches[0].line, 4);
        assert_eq!(result.matches[0].column, 2);
    }

    #[test]
    fn test_case_insensitive_regex() {
        let dir = workspace();
        let options = GrepOptions {
            regex: true,
            ignore_case: true,
            ..GrepOptions::default()
        };
        let result = grep(r"process\w+\(", dir.path(), &options).expect("grep");
        assert_eq!(result.count, 1);
    }

    #[test]
    fn test_file_pattern_selects_other_files() {
        let dir = workspace();
        let options = GrepOptions {
            file_pattern: Some("*.txt".to_string()),
            ..GrepOptions::default()
        };
        let result = grep("ProcessOrder", dir.path(), &options).expect("grep");
        assert_eq!(result.count, 1);
        assert_eq!(result.matches[0].file, PathBuf::from("notes.txt"));
    }

    #[test]
    fn test_invalid_regex() {
        let dir = workspace();
        let options = GrepOptions {
            regex: true,
            ..GrepOptions::default()
        };
        let err = grep("(", dir.path(), &options).expect_err("bad regex");
        assert_eq!(err.kind(), "InvalidPattern");
    }
}
