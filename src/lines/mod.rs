//! Raw line-range editing.
//!
//! Lines are the `\n`-separated pieces of a file, numbered from 1. Ranges
//! are inclusive and clamped to the file: a start below 1 becomes 1, an end
//! past the last line (or negative) becomes the last line.

use crate::error::{GoSpliceError, Result};
use crate::patch::{write_atomic, ModifyResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A `file:N[:M]` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRange {
    /// Target file.
    pub file: PathBuf,
    /// First line (1-based, inclusive).
    pub start: i64,
    /// Last line (inclusive); negative means end of file.
    pub end: i64,
}

impl std::str::FromStr for LineRange {
    type Err = GoSpliceError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.rsplitn(3, ':');
        let last = parts.next().unwrap_or_default();
        let middle = parts.next();
        let first = parts.next();

        let invalid = || GoSpliceError::InvalidArgument(
            "invalid format, expected file:N or file:N:M".to_string(),
        );

        let (file, start, end) = match (first, middle) {
            (Some(file), Some(start)) if start.parse::<i64>().is_ok() => {
                let end = last.parse::<i64>().map_err(|_| {
                    GoSpliceError::InvalidArgument(format!("invalid end line: {}", last))
                })?;
                (file.to_string(), start.parse::<i64>().unwrap_or_default(), end)
            }
            (first, Some(file)) => {
                let start = last.parse::<i64>().map_err(|_| {
                    GoSpliceError::InvalidArgument(format!("invalid start line: {}", last))
                })?;
                let file = match first {
                    Some(prefix) => format!("{}:{}", prefix, file),
                    None => file.to_string(),
                };
                (file, start, start)
            }
            (_, None) => return Err(invalid()),
        };

        if file.is_empty() {
            return Err(invalid());
        }
        Ok(LineRange {
            file: PathBuf::from(file),
            start,
            end,
        })
    }
}

/// Lines read from a file.
#[derive(Debug, Clone, Serialize)]
pub struct LinesResult {
    /// File the lines came from.
    pub file: PathBuf,
    /// First line returned.
    pub start: usize,
    /// Last line returned.
    pub end: usize,
    /// The lines, joined with `\n`.
    pub lines: String,
    /// Number of lines returned.
    pub count: usize,
}

/// Read lines `start..=end` of `path`.
pub fn read_lines(path: &Path, start: i64, end: i64) -> Result<LinesResult> {
    let content = read(path)?;
    let lines: Vec<&str> = content.split('\n').collect();
    let (start, end) = clamp(start, end, lines.len())?;
    let selected = &lines[start - 1..end];

    Ok(LinesResult {
        file: path.to_path_buf(),
        start,
        end,
        lines: selected.join("\n"),
        count: selected.len(),
    })
}

/// Replace lines `start..=end` of `path` with `new_content`.
pub fn replace_lines(path: &Path, start: i64, end: i64, new_content: &str) -> Result<ModifyResult> {
    let content = read(path)?;
    let lines: Vec<&str> = content.split('\n').collect();
    let (start, end) = clamp(start, end, lines.len())?;
    let new_lines: Vec<&str> = new_content.split('\n').collect();

    let mut result: Vec<&str> = Vec::with_capacity(lines.len() + new_lines.len());
    result.extend_from_slice(&lines[..start - 1]);
    result.extend_from_slice(&new_lines);
    result.extend_from_slice(&lines[end..]);
    write_atomic(path, result.join("\n").as_bytes(), "lines")?;

    Ok(ModifyResult::new(
        path,
        format!(
            "replaced lines {}-{} with {} lines",
            start,
            end,
            new_lines.len()
        ),
        &[],
    ))
}

/// Delete lines `start..=end` of `path`.
pub fn delete_lines(path: &Path, start: i64, end: i64) -> Result<ModifyResult> {
    let content = read(path)?;
    let lines: Vec<&str> = content.split('\n').collect();
    let (start, end) = clamp(start, end, lines.len())?;

    let mut result: Vec<&str> = Vec::with_capacity(lines.len());
    result.extend_from_slice(&lines[..start - 1]);
    result.extend_from_slice(&lines[end..]);
    write_atomic(path, result.join("\n").as_bytes(), "lines")?;

    Ok(ModifyResult::new(
        path,
        format!("deleted lines {}-{}", start, end),
        &[],
    ))
}

/// Insert `new_content` after line `after` (0 inserts at the top).
pub fn insert_lines(path: &Path, after: i64, new_content: &str) -> Result<ModifyResult> {
    let content = read(path)?;
    let lines: Vec<&str> = content.split('\n').collect();
    let after = after.clamp(0, lines.len() as i64) as usize;
    let new_lines: Vec<&str> = new_content.split('\n').collect();

    let mut result: Vec<&str> = Vec::with_capacity(lines.len() + new_lines.len());
    result.extend_from_slice(&lines[..after]);
    result.extend_from_slice(&new_lines);
    result.extend_from_slice(&lines[after..]);
    write_atomic(path, result.join("\n").as_bytes(), "lines")?;

    Ok(ModifyResult::new(
        path,
        format!("inserted {} lines after line {}", new_lines.len(), after),
        &[],
    ))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| GoSpliceError::io(path, e))
}

fn clamp(start: i64, end: i64, total: usize) -> Result<(usize, usize)> {
    let total = total as i64;
    let start = start.max(1);
    let end = if end < 0 || end > total { total } else { end };
    if start > end {
        return Err(GoSpliceError::InvalidArgument(format!(
            "start ({}) > end ({})",
            start, end
        )));
    }
    Ok((start as usize, end as usize))
}
