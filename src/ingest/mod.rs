//! Filesystem → AST → declaration record ingestion.
//!
//! Every call walks and parses from scratch. Nothing is cached between
//! invocations, so results always reflect the bytes currently on disk.

pub mod detect;
pub mod go;

use crate::error::{GoSpliceError, Result};
use crate::symbol::{matches, Declaration, KindFilter};
use detect::{is_go_source, is_pruned_dir};
use go::GoFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walk `root` and return every matching declaration.
///
/// Traversal is depth-first with entries sorted by file name, so the output
/// order (directory order, then in-file order) is stable across runs. Files
/// that cannot be read or parsed are skipped.
///
/// A record is kept when `kind` (if any) admits it and the name matcher
/// accepts either its qualified or its bare name.
pub fn index(query: &str, root: &Path, kind: Option<KindFilter>) -> Result<Vec<Declaration>> {
    let root = absolute(root)?;
    let mut found = Vec::new();

    for path in go_source_files(&root) {
        let file = match GoFile::read(&path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        found.extend(
            file.declarations()
                .into_iter()
                .filter(|decl| admitted(decl, query, kind)),
        );
    }

    log::debug!(
        "Indexed {} declaration(s) matching '{}' under {}",
        found.len(),
        query,
        root.display()
    );
    Ok(found)
}

/// Matching declarations of a single file.
///
/// Unlike [`index`], a parse failure here is returned to the caller.
pub fn index_file(query: &str, path: &Path, kind: Option<KindFilter>) -> Result<Vec<Declaration>> {
    let file = GoFile::read(&absolute(path)?)?;
    Ok(file
        .declarations()
        .into_iter()
        .filter(|decl| admitted(decl, query, kind))
        .collect())
}

/// Every `.go` file under `root` in traversal order.
///
/// Hidden, `vendor` and `testdata` directories below the root are pruned.
/// The root itself is always walked, even when it is hidden. A root that is
/// a file yields just that file.
pub fn go_source_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let pruned =
                entry.depth() > 0 && entry.file_type().is_dir() && is_pruned_dir(entry.file_name());
            if pruned {
                log::debug!("Pruning {}", entry.path().display());
            }
            !pruned
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Walk error: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_go_source(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Make `path` absolute against the current directory without touching the filesystem.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| GoSpliceError::io(path, e))?;
    Ok(normalize(&cwd.join(path)))
}

fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn admitted(decl: &Declaration, query: &str, kind: Option<KindFilter>) -> bool {
    if let Some(filter) = kind {
        if !filter.admits(decl.kind) {
            return false;
        }
    }
    matches(&decl.name, query) || matches(decl.bare_name(), query)
}
