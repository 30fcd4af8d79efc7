//! Source file and directory classification.
//!
//! Table-driven. No heuristics, never infers from file content.

use std::ffi::OsStr;
use std::path::Path;

/// Directory names that are never descended into below the walk root.
pub const EXCLUDED_DIRS: &[&str] = &["vendor", "testdata"];

/// Returns true when `path` names a Go source file.
///
/// # Examples
///
/// ```
/// # use gosplice::ingest::detect::is_go_source;
/// # use std::path::Path;
/// assert!(is_go_source(Path::new("main.go")));
/// assert!(!is_go_source(Path::new("go.mod")));
/// ```
pub fn is_go_source(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("go"))
}

/// Returns true for `_test.go` files.
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.ends_with("_test.go"))
}

/// Returns true when a directory with this base name must be pruned.
///
/// Hidden directories (leading `.`) and the vendored-dependency and
/// fixture directories are skipped. The walk root is never passed here.
pub fn is_pruned_dir(name: &OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}
