//! Package and project enumeration.
//!
//! Directory-level listings built on the same parser and pruning rules as
//! the indexer: per-file and per-package symbol tables, the exported API of
//! a package, package directories, and a `go.mod`-aware project overview.
//! [`rename_package`] is the one mutating operation here.

use crate::error::{GoSpliceError, Result};
use crate::ingest::detect::{is_go_source, is_pruned_dir, is_test_file};
use crate::ingest::go::GoFile;
use crate::ingest::absolute;
use crate::symbol::{DeclKind, Declaration};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod rename;

pub use rename::{rename_package, RenamePackageResult};

/// Top-level declarations of a file or package.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolsResult {
    /// File or directory that was listed.
    pub path: PathBuf,
    /// Package name, when one could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Declarations in file order; fields are omitted.
    pub symbols: Vec<Declaration>,
    /// Number of declarations.
    pub count: usize,
}

/// Exported declarations of one package.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult {
    /// Package name.
    pub package: Option<String>,
    /// Package directory.
    pub path: PathBuf,
    /// Exported declarations.
    pub symbols: Vec<Declaration>,
    /// Number of non-test Go files in the package.
    pub num_files: usize,
}

/// One package directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    /// Package name from the first parsable file.
    pub name: Option<String>,
    /// Directory relative to the listing root (`.` for the root).
    pub path: PathBuf,
    /// Number of non-test Go files.
    pub num_files: usize,
}

/// Package directories under a root.
#[derive(Debug, Clone, Serialize)]
pub struct PackagesResult {
    /// Packages in traversal order.
    pub packages: Vec<PackageInfo>,
    /// Number of packages.
    pub count: usize,
}

/// Summary of a Go project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Base name of the project directory.
    pub name: String,
    /// Absolute project directory.
    pub path: PathBuf,
    /// Module path from `go.mod`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Go version from `go.mod`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_version: Option<String>,
    /// Directories holding at least one Go file.
    pub packages: usize,
    /// Non-test Go files.
    pub go_files: usize,
    /// `_test.go` files.
    pub test_files: usize,
    /// Every walked directory, relative to the project root.
    pub dirs: Vec<PathBuf>,
}

/// List the symbols of a file, a package directory, or a package found by name.
///
/// A `target` that does not exist on disk is treated as a package name and
/// looked up under `root`.
pub fn symbols(target: &str, root: &Path) -> Result<SymbolsResult> {
    let trimmed = target.trim_end_matches('/');
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let path = if trimmed.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(trimmed)
    };

    if path.is_dir() {
        return package_symbols(&path);
    }
    if path.is_file() {
        return file_symbols(&path);
    }

    match find_package_by_name(trimmed, root) {
        Some(dir) => package_symbols(&dir),
        None => Err(GoSpliceError::io(
            &path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file, directory or package"),
        )),
    }
}

/// Exported symbols of the package in `dir`.
pub fn api(dir: &Path) -> Result<ApiResult> {
    let listing = package_symbols(dir)?;
    Ok(ApiResult {
        package: listing.package,
        path: dir.to_path_buf(),
        symbols: listing.symbols.into_iter().filter(|d| d.exported).collect(),
        num_files: package_files(dir)?.len(),
    })
}

/// Every directory under `root` holding non-test Go files.
pub fn packages(root: &Path) -> Result<PackagesResult> {
    let root = absolute(root)?;
    let mut packages = Vec::new();

    for dir in walk_dirs(&root) {
        let files = package_files(&dir)?;
        if files.is_empty() {
            continue;
        }
        let rel = dir.strip_prefix(&root).unwrap_or(&dir);
        packages.push(PackageInfo {
            name: files.iter().find_map(|f| package_name_of(f)),
            path: if rel.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                rel.to_path_buf()
            },
            num_files: files.len(),
        });
    }

    Ok(PackagesResult {
        count: packages.len(),
        packages,
    })
}

/// Module metadata and file counts for the project at `dir`.
pub fn overview(dir: &Path) -> Result<ProjectInfo> {
    let root = absolute(dir)?;
    let (module, go_version) = read_go_mod(&root.join("go.mod"));

    let mut info = ProjectInfo {
        name: root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: root.clone(),
        module,
        go_version,
        packages: 0,
        go_files: 0,
        test_files: 0,
        dirs: Vec::new(),
    };

    for dir in walk_dirs(&root) {
        if let Ok(rel) = dir.strip_prefix(&root) {
            if !rel.as_os_str().is_empty() {
                info.dirs.push(rel.to_path_buf());
            }
        }
        let mut has_go = false;
        for path in dir_entries(&dir)? {
            if !path.is_file() || !is_go_source(&path) {
                continue;
            }
            has_go = true;
            if is_test_file(&path) {
                info.test_files += 1;
            } else {
                info.go_files += 1;
            }
        }
        if has_go {
            info.packages += 1;
        }
    }

    Ok(info)
}

fn file_symbols(path: &Path) -> Result<SymbolsResult> {
    let file = GoFile::read(path)?;
    let symbols: Vec<Declaration> = file
        .declarations()
        .into_iter()
        .filter(|d| d.kind != DeclKind::Field)
        .collect();
    Ok(SymbolsResult {
        path: path.to_path_buf(),
        package: file.package_name(),
        count: symbols.len(),
        symbols,
    })
}

fn package_symbols(dir: &Path) -> Result<SymbolsResult> {
    let mut package = None;
    let mut symbols = Vec::new();

    for path in package_files(dir)? {
        let file = match GoFile::read(&path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if package.is_none() {
            package = file.package_name();
        }
        symbols.extend(
            file.declarations()
                .into_iter()
                .filter(|d| d.kind != DeclKind::Field),
        );
    }

    Ok(SymbolsResult {
        path: dir.to_path_buf(),
        package,
        count: symbols.len(),
        symbols,
    })
}

/// First directory under `root` whose first non-test Go file declares `name`.
fn find_package_by_name(name: &str, root: &Path) -> Option<PathBuf> {
    let root = absolute(root).ok()?;
    walk_dirs(&root).into_iter().find(|dir| {
        package_files(dir)
            .ok()
            .and_then(|files| files.first().and_then(|f| package_name_of(f)))
            .is_some_and(|pkg| pkg == name)
    })
}

fn package_name_of(path: &Path) -> Option<String> {
    GoFile::read(path).ok().and_then(|f| f.package_name())
}

/// Non-test `.go` files directly inside `dir`, sorted by name.
fn package_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(dir_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && is_go_source(p) && !is_test_file(p))
        .collect())
}

fn dir_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| GoSpliceError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}

/// Directories under `root` (root included) with the indexer's pruning.
fn walk_dirs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && is_pruned_dir(e.file_name())))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect()
}

fn read_go_mod(path: &Path) -> (Option<String>, Option<String>) {
    let Ok(data) = std::fs::read_to_string(path) else {
        return (None, None);
    };
    let mut module = None;
    let mut version = None;
    for line in data.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("module ") {
            module = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("go ") {
            version = Some(rest.trim().to_string());
        }
    }
    (module, version)
}
