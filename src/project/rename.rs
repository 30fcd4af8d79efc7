//! Project-wide package rename.
//!
//! Rewrites the `package` clause of every file in the package directory,
//! renames the directory when its name equals the package name, then fixes
//! import paths and `pkg.` qualifiers in every file that imported it. Like
//! every multi-file operation here there is no rollback.

use super::{dir_entries, find_package_by_name, read_go_mod};
use crate::error::{GoSpliceError, Result};
use crate::ingest::detect::is_go_source;
use crate::ingest::{absolute, go_source_files};
use crate::patch::write_atomic;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of [`rename_package`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePackageResult {
    /// Previous package name.
    pub old_name: String,
    /// New package name.
    pub new_name: String,
    /// Package directory after the rename, relative to the root.
    pub directory: PathBuf,
    /// Files rewritten, relative to the root.
    pub files_changed: Vec<PathBuf>,
    /// Files whose imports or qualifiers were updated.
    pub imports_fixed: usize,
}

/// Rename the package `old_name` found under `root` to `new_name`.
pub fn rename_package(old_name: &str, new_name: &str, root: &Path) -> Result<RenamePackageResult> {
    let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?;
    if !identifier.is_match(new_name) {
        return Err(GoSpliceError::InvalidArgument(format!(
            "'{}' is not a valid package name",
            new_name
        )));
    }

    let root = absolute(root)?;
    let pkg_dir = find_package_by_name(old_name, &root)
        .ok_or_else(|| GoSpliceError::SymbolNotFound(format!("package {}", old_name)))?;

    let mut result = RenamePackageResult {
        old_name: old_name.to_string(),
        new_name: new_name.to_string(),
        directory: relative(&root, &pkg_dir),
        files_changed: Vec::new(),
        imports_fixed: 0,
    };
    if old_name == new_name {
        return Ok(result);
    }

    let rename_dir = pkg_dir != root && pkg_dir.file_name().is_some_and(|n| n == old_name);
    let new_dir = match (rename_dir, pkg_dir.parent()) {
        (true, Some(parent)) => parent.join(new_name),
        _ => pkg_dir.clone(),
    };
    if new_dir != pkg_dir && new_dir.exists() {
        return Err(GoSpliceError::InvalidArgument(format!(
            "{} already exists",
            new_dir.display()
        )));
    }

    let (module, _) = read_go_mod(&root.join("go.mod"));
    let import_paths = module.map(|module| {
        (
            import_path(&module, &relative(&root, &pkg_dir)),
            import_path(&module, &relative(&root, &new_dir)),
        )
    });

    // Package clauses, including external `_test` packages.
    let clause = Regex::new(&format!(
        r"(?m)^package\s+{}(_test)?\b",
        regex::escape(old_name)
    ))?;
    let mut renamed_files = Vec::new();
    for path in dir_entries(&pkg_dir)? {
        if !path.is_file() || !is_go_source(&path) {
            continue;
        }
        let source = std::fs::read_to_string(&path).map_err(|e| GoSpliceError::io(&path, e))?;
        if !clause.is_match(&source) {
            continue;
        }
        let replacement = format!("package {}${{1}}", new_name);
        let updated = clause.replacen(&source, 1, replacement.as_str());
        write_atomic(&path, updated.as_bytes(), "rename")?;
        if let Some(name) = path.file_name() {
            renamed_files.push(new_dir.join(name));
        }
    }

    if new_dir != pkg_dir {
        std::fs::rename(&pkg_dir, &new_dir).map_err(|e| GoSpliceError::io(&pkg_dir, e))?;
        log::info!("Renamed {} to {}", pkg_dir.display(), new_dir.display());
    }
    result.directory = relative(&root, &new_dir);
    result.files_changed = renamed_files.iter().map(|p| relative(&root, p)).collect();

    if let Some((old_import, new_import)) = import_paths {
        let qualifier = Regex::new(&format!(r"\b{}\.", regex::escape(old_name)))?;
        for path in go_source_files(&root) {
            if path.parent() == Some(new_dir.as_path()) {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|e| GoSpliceError::io(&path, e))?;
            let Some(updated) =
                fix_importer(&source, &old_import, &new_import, &qualifier, new_name)
            else {
                continue;
            };
            write_atomic(&path, updated.as_bytes(), "rename")?;
            result.imports_fixed += 1;
            let rel = relative(&root, &path);
            if !result.files_changed.contains(&rel) {
                result.files_changed.push(rel);
            }
        }
    }

    log::info!(
        "Renamed package {} to {} ({} file(s) changed)",
        old_name,
        new_name,
        result.files_changed.len()
    );
    Ok(result)
}

/// Rewritten source of a file importing `old_import`, or `None` when it does not.
fn fix_importer(
    source: &str,
    old_import: &str,
    new_import: &str,
    qualifier: &Regex,
    new_name: &str,
) -> Option<String> {
    let quoted = format!("\"{}\"", old_import);
    if !source.contains(&quoted) {
        return None;
    }
    let mut updated = source.replace(&quoted, &format!("\"{}\"", new_import));
    updated = qualifier
        .replace_all(&updated, format!("{}.", new_name).as_str())
        .into_owned();
    Some(updated)
}

fn import_path(module: &str, rel: &Path) -> String {
    if rel == Path::new(".") {
        return module.to_string();
    }
    let slashed: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{}/{}", module, slashed.join("/"))
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_path() {
        assert_eq!(import_path("example.com/app", Path::new(".")), "example.com/app");
        assert_eq!(
            import_path("example.com/app", Path::new("internal/store")),
            "example.com/app/internal/store"
        );
    }

    #[test]
    fn test_fix_importer_rewrites_path_and_qualifiers() {
        let qualifier = Regex::new(r"\boldpkg\.").expect("regex");
        let source = "package main\n\nimport \"example.com/t/oldpkg\"\n\nfunc main() { println(oldpkg.Helper(), myoldpkg.X) }\n";
        let updated = fix_importer(
            source,
            "example.com/t/oldpkg",
            "example.com/t/newpkg",
            &qualifier,
            "newpkg",
        )
        .expect("file imports the package");
        assert_eq!(
            updated,
            "package main\n\nimport \"example.com/t/newpkg\"\n\nfunc main() { println(newpkg.Helper(), myoldpkg.X) }\n"
        );

        assert!(fix_importer("package main\n", "example.com/t/oldpkg", "x", &qualifier, "newpkg").is_none());
    }
}
