//! Kind-directed routing of generic declaration operations.
//!
//! A request names a declaration and optionally a file and a kind filter.
//! The resolver turns that into one [`Declaration`]; its kind then selects
//! the span mutator strategy and the file to edit. Inside that file the
//! mutator looks the requested name up exactly, so a fuzzy resolution can
//! never redirect an edit onto a different declaration.

use crate::error::{GoSpliceError, Result};
use crate::format::FormatterChain;
use crate::ingest::go::GoFile;
use crate::ingest::{absolute, index};
use crate::patch::{
    delete_declaration, move_declaration, read_declaration, read_field, replace_declaration,
    ModifyResult, ReadResult, SpanTarget,
};
use crate::resolve::{pick, resolve, resolve_in_file};
use crate::symbol::{DeclKind, Declaration, KindFilter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a request looks for its declaration.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Project root walked when no file is given.
    pub root: PathBuf,
    /// File the declaration must live in, if fixed.
    pub file: Option<PathBuf>,
    /// Coarse kind restriction.
    pub kind: Option<KindFilter>,
}

impl Scope {
    /// Search the whole tree under `root`.
    pub fn tree(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file: None,
            kind: None,
        }
    }

    /// Restrict the search to one file.
    pub fn in_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Restrict the search to one kind category.
    pub fn with_kind(mut self, kind: Option<KindFilter>) -> Self {
        self.kind = kind;
        self
    }

    /// Resolve `name` within this scope.
    pub fn resolve(&self, name: &str) -> Result<Declaration> {
        match &self.file {
            Some(file) => resolve_in_file(name, file, self.kind),
            None => resolve(name, &self.root, self.kind),
        }
    }
}

/// Mutation strategy for a resolved declaration, or `UnsupportedKind`.
pub fn target_for(decl: &Declaration, operation: &'static str) -> Result<SpanTarget> {
    SpanTarget::for_kind(decl.kind).ok_or_else(|| GoSpliceError::UnsupportedKind {
        operation,
        name: decl.name.clone(),
        kind: decl.kind.to_string(),
    })
}

/// Read the declaration `name` resolves to. Fields are readable too.
pub fn read(name: &str, scope: &Scope) -> Result<ReadResult> {
    let decl = scope.resolve(name)?;
    read_resolved(&decl)
}

/// Read every declaration under `root` whose name, or last dotted segment,
/// equals `name` exactly.
pub fn read_all(name: &str, root: &Path, kind: Option<KindFilter>) -> Result<Vec<ReadResult>> {
    let wanted: Vec<Declaration> = index(name, root, kind)?
        .into_iter()
        .filter(|decl| decl.name == name || decl.bare_name() == name)
        .collect();
    if wanted.is_empty() {
        return Err(GoSpliceError::SymbolNotFound(name.to_string()));
    }
    wanted.iter().map(read_resolved).collect()
}

fn read_resolved(decl: &Declaration) -> Result<ReadResult> {
    match decl.kind {
        DeclKind::Field => read_field(&decl.name, &decl.file),
        kind => {
            let target = SpanTarget::for_kind(kind).ok_or_else(|| GoSpliceError::UnsupportedKind {
                operation: "read",
                name: decl.name.clone(),
                kind: kind.to_string(),
            })?;
            read_declaration(target, &decl.name, &decl.file)
        }
    }
}

/// Replace the declaration `name` resolves to with `new_text`.
pub fn replace(
    name: &str,
    scope: &Scope,
    new_text: &str,
    formatter: &FormatterChain,
) -> Result<ModifyResult> {
    let decl = scope.resolve(name)?;
    let target = target_for(&decl, "replace")?;
    replace_declaration(target, name, &decl.file, new_text, formatter)
}

/// Delete the declaration `name` resolves to.
pub fn delete(name: &str, scope: &Scope, formatter: &FormatterChain) -> Result<ModifyResult> {
    let decl = scope.resolve(name)?;
    let target = target_for(&decl, "delete")?;
    delete_declaration(target, name, &decl.file, formatter)
}

/// Move the declaration `name` to the end of `dst`.
///
/// With `scope.file` unset, the source is looked up among files under
/// `dst`'s directory that declare the same package as `dst`.
pub fn relocate(
    name: &str,
    dst: &Path,
    scope: &Scope,
    formatter: &FormatterChain,
) -> Result<ModifyResult> {
    let dst = absolute(dst)?;
    let dst_package = GoFile::read(&dst)?.package_name().ok_or_else(|| {
        GoSpliceError::Parse {
            file: dst.clone(),
            message: "missing package clause".to_string(),
        }
    })?;

    let decl = match &scope.file {
        Some(src) => resolve_in_file(name, src, scope.kind)?,
        None => resolve_in_package(name, &dst, &dst_package, scope.kind)?,
    };

    if same_file(&decl.file, &dst) {
        return Err(GoSpliceError::InvalidArgument(format!(
            "{} is already in {}",
            decl.name,
            dst.display()
        )));
    }

    let target = target_for(&decl, "move")?;
    move_declaration(target, name, &decl.file, &dst, formatter)
}

fn resolve_in_package(
    name: &str,
    dst: &Path,
    package: &str,
    kind: Option<KindFilter>,
) -> Result<Declaration> {
    let dir = dst.parent().unwrap_or_else(|| Path::new("."));
    let mut packages: HashMap<PathBuf, Option<String>> = HashMap::new();

    let candidates: Vec<Declaration> = index(name, dir, kind)?
        .into_iter()
        .filter(|decl| {
            let declared = packages.entry(decl.file.clone()).or_insert_with(|| {
                GoFile::read(&decl.file)
                    .ok()
                    .and_then(|file| file.package_name())
            });
            declared.as_deref() == Some(package)
        })
        .collect();

    pick(name, candidates).ok_or_else(|| {
        GoSpliceError::SymbolNotFound(format!("{} in package {}", name, package))
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
