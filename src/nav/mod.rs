//! Semantic navigation.
//!
//! Definitions and position context come from the local parse tree.
//! References, implementations and renames are delegated to `gopls`,
//! addressed by `file:line:column` of the resolved declaration. When `gopls`
//! is missing or fails, queries return an empty successful result.

use crate::error::{GoSpliceError, Result};
use crate::ingest::go::{GoFile, Located};
use crate::resolve::resolve;
use crate::symbol::DeclKind;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A source position reported by a navigation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// File path as reported.
    pub file: PathBuf,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, 0 when unknown.
    pub column: usize,
    /// Function or method enclosing the position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,
}

/// Where a symbol is declared.
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionResult {
    /// The queried symbol.
    pub symbol: String,
    /// Declaration position.
    pub location: Location,
}

/// Positions that refer to a symbol.
#[derive(Debug, Clone, Serialize)]
pub struct ReferencesResult {
    /// The queried symbol.
    pub symbol: String,
    /// Reported positions.
    pub references: Vec<Location>,
    /// Number of positions.
    pub count: usize,
}

impl ReferencesResult {
    fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            references: Vec::new(),
            count: 0,
        }
    }
}

/// Files rewritten by a rename.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResult {
    /// Previous name.
    pub old_name: String,
    /// New name.
    pub new_name: String,
    /// Files gopls reported as changed.
    pub files_changed: Vec<PathBuf>,
}

/// Syntactic scope at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Outside any declaration.
    Package,
    /// Inside an import block.
    Import,
    /// Inside a `const` declaration.
    Const,
    /// Inside a `var` declaration.
    Var,
    /// Inside a `type` declaration.
    Type,
    /// Inside a function without a body.
    Func,
    /// On a function's signature lines.
    FuncSignature,
    /// Inside a function body.
    FuncBody,
}

/// What surrounds a `file:line[:col]` position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResult {
    /// File queried.
    pub file: PathBuf,
    /// 1-based line queried.
    pub line: usize,
    /// 1-based column queried.
    pub column: usize,
    /// Innermost top-level scope.
    pub scope: Scope,
    /// Enclosing function or method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,
    /// Enclosing type declaration.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Package name.
    pub package: String,
    /// Position is inside a function body.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub in_body: bool,
    /// Text of the queried line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_text: Option<String>,
}

/// A `file:line[:col]` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Target file.
    pub file: PathBuf,
    /// 1-based line.
    pub line: usize,
    /// 1-based column; 1 when omitted.
    pub column: usize,
}

impl std::str::FromStr for Position {
    type Err = GoSpliceError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let invalid = || {
            GoSpliceError::InvalidArgument(format!(
                "invalid position '{}', expected file:line or file:line:col",
                s
            ))
        };
        if parts.len() < 2 || parts[0].is_empty() {
            return Err(invalid());
        }
        let line = parts[1].parse::<usize>().map_err(|_| invalid())?;
        let column = match parts.get(2) {
            Some(col) => col.parse::<usize>().map_err(|_| invalid())?,
            None => 1,
        };
        Ok(Position {
            file: PathBuf::from(parts[0]),
            line,
            column,
        })
    }
}

/// Where `symbol` is declared under `root`.
pub fn definition(symbol: &str, root: &Path) -> Result<DefinitionResult> {
    let decl = resolve(symbol, root, None)?;
    Ok(DefinitionResult {
        symbol: symbol.to_string(),
        location: Location {
            file: decl.file,
            line: decl.line,
            column: decl.column,
            func: None,
        },
    })
}

/// Describe the scope at `line`/`column` of `path`.
pub fn context(path: &Path, line: usize, column: usize) -> Result<ContextResult> {
    let file = GoFile::read(path)?;
    let mut result = ContextResult {
        file: path.to_path_buf(),
        line,
        column,
        scope: Scope::Package,
        func: None,
        type_name: None,
        package: file.package_name().unwrap_or_default(),
        in_body: false,
        line_text: file
            .text(0..file.source.len())
            .split('\n')
            .nth(line.wrapping_sub(1))
            .map(str::to_string),
    };

    let located = file.located();
    let root = file.root();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        let start = node.start_position().row + 1;
        let end = node.end_position().row + 1;
        if line < start || line > end {
            continue;
        }
        let same_span = |l: &&Located| l.span.start == node.start_byte();

        match node.kind() {
            "function_declaration" | "method_declaration" => {
                result.func = located.iter().find(same_span).map(|l| l.decl.name.clone());
                result.scope = match node.child_by_field_name("body") {
                    Some(body)
                        if line >= body.start_position().row + 1
                            && line <= body.end_position().row + 1 =>
                    {
                        result.in_body = true;
                        Scope::FuncBody
                    }
                    Some(_) => Scope::FuncSignature,
                    None => Scope::Func,
                };
            }
            "type_declaration" => {
                let specs: Vec<_> = located
                    .iter()
                    .filter(same_span)
                    .filter(|l| l.decl.kind != DeclKind::Field)
                    .collect();
                result.type_name = specs
                    .iter()
                    .find(|l| line >= l.decl.line && line <= l.decl.end_line)
                    .or(specs.first())
                    .map(|l| l.decl.name.clone());
                result.scope = Scope::Type;
            }
            "var_declaration" => result.scope = Scope::Var,
            "const_declaration" => result.scope = Scope::Const,
            "import_declaration" => result.scope = Scope::Import,
            _ => {}
        }
    }

    Ok(result)
}

/// Qualified name of the function or method spanning `line` of `path`.
pub fn enclosing_function(path: &Path, line: usize) -> Option<String> {
    let file = GoFile::read(path).ok()?;
    file.located()
        .into_iter()
        .find(|l| {
            matches!(l.decl.kind, DeclKind::Function | DeclKind::Method)
                && line >= l.span.start_line
                && line <= l.span.end_line
        })
        .map(|l| l.decl.name)
}

/// `gopls` command-line client.
#[derive(Debug, Clone)]
pub struct Gopls {
    binary: Option<PathBuf>,
    root: PathBuf,
}

impl Gopls {
    /// Client for the project at `root`; `binary` is `None` when gopls is unavailable.
    pub fn new(binary: Option<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            binary,
            root: root.into(),
        }
    }

    /// Every reference to `symbol`.
    pub fn references(&self, symbol: &str) -> Result<ReferencesResult> {
        self.locations("references", symbol)
    }

    /// Every implementation of the interface or method `symbol`.
    pub fn implementations(&self, symbol: &str) -> Result<ReferencesResult> {
        self.locations("implementation", symbol)
    }

    /// Call sites of the function `symbol`.
    pub fn callers(&self, symbol: &str) -> Result<ReferencesResult> {
        self.references(symbol)
    }

    /// Rename `old_name` to `new_name` across the project, writing files in place.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<RenameResult> {
        let decl = resolve(old_name, &self.root, None)?;
        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| GoSpliceError::Other("gopls not found".to_string()))?;

        let position = format!("{}:{}:{}", decl.file.display(), decl.line, decl.column.max(1));
        let output = Command::new(binary)
            .args(["rename", "-l", "-w", &position, new_name])
            .current_dir(&self.root)
            .output()
            .map_err(|e| GoSpliceError::Other(format!("Failed to run gopls: {}", e)))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let mut files_changed = Vec::new();
        for line in text.lines() {
            if let Some(message) = line.strip_prefix("gopls: ") {
                return Err(GoSpliceError::Other(message.to_string()));
            }
            if line.trim_end().ends_with(".go") {
                files_changed.push(PathBuf::from(line.trim()));
            }
        }

        log::info!("Renamed {} to {} in {} file(s)", old_name, new_name, files_changed.len());
        Ok(RenameResult {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            files_changed,
        })
    }

    fn locations(&self, subcommand: &str, symbol: &str) -> Result<ReferencesResult> {
        let decl = match resolve(symbol, &self.root, None) {
            Ok(decl) => decl,
            Err(GoSpliceError::SymbolNotFound(_)) => return Ok(ReferencesResult::empty(symbol)),
            Err(e) => return Err(e),
        };
        let Some(binary) = &self.binary else {
            log::warn!("gopls not available; {} for {} is empty", subcommand, symbol);
            return Ok(ReferencesResult::empty(symbol));
        };

        let position = format!("{}:{}:{}", decl.file.display(), decl.line, decl.column.max(1));
        let output = match Command::new(binary)
            .args([subcommand, &position])
            .current_dir(&self.root)
            .output()
        {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                log::warn!(
                    "gopls {} failed: {}",
                    subcommand,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                return Ok(ReferencesResult::empty(symbol));
            }
            Err(e) => {
                log::warn!("Failed to run gopls {}: {}", subcommand, e);
                return Ok(ReferencesResult::empty(symbol));
            }
        };

        let mut references = parse_locations(&String::from_utf8_lossy(&output.stdout));
        for reference in &mut references {
            reference.func = enclosing_function(&reference.file, reference.line);
        }

        Ok(ReferencesResult {
            symbol: symbol.to_string(),
            count: references.len(),
            references,
        })
    }
}

/// Parse `file:line:col[-col]` lines as printed by gopls.
pub fn parse_locations(output: &str) -> Vec<Location> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(4, ':');
            let file = parts.next()?;
            let line_no = parts.next()?;
            let column = parts.next().map(leading_number).unwrap_or(0);
            Some(Location {
                file: PathBuf::from(file),
                line: leading_number(line_no),
                column,
                func: None,
            })
        })
        .collect()
}

fn leading_number(text: &str) -> usize {
    text.chars()
        .take_while(char::is_ascii_digit)
        .fold(0, |n, c| n * 10 + c.to_digit(10).unwrap_or(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locations() {
        let output = "/src/a.go:12:5-17\n\n/src/b.go:3:1\n/src/c.go:7\n";
        let locations = parse_locations(output);
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0].file, PathBuf::from("/src/a.go"));
        assert_eq!((locations[0].line, locations[0].column), (12, 5));
        assert_eq!((locations[1].line, locations[1].column), (3, 1));
        assert_eq!((locations[2].line, locations[2].column), (7, 0));
    }

    #[test]
    fn test_position_parsing() {
        let pos: Position = "svc.go:12".parse().expect("parse");
        assert_eq!((pos.line, pos.column), (12, 1));
        let pos: Position = "svc.go:12:7".parse().expect("parse");
        assert_eq!((pos.line, pos.column), (12, 7));
        assert!("svc.go".parse::<Position>().is_err());
        assert!("svc.go:x".parse::<Position>().is_err());
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("42-50"), 42);
        assert_eq!(leading_number("x"), 0);
    }

    #[test]
    fn test_missing_gopls_degrades_to_empty() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(
            dir.path().join("a.go"),
            "package a\n\nfunc Helper() {}\n",
        )
        .expect("write");

        let gopls = Gopls::new(None, dir.path());
        let result = gopls.references("Helper").expect("references");
        assert_eq!(result.count, 0);
        assert!(result.references.is_empty());
    }
}
