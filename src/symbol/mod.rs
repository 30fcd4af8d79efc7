//! Declaration records and name matching.
//!
//! A [`Declaration`] is produced fresh by every index walk and never cached.
//! Records carry the identifier position, not the declaration span; spans are
//! recomputed from a fresh parse right before a file is edited.

use serde::Serialize;
use std::path::PathBuf;

/// Kind of a Go declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    /// Top-level function without receiver.
    Function,
    /// Function with a receiver.
    Method,
    /// Type whose underlying shape is `struct { ... }`.
    Struct,
    /// Type whose underlying shape is `interface { ... }`.
    Interface,
    /// Any other named type or `type A = B` alias.
    Alias,
    /// Named field of a struct-shaped type.
    Field,
    /// Package-level `var`.
    Variable,
    /// Package-level `const`.
    Constant,
}

impl DeclKind {
    /// Convert kind to string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::Struct => "struct",
            DeclKind::Interface => "interface",
            DeclKind::Alias => "alias",
            DeclKind::Field => "field",
            DeclKind::Variable => "variable",
            DeclKind::Constant => "constant",
        }
    }

    /// Coarse category this kind belongs to.
    pub fn category(&self) -> KindFilter {
        match self {
            DeclKind::Function | DeclKind::Method => KindFilter::Function,
            DeclKind::Struct | DeclKind::Interface | DeclKind::Alias => KindFilter::Type,
            DeclKind::Field => KindFilter::Field,
            DeclKind::Variable => KindFilter::Variable,
            DeclKind::Constant => KindFilter::Constant,
        }
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse kind category used to narrow an index walk.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    /// Functions and methods.
    #[value(alias = "func")]
    Function,
    /// Struct, interface and alias types.
    Type,
    /// Struct fields.
    Field,
    /// Package-level variables.
    #[value(alias = "var")]
    Variable,
    /// Package-level constants.
    #[value(alias = "const")]
    Constant,
}

impl KindFilter {
    /// Returns true when `kind` falls into this category.
    pub fn admits(&self, kind: DeclKind) -> bool {
        kind.category() == *self
    }
}

/// One declaration found in a Go source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Qualified name (`Recv.Method`, `Type.Field`) or bare identifier.
    pub name: String,
    /// Declaration kind.
    pub kind: DeclKind,
    /// File the declaration lives in.
    pub file: PathBuf,
    /// 1-based line of the declared identifier.
    pub line: usize,
    /// 1-based byte column of the declared identifier.
    pub column: usize,
    /// 1-based line where the declaration ends.
    pub end_line: usize,
    /// Whether the identifier starts with an upper-case letter.
    pub exported: bool,
    /// Rendered signature for functions and methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Receiver type as written, for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Declared type of variables, constants and fields.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    /// Initializer expression of variables and constants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Enclosing type of a field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Declaration {
    /// Identifier without receiver or parent qualification.
    pub fn bare_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((_, bare)) if self.kind == DeclKind::Method || self.kind == DeclKind::Field => {
                bare
            }
            _ => &self.name,
        }
    }
}

/// Compare a candidate identifier against a user query.
///
/// Accepts exact equality, case-insensitive equality, or a case-insensitive
/// substring hit.
pub fn matches(candidate: &str, query: &str) -> bool {
    if candidate == query {
        return true;
    }
    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();
    candidate == query || candidate.contains(&query)
}

/// Go's export rule: the identifier starts with an upper-case letter.
pub fn is_exported(ident: &str) -> bool {
    ident.chars().next().is_some_and(char::is_uppercase)
}
