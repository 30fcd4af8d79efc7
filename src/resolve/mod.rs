//! Deterministic symbol resolution.
//!
//! A name query is turned into exactly one declaration:
//! 1. the first record (in traversal order) whose name equals the query exactly,
//! 2. otherwise the first record the fuzzy matcher accepted,
//! 3. otherwise `SymbolNotFound`.
//!
//! There is no relevance ranking. Traversal order is the only tie-break, so a
//! query keeps resolving the same way as long as the tree does not change.

use crate::error::{GoSpliceError, Result};
use crate::ingest::{index, index_file};
use crate::symbol::{Declaration, KindFilter};
use std::path::Path;

/// Resolve `name` against every Go file under `root`.
pub fn resolve(name: &str, root: &Path, kind: Option<KindFilter>) -> Result<Declaration> {
    let candidates = index(name, root, kind)?;
    pick(name, candidates).ok_or_else(|| GoSpliceError::SymbolNotFound(name.to_string()))
}

/// Resolve `name` inside a single file.
///
/// The file must parse; its syntax errors are reported rather than skipped.
pub fn resolve_in_file(name: &str, file: &Path, kind: Option<KindFilter>) -> Result<Declaration> {
    let candidates = index_file(name, file, kind)?;
    pick(name, candidates).ok_or_else(|| {
        GoSpliceError::SymbolNotFound(format!("{} in {}", name, file.display()))
    })
}

/// Apply the exact-then-first policy to an ordered candidate list.
pub fn pick(name: &str, candidates: Vec<Declaration>) -> Option<Declaration> {
    let exact = candidates.iter().position(|decl| decl.name == name);
    match exact {
        Some(i) => candidates.into_iter().nth(i),
        None => candidates.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::DeclKind;
    use std::path::PathBuf;

    fn function(name: &str, line: usize) -> Declaration {
        Declaration {
            name: name.to_string(),
            kind: DeclKind::Function,
            file: PathBuf::from("a.go"),
            line,
            column: 6,
            end_line: line + 2,
            exported: true,
            signature: None,
            receiver: None,
            declared_type: None,
            value: None,
            parent: None,
        }
    }

    #[test]
    fn test_exact_match_beats_earlier_fuzzy_match() {
        let picked = pick(
            "Delete",
            vec![function("UserDelete", 3), function("Delete", 9)],
        )
        .expect("should resolve");
        assert_eq!(picked.name, "Delete");
        assert_eq!(picked.line, 9);
    }

    #[test]
    fn test_first_fuzzy_match_wins_without_exact() {
        let picked = pick(
            "delete",
            vec![function("UserDelete", 3), function("BatchDelete", 9)],
        )
        .expect("should resolve");
        assert_eq!(picked.name, "UserDelete");
    }

    #[test]
    fn test_no_candidates() {
        assert!(pick("Delete", Vec::new()).is_none());
    }
}
