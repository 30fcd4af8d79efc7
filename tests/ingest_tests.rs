//! Integration tests for tree-wide Go indexing.
//!
//! These tests build small Go trees on disk and verify traversal order,
//! directory pruning, kind filtering and the handling of unparsable files.

use gosplice::ingest::{go_source_files, index, index_file};
use gosplice::symbol::{DeclKind, KindFilter};
use std::path::Path;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("fixtures/sample.go");

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }

    fn names(decls: &[gosplice::Declaration]) -> Vec<&str> {
        decls.iter().map(|d| d.name.as_str()).collect()
    }

    /// Hidden, vendor and testdata directories below the root contribute nothing.
    #[test]
    fn test_pruned_directories_are_skipped() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        write(root, "main.go", "package main\n\nfunc Visible() {}\n");
        write(root, "sub/nested.go", "package sub\n\nfunc Nested() {}\n");
        write(root, ".hidden/h.go", "package hidden\n\nfunc HiddenFn() {}\n");
        write(root, "vendor/v.go", "package v\n\nfunc VendoredFn() {}\n");
        write(root, "testdata/t.go", "package t\n\nfunc FixtureFn() {}\n");
        write(root, "sub/vendor/deep.go", "package deep\n\nfunc DeepVendored() {}\n");

        let found = index("", root, None).expect("index should succeed");
        assert_eq!(names(&found), vec!["Visible", "Nested"]);
    }

    /// A hidden directory that is itself the scan root is still scanned.
    #[test]
    fn test_hidden_root_is_scanned() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let hidden = workspace.path().join(".hidden");
        write(&hidden, "h.go", "package hidden\n\nfunc HiddenFn() {}\n");

        let found = index("HiddenFn", &hidden, None).expect("index should succeed");
        assert_eq!(names(&found), vec!["HiddenFn"]);

        let vendor = workspace.path().join("vendor");
        write(&vendor, "v.go", "package v\n\nfunc VendoredFn() {}\n");
        let found = index("Vendored", &vendor, None).expect("index should succeed");
        assert_eq!(found.len(), 1);
    }

    /// Files are visited in name order, declarations in source order.
    #[test]
    fn test_traversal_order_is_deterministic() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        write(root, "b.go", "package p\n\nfunc RunB() {}\n\nfunc RunA() {}\n");
        write(root, "a.go", "package p\n\nfunc RunC() {}\n");
        write(root, "a/inner.go", "package a\n\nfunc RunD() {}\n");

        let found = index("Run", root, None).expect("index should succeed");
        assert_eq!(names(&found), vec!["RunD", "RunC", "RunB", "RunA"]);

        let again = index("Run", root, None).expect("index should succeed");
        assert_eq!(names(&found), names(&again));
    }

    /// A file with syntax errors is skipped, the rest of the tree is indexed.
    #[test]
    fn test_unparsable_file_is_skipped() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        write(root, "broken.go", "package p\n\nfunc Broken( {\n");
        write(root, "good.go", "package p\n\nfunc Good() {}\n");

        let found = index("", root, None).expect("index should succeed");
        assert_eq!(names(&found), vec!["Good"]);

        let err = index_file("Broken", &root.join("broken.go"), None)
            .expect_err("single-file index should report the parse failure");
        assert_eq!(err.kind(), "ParseFailure");
    }

    /// Every declaration kind in the fixture is extracted with its metadata.
    #[test]
    fn test_sample_declarations() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        write(workspace.path(), "sample.go", SAMPLE);

        let found = index("", workspace.path(), None).expect("index should succeed");
        let by_name = |name: &str| {
            found
                .iter()
                .find(|d| d.name == name)
                .unwrap_or_else(|| panic!("{} should be indexed", name))
        };

        assert_eq!(by_name("Version").kind, DeclKind::Constant);
        assert_eq!(by_name("GlobalConfig").kind, DeclKind::Variable);
        assert_eq!(by_name("User").kind, DeclKind::Struct);
        assert_eq!(by_name("Reader").kind, DeclKind::Interface);
        assert_eq!(by_name("helper").kind, DeclKind::Function);
        assert!(!by_name("helper").exported);

        let field = by_name("User.Name");
        assert_eq!(field.kind, DeclKind::Field);
        assert_eq!(field.parent.as_deref(), Some("User"));
        assert_eq!(field.declared_type.as_deref(), Some("string"));

        let create = by_name("*UserService.Create");
        assert_eq!(create.kind, DeclKind::Method);
        assert_eq!(create.receiver.as_deref(), Some("*UserService"));
        assert_eq!(create.line, 22);
        assert_eq!(create.end_line, 26);

        let list = by_name("UserService.List");
        assert_eq!(list.receiver.as_deref(), Some("UserService"));
    }

    /// The kind filter narrows results to one category.
    #[test]
    fn test_kind_filter() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        write(workspace.path(), "sample.go", SAMPLE);

        let types = index("User", workspace.path(), Some(KindFilter::Type)).expect("index");
        assert_eq!(names(&types), vec!["User", "UserService"]);

        let functions =
            index("User", workspace.path(), Some(KindFilter::Function)).expect("index");
        assert!(functions.iter().all(|d| d.kind == DeclKind::Method));
        assert_eq!(functions.len(), 3);
    }

    /// A root that is a single file yields just that file.
    #[test]
    fn test_file_root() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        write(workspace.path(), "one.go", "package p\n");
        write(workspace.path(), "two.go", "package p\n");

        let files = go_source_files(&workspace.path().join("one.go"));
        assert_eq!(files, vec![workspace.path().join("one.go")]);
    }
}
