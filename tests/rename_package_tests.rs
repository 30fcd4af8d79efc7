//! Integration tests for project-wide package renames.

use gosplice::project::rename_package;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }

    fn read(root: &Path, rel: &str) -> String {
        std::fs::read_to_string(root.join(rel)).expect("Failed to read file")
    }

    /// Module with `oldpkg/` imported from `main.go`.
    fn module() -> TempDir {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        write(root, "go.mod", "module example.com/test\n\ngo 1.21\n");
        write(
            root,
            "oldpkg/utils.go",
            "package oldpkg\n\nfunc Helper() string {\n\treturn \"hello\"\n}\n",
        );
        write(
            root,
            "oldpkg/utils_test.go",
            "package oldpkg_test\n\nimport \"testing\"\n\nfunc TestHelper(t *testing.T) {}\n",
        );
        write(
            root,
            "main.go",
            "package main\n\nimport \"example.com/test/oldpkg\"\n\nfunc main() {\n\tprintln(oldpkg.Helper())\n}\n",
        );
        workspace
    }

    /// Test A: clauses, directory and importers all follow the new name.
    #[test]
    fn test_rename_package_moves_directory_and_fixes_imports() {
        let workspace = module();
        let root = workspace.path();

        let result = rename_package("oldpkg", "newpkg", root).expect("rename should succeed");
        assert_eq!(result.directory, PathBuf::from("newpkg"));
        assert_eq!(result.imports_fixed, 1);
        assert!(result.files_changed.contains(&PathBuf::from("newpkg/utils.go")));
        assert!(result.files_changed.contains(&PathBuf::from("main.go")));

        assert!(root.join("newpkg").is_dir());
        assert!(!root.join("oldpkg").exists());
        assert!(read(root, "newpkg/utils.go").starts_with("package newpkg\n"));
        assert!(read(root, "newpkg/utils_test.go").starts_with("package newpkg_test\n"));

        let main = read(root, "main.go");
        assert!(main.contains("\"example.com/test/newpkg\""));
        assert!(main.contains("newpkg.Helper()"));
        assert!(!main.contains("oldpkg"));
    }

    /// Test B: a directory named differently from its package keeps its name.
    #[test]
    fn test_rename_package_in_differently_named_directory() {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        write(root, "go.mod", "module example.com/test\n");
        write(root, "lib/code.go", "package oldpkg\n\nfunc Run() {}\n");
        write(
            root,
            "main.go",
            "package main\n\nimport \"example.com/test/lib\"\n\nfunc main() { oldpkg.Run() }\n",
        );

        let result = rename_package("oldpkg", "newpkg", root).expect("rename should succeed");
        assert_eq!(result.directory, PathBuf::from("lib"));
        assert!(read(root, "lib/code.go").starts_with("package newpkg\n"));

        let main = read(root, "main.go");
        assert!(main.contains("\"example.com/test/lib\""));
        assert!(main.contains("newpkg.Run()"));
    }

    /// Test C: an unknown package is NotFound and nothing changes.
    #[test]
    fn test_rename_missing_package() {
        let workspace = module();
        let err = rename_package("nonexistent", "newname", workspace.path())
            .expect_err("package does not exist");
        assert_eq!(err.kind(), "NotFound");
        assert!(workspace.path().join("oldpkg").is_dir());
    }

    /// Test D: renaming to the same name succeeds without touching files.
    #[test]
    fn test_rename_to_same_name() {
        let workspace = module();
        let before = read(workspace.path(), "main.go");

        let result = rename_package("oldpkg", "oldpkg", workspace.path()).expect("no-op rename");
        assert!(result.files_changed.is_empty());
        assert_eq!(read(workspace.path(), "main.go"), before);
    }

    /// Test E: invalid identifiers and existing target directories are refused.
    #[test]
    fn test_rename_rejects_bad_targets() {
        let workspace = module();
        let root = workspace.path();

        let err = rename_package("oldpkg", "new-pkg", root).expect_err("not an identifier");
        assert_eq!(err.kind(), "InvalidArgument");

        std::fs::create_dir(root.join("taken")).expect("create taken/");
        let err = rename_package("oldpkg", "taken", root).expect_err("directory exists");
        assert_eq!(err.kind(), "InvalidArgument");
        assert!(read(root, "oldpkg/utils.go").starts_with("package oldpkg\n"));
    }
}
