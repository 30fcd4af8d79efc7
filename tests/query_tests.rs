//! Integration tests for the read-only queries: project listings, multi-match
//! reads, navigation, line ranges and grep.

use gosplice::dispatch::read_all;
use gosplice::lines;
use gosplice::nav::{self, Scope as NavScope};
use gosplice::project;
use gosplice::search::{grep, GrepOptions};
use gosplice::symbol::DeclKind;
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

    /// A small module: the sample package at the root plus `internal/store`.
    fn module() -> TempDir {
        let workspace = TempDir::new().expect("Failed to create temp dir");
        let root = workspace.path();
        write(root, "go.mod", "module example.com/sample\n\ngo 1.22\n");
        write(root, "sample.go", SAMPLE);
        write(
            root,
            "internal/store/store.go",
            "package store\n\nfunc Open() error { return nil }\n\nfunc helper() {}\n",
        );
        write(
            root,
            "internal/store/store_test.go",
            "package store\n\nimport \"testing\"\n\nfunc TestOpen(t *testing.T) {}\n",
        );
        workspace
    }

    /// Every exact match across the tree is read, in traversal order.
    #[test]
    fn test_read_all_collects_every_exact_match() {
        let workspace = module();

        let results = read_all("helper", workspace.path(), None).expect("read_all");
        assert_eq!(results.len(), 2);
        assert!(results[0].file.ends_with("internal/store/store.go"));
        assert_eq!(results[0].code, "func helper() {}");
        assert!(results[1].file.ends_with("sample.go"));

        let methods = read_all("Create", workspace.path(), None).expect("bare method name");
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].receiver.as_deref(), Some("*UserService"));

        let err = read_all("help", workspace.path(), None).expect_err("substring is not exact");
        assert_eq!(err.kind(), "NotFound");
    }

    /// Package directories are listed with their names and file counts.
    #[test]
    fn test_packages_and_overview() {
        let workspace = module();

        let listing = project::packages(workspace.path()).expect("packages");
        assert_eq!(listing.count, 2);
        let names: Vec<_> = listing
            .packages
            .iter()
            .map(|p| (p.name.as_deref(), p.path.to_string_lossy().into_owned(), p.num_files))
            .collect();
        assert_eq!(
            names,
            vec![
                (Some("sample"), ".".to_string(), 1),
                (Some("store"), "internal/store".to_string(), 1),
            ]
        );

        let info = project::overview(workspace.path()).expect("overview");
        assert_eq!(info.module.as_deref(), Some("example.com/sample"));
        assert_eq!(info.go_version.as_deref(), Some("1.22"));
        assert_eq!(info.go_files, 2);
        assert_eq!(info.test_files, 1);
        assert_eq!(info.packages, 2);
    }

    /// Symbols can be listed by file, directory or package name.
    #[test]
    fn test_symbols_and_api() {
        let workspace = module();
        let root = workspace.path();

        let file = root.join("sample.go");
        let by_file = project::symbols(file.to_str().expect("utf-8 path"), root).expect("file");
        assert_eq!(by_file.package.as_deref(), Some("sample"));
        assert!(by_file.symbols.iter().all(|d| d.kind != DeclKind::Field));
        assert!(by_file.symbols.iter().any(|d| d.name == "ProcessOrder"));

        let by_name = project::symbols("store", root).expect("package name lookup");
        let names: Vec<_> = by_name.symbols.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Open", "helper"]);

        let api = project::api(&root.join("internal/store")).expect("api");
        let exported: Vec<_> = api.symbols.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(exported, vec!["Open"]);
        assert_eq!(api.num_files, 1);
    }

    /// Definition and positional context come from the parse tree alone.
    #[test]
    fn test_definition_and_context() {
        let workspace = module();
        let root = workspace.path();

        let def = nav::definition("ProcessOrder", root).expect("definition");
        assert!(def.location.file.ends_with("sample.go"));
        assert_eq!(def.location.line, 40);

        let file = root.join("sample.go");
        let inside = nav::context(&file, 23, 2).expect("context in Create body");
        assert_eq!(inside.scope, NavScope::FuncBody);
        assert_eq!(inside.func.as_deref(), Some("*UserService.Create"));
        assert!(inside.in_body);
        assert_eq!(inside.package, "sample");

        let in_type = nav::context(&file, 14, 2).expect("context in User");
        assert_eq!(in_type.scope, NavScope::Type);
        assert_eq!(in_type.type_name.as_deref(), Some("User"));

        let in_const = nav::context(&file, 6, 2).expect("context in const block");
        assert_eq!(in_const.scope, NavScope::Const);

        assert_eq!(nav::enclosing_function(&file, 41).as_deref(), Some("ProcessOrder"));
    }

    /// Line ranges read and rewrite whole lines.
    #[test]
    fn test_line_range_edits() {
        let workspace = module();
        let file = workspace.path().join("sample.go");

        let read = lines::read_lines(&file, 6, 7).expect("read lines");
        assert_eq!(read.lines, "\tVersion = \"2.0.0\"\n\tDip     = true");
        assert_eq!(read.count, 2);

        lines::replace_lines(&file, 6, 6, "\tVersion = \"9.9.9\"").expect("replace line");
        let content = std::fs::read_to_string(&file).expect("read back");
        assert!(content.contains("\tVersion = \"9.9.9\"\n\tDip     = true\n"));
        assert_eq!(content.lines().count(), SAMPLE.lines().count());
    }

    /// Grep restricted to Go files, with and without regex mode.
    #[test]
    fn test_grep_go_sources() {
        let workspace = module();
        let root = workspace.path();

        let plain = grep("helper", root, &GrepOptions::default()).expect("grep");
        assert_eq!(plain.count, 3);

        let regex = grep(
            r"^func \(s \*?UserService\)",
            root,
            &GrepOptions {
                regex: true,
                ..GrepOptions::default()
            },
        )
        .expect("regex grep");
        assert_eq!(regex.count, 3);

        let modules = grep(
            "example.com",
            root,
            &GrepOptions {
                file_pattern: Some("go.mod".to_string()),
                ..GrepOptions::default()
            },
        )
        .expect("glob grep");
        assert_eq!(modules.count, 1);
        assert!(modules.matches[0].file.ends_with("go.mod"));
    }
}
