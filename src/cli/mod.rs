//! Command-line interface for gosplice.
//!
//! This module handles argument parsing and the JSON payload shapes only.
//! NO indexing or editing logic is performed here.

use crate::symbol::{Declaration, KindFilter};
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

/// gosplice: span-safe declaration editing for Go source trees.
#[derive(Parser, Debug)]
#[command(name = "gosplice")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Project root searched when no file is given.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Write edits without running gofmt/goimports.
    #[arg(long, global = true)]
    pub no_format: bool,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available gosplice commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Find declarations whose name matches a query.
    Find {
        /// Name or fragment to search for.
        query: String,

        /// Restrict to one kind category.
        #[arg(short, long)]
        kind: Option<KindFilter>,
    },

    /// Print the source of a declaration.
    Read {
        /// Declaration name (`Func`, `Type`, `Recv.Method`, `Type.Field`).
        name: String,

        /// File containing the declaration. Without it every exact match in
        /// the tree is returned.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Restrict to one kind category.
        #[arg(short, long)]
        kind: Option<KindFilter>,
    },

    /// Replace a declaration with new source.
    Replace {
        /// Declaration name.
        name: String,

        /// File containing the declaration.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Restrict to one kind category.
        #[arg(short, long)]
        kind: Option<KindFilter>,

        /// File holding the replacement source (stdin when omitted).
        #[arg(short = 'w', long = "with", value_name = "FILE")]
        with_: Option<PathBuf>,
    },

    /// Delete a declaration.
    Delete {
        /// Declaration name.
        name: String,

        /// File containing the declaration.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Restrict to one kind category.
        #[arg(short, long)]
        kind: Option<KindFilter>,
    },

    /// Append a declaration to a file.
    Add {
        /// Target file.
        file: PathBuf,

        /// File holding the new source (stdin when omitted).
        #[arg(short = 'w', long = "with", value_name = "FILE")]
        with_: Option<PathBuf>,
    },

    /// Move a declaration to another file.
    Move {
        /// Declaration name.
        name: String,

        /// Destination file.
        destination: PathBuf,

        /// Source file (looked up in the destination's package when omitted).
        #[arg(long)]
        from: Option<PathBuf>,

        /// Restrict to one kind category.
        #[arg(short, long)]
        kind: Option<KindFilter>,
    },

    /// List the declarations of a file, directory, or package name.
    Symbols {
        /// File, directory, or package name.
        #[arg(default_value = ".")]
        target: String,
    },

    /// List the exported declarations of a package directory.
    Api {
        /// Package directory.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// List package directories.
    Packages {
        /// Directory to scan.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Summarize the project (module, Go version, file counts).
    Project {
        /// Project directory.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Print a line range (`file:N` or `file:N:M`).
    Lines {
        /// Line range.
        range: String,
    },

    /// Replace a line range with new text.
    ReplaceLines {
        /// Line range.
        range: String,

        /// File holding the new text (stdin when omitted).
        #[arg(short = 'w', long = "with", value_name = "FILE")]
        with_: Option<PathBuf>,
    },

    /// Delete a line range.
    DeleteLines {
        /// Line range.
        range: String,
    },

    /// Insert text after a line (`file:N`, 0 for the top).
    InsertLines {
        /// Insertion point.
        range: String,

        /// File holding the new text (stdin when omitted).
        #[arg(short = 'w', long = "with", value_name = "FILE")]
        with_: Option<PathBuf>,
    },

    /// Search file contents.
    Grep {
        /// Text or regular expression.
        pattern: String,

        /// Directory to search.
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Treat the pattern as a regular expression.
        #[arg(short, long)]
        regex: bool,

        /// Case-insensitive matching.
        #[arg(short, long)]
        ignore_case: bool,

        /// Lines of leading context per match.
        #[arg(short = 'C', long, default_value_t = 0)]
        context: usize,

        /// Only search files whose name matches this glob.
        #[arg(short, long, value_name = "GLOB")]
        files: Option<String>,
    },

    /// Format a file, a directory, or `./...`.
    Format {
        /// Target to format.
        #[arg(default_value = "./...")]
        target: String,
    },

    /// Run `go build` and `go vet`.
    Check {
        /// Module directory.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Run `go test -v`.
    Test {
        /// Package pattern.
        #[arg(default_value = "./...")]
        package: String,
    },

    /// Show where a symbol is declared.
    Definition {
        /// Symbol name.
        symbol: String,
    },

    /// List references to a symbol (via gopls).
    References {
        /// Symbol name.
        symbol: String,
    },

    /// List implementations of an interface or method (via gopls).
    Implementations {
        /// Symbol name.
        symbol: String,
    },

    /// List call sites of a function (via gopls).
    Callers {
        /// Function name.
        symbol: String,
    },

    /// Rename a symbol across the project (via gopls).
    Rename {
        /// Current name.
        old_name: String,

        /// New name.
        new_name: String,
    },

    /// Rename a package: clauses, directory, and importers' paths.
    RenamePackage {
        /// Current package name.
        old_name: String,

        /// New package name.
        new_name: String,
    },

    /// Describe the scope at `file:line[:col]`.
    Context {
        /// Position.
        position: String,
    },

    /// Print the gosplice version.
    Version,
}

/// Parse command-line arguments.
///
/// This function is the entry point for CLI argument parsing.
/// It returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Source text for an edit: the named file, or stdin.
pub fn read_source_text(with_: Option<&std::path::Path>) -> crate::Result<String> {
    match with_ {
        Some(path) => std::fs::read_to_string(path).map_err(|e| crate::GoSpliceError::io(path, e)),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| crate::GoSpliceError::io(std::path::Path::new("<stdin>"), e))?;
            Ok(text)
        }
    }
}

/// JSON success payload: `{"success": true, ...data}`.
#[derive(Serialize)]
pub struct CliSuccessPayload<T: Serialize> {
    /// Always true.
    pub success: bool,
    /// Command-specific fields, flattened into the payload.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> CliSuccessPayload<T> {
    /// Wrap command output.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Declarations matching a `find` query.
#[derive(Serialize)]
pub struct FindPayload {
    /// The query as given.
    pub query: String,
    /// Matches in traversal order.
    pub matches: Vec<Declaration>,
    /// Number of matches.
    pub count: usize,
}

/// Every exact match of a project-wide `read`.
#[derive(Serialize)]
pub struct ReadAllPayload {
    /// Read results in traversal order.
    pub results: Vec<crate::patch::ReadResult>,
    /// Number of results.
    pub count: usize,
}

/// Version information.
#[derive(Serialize)]
pub struct VersionPayload {
    /// Crate version.
    pub version: &'static str,
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Always false.
    pub success: bool,
    /// Human-readable message.
    pub error: String,
    /// Error kind identifier (NotFound, ParseFailure, etc.).
    pub kind: &'static str,
    /// Optional symbol context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Optional file context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Optional hint for remediation steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Declaration text that a partial move failed to write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CliErrorPayload {
    /// Build payload from a GoSpliceError instance.
    pub fn from_error(error: &crate::GoSpliceError) -> Self {
        let code = match error {
            crate::GoSpliceError::PartialMove { code, .. } => Some(code.clone()),
            _ => None,
        };
        CliErrorPayload {
            success: false,
            error: error.to_string(),
            kind: error.kind(),
            symbol: error.symbol().map(|s| s.to_string()),
            file: error
                .file_path()
                .map(|path| path.to_string_lossy().to_string()),
            hint: error.hint().map(|h| h.to_string()),
            code,
        }
    }
}
