//! gosplice error types.
//!
//! All errors are typed and provide root cause information.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for gosplice operations.
#[derive(Error, Debug)]
pub enum GoSpliceError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Tree-sitter parsing error.
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// The file that failed to parse.
        file: PathBuf,
        /// The parse error message.
        message: String,
    },

    /// Symbol not found in the searched scope.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The resolved declaration has a kind the requested operation cannot edit.
    #[error("cannot {operation} symbol of kind {kind}")]
    UnsupportedKind {
        /// The operation that was requested (replace, delete, move).
        operation: &'static str,
        /// The symbol name.
        name: String,
        /// The declaration kind.
        kind: String,
    },

    /// Invalid byte span.
    #[error("Invalid span ({start}, {end}) in {file}")]
    InvalidSpan {
        /// The file containing the invalid span.
        file: PathBuf,
        /// Start byte offset.
        start: usize,
        /// End byte offset.
        end: usize,
    },

    /// Malformed user input (line ranges, qualified names, targets).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A move removed the declaration from its source but could not append it
    /// to the destination.
    #[error("Partial move of '{name}': removed from {source_file} but not written to {destination}: {message}")]
    PartialMove {
        /// The symbol name.
        name: String,
        /// File the declaration was removed from.
        source_file: PathBuf,
        /// File the declaration should have been appended to.
        destination: PathBuf,
        /// The error raised by the failed append.
        message: String,
        /// The declaration text that is no longer on disk.
        code: String,
    },

    /// Invalid search pattern.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// UTF-8 validation error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl GoSpliceError {
    /// Attach a path to an I/O error.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        GoSpliceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable identifier used in JSON failure records.
    pub fn kind(&self) -> &'static str {
        match self {
            GoSpliceError::Io { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                "NotFound"
            }
            GoSpliceError::Io { .. } => "Io",
            GoSpliceError::Parse { .. } => "ParseFailure",
            GoSpliceError::SymbolNotFound(_) => "NotFound",
            GoSpliceError::UnsupportedKind { .. } => "UnsupportedKind",
            GoSpliceError::InvalidSpan { .. } => "InvalidSpan",
            GoSpliceError::InvalidArgument(_) => "InvalidArgument",
            GoSpliceError::PartialMove { .. } => "PartialMove",
            GoSpliceError::Pattern(_) => "InvalidPattern",
            GoSpliceError::Utf8(_) => "Utf8",
            GoSpliceError::Other(_) => "Other",
        }
    }

    /// Symbol the error refers to, when there is one.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            GoSpliceError::SymbolNotFound(name) => Some(name),
            GoSpliceError::UnsupportedKind { name, .. } => Some(name),
            GoSpliceError::PartialMove { name, .. } => Some(name),
            _ => None,
        }
    }

    /// File the error refers to, when there is one.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            GoSpliceError::Io { path, .. } => Some(path),
            GoSpliceError::Parse { file, .. } => Some(file),
            GoSpliceError::InvalidSpan { file, .. } => Some(file),
            GoSpliceError::PartialMove { source_file, .. } => Some(source_file),
            _ => None,
        }
    }

    /// Remediation hint for the CLI failure record.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            GoSpliceError::SymbolNotFound(_) => {
                Some("Run `gosplice find <name>` to list matching declarations")
            }
            GoSpliceError::UnsupportedKind { .. } => {
                Some("Struct fields are edited by replacing the enclosing type")
            }
            GoSpliceError::Parse { .. } => Some("Fix the syntax errors in the file and retry"),
            GoSpliceError::PartialMove { .. } => {
                Some("Re-insert the reported code into the source or destination file")
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for GoSpliceError {
    fn from(err: std::io::Error) -> Self {
        GoSpliceError::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Result type alias for gosplice operations.
pub type Result<T> = std::result::Result<T, GoSpliceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_kind_message() {
        let err = GoSpliceError::UnsupportedKind {
            operation: "replace",
            name: "User.Name".to_string(),
            kind: "field".to_string(),
        };
        assert_eq!(err.to_string(), "cannot replace symbol of kind field");
        assert_eq!(err.kind(), "UnsupportedKind");
        assert_eq!(err.symbol(), Some("User.Name"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = GoSpliceError::io(
            Path::new("main.go"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.file_path(), Some(Path::new("main.go")));
        assert_eq!(err.kind(), "NotFound");
    }

    #[test]
    fn test_other_io_errors_keep_io_kind() {
        let err = GoSpliceError::io(
            Path::new("main.go"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), "Io");
    }
}
