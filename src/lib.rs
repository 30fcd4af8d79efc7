//! gosplice: span-safe declaration editing for Go source trees.
//!
//! This library walks a Go project, parses every file with tree-sitter,
//! resolves a name query to exactly one declaration, and performs
//! byte-precise read/replace/delete/insert/move operations on it while
//! leaving the surrounding source untouched.

#![warn(missing_docs)]
// env_logger is used by src/main.rs (binary), not this library
#![expect(unused_crate_dependencies)]

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod ingest;
pub mod lines;
pub mod nav;
pub mod patch;
pub mod project;
pub mod resolve;
pub mod search;
pub mod symbol;
pub mod validate;

/// Re-export common error types for convenience.
pub use error::{GoSpliceError, Result};

/// Re-export the declaration record types for convenience.
pub use symbol::{DeclKind, Declaration, KindFilter};

/// gosplice version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
