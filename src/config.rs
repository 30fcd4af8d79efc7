//! External tool configuration.
//!
//! Settings come from the environment; the CLI can override the formatter
//! chain with `--no-format`.

use crate::format::FormatterChain;
use std::path::PathBuf;
use which::which;

/// Comma-separated formatter programs, canonical first.
pub const FORMATTERS_ENV: &str = "GOSPLICE_FORMATTERS";

/// Explicit path to the `gopls` binary.
pub const GOPLS_ENV: &str = "GOSPLICE_GOPLS";

/// Locations of the external tools an invocation may call.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Formatter chain applied after every edit.
    pub formatters: FormatterChain,
    /// Language server used for semantic navigation, if one was found.
    pub gopls: Option<PathBuf>,
}

impl ToolConfig {
    /// Build the configuration from the process environment.
    pub fn from_env(no_format: bool) -> Self {
        let formatters = if no_format {
            FormatterChain::disabled()
        } else {
            match std::env::var(FORMATTERS_ENV) {
                Ok(list) => FormatterChain::from_list(&list),
                Err(_) => FormatterChain::standard(),
            }
        };

        Self {
            formatters,
            gopls: locate_gopls(),
        }
    }
}

/// `$GOSPLICE_GOPLS`, then `gopls` on `PATH`, then `$HOME/go/bin/gopls`.
pub fn locate_gopls() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(GOPLS_ENV) {
        return Some(PathBuf::from(path));
    }
    if let Ok(path) = which("gopls") {
        return Some(path);
    }
    let home = std::env::var_os("HOME")?;
    let fallback = PathBuf::from(home).join("go").join("bin").join("gopls");
    if fallback.is_file() {
        Some(fallback)
    } else {
        log::debug!("gopls not found; navigation queries will return no results");
        None
    }
}
