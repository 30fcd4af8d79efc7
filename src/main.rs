//! gosplice CLI binary
//!
//! This is the main entry point for the gosplice command-line interface.
//! The CLI is a thin adapter over existing APIs - NO logic is implemented here.

use gosplice::cli::{
    read_source_text, CliErrorPayload, CliSuccessPayload, Commands, FindPayload, ReadAllPayload,
    VersionPayload,
};
use gosplice::config::ToolConfig;
use gosplice::dispatch::{self, Scope};
use gosplice::lines::{self, LineRange};
use gosplice::nav::{self, Gopls, Position};
use gosplice::search::{self, GrepOptions};
use gosplice::{project, validate, GoSpliceError};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = gosplice::cli::parse_args();

    // Initialize logger if verbose
    if cli.verbose {
        env_logger::init();
    }

    let config = ToolConfig::from_env(cli.no_format);

    // Execute command
    match execute(cli.command, &cli.root, &config) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let payload = CliErrorPayload::from_error(&e);
            match serde_json::to_string(&payload) {
                Ok(json) => println!("{}", json),
                Err(_) => println!("{{\"success\":false,\"error\":{:?}}}", e.to_string()),
            }
            ExitCode::from(1)
        }
    }
}

/// Route one command to the library and render its success payload.
fn execute(command: Commands, root: &Path, config: &ToolConfig) -> gosplice::Result<String> {
    let formatter = &config.formatters;

    match command {
        Commands::Find { query, kind } => {
            let matches = gosplice::ingest::index(&query, root, kind)?;
            render(FindPayload {
                query,
                count: matches.len(),
                matches,
            })
        }

        Commands::Read { name, file, kind } => match file {
            Some(file) => {
                let scope = Scope::tree(root).in_file(Some(file)).with_kind(kind);
                render(dispatch::read(&name, &scope)?)
            }
            None => {
                let results = dispatch::read_all(&name, root, kind)?;
                render(ReadAllPayload {
                    count: results.len(),
                    results,
                })
            }
        },

        Commands::Replace {
            name,
            file,
            kind,
            with_,
        } => {
            let text = read_source_text(with_.as_deref())?;
            let scope = Scope::tree(root).in_file(file).with_kind(kind);
            render(dispatch::replace(&name, &scope, &text, formatter)?)
        }

        Commands::Delete { name, file, kind } => {
            let scope = Scope::tree(root).in_file(file).with_kind(kind);
            render(dispatch::delete(&name, &scope, formatter)?)
        }

        Commands::Add { file, with_ } => {
            let text = read_source_text(with_.as_deref())?;
            render(gosplice::patch::insert_declaration(&file, &text, formatter)?)
        }

        Commands::Move {
            name,
            destination,
            from,
            kind,
        } => {
            let scope = Scope::tree(root).in_file(from).with_kind(kind);
            render(dispatch::relocate(&name, &destination, &scope, formatter)?)
        }

        Commands::Symbols { target } => render(project::symbols(&target, root)?),
        Commands::Api { dir } => render(project::api(&dir)?),
        Commands::Packages { dir } => render(project::packages(&dir)?),
        Commands::Project { dir } => render(project::overview(&dir)?),

        Commands::Lines { range } => {
            let range: LineRange = range.parse()?;
            render(lines::read_lines(&range.file, range.start, range.end)?)
        }

        Commands::ReplaceLines { range, with_ } => {
            let range: LineRange = range.parse()?;
            let text = read_source_text(with_.as_deref())?;
            render(lines::replace_lines(&range.file, range.start, range.end, &text)?)
        }

        Commands::DeleteLines { range } => {
            let range: LineRange = range.parse()?;
            render(lines::delete_lines(&range.file, range.start, range.end)?)
        }

        Commands::InsertLines { range, with_ } => {
            let range: LineRange = range.parse()?;
            let text = read_source_text(with_.as_deref())?;
            render(lines::insert_lines(&range.file, range.start, &text)?)
        }

        Commands::Grep {
            pattern,
            dir,
            regex,
            ignore_case,
            context,
            files,
        } => {
            let options = GrepOptions {
                regex,
                ignore_case,
                context,
                file_pattern: files,
            };
            render(search::grep(&pattern, &dir, &options)?)
        }

        Commands::Format { target } => {
            render(validate::format_target(&target, root, formatter)?)
        }
        Commands::Check { dir } => render(validate::check(&dir)?),
        Commands::Test { package } => render(validate::run_tests(root, Some(&package))?),

        Commands::Definition { symbol } => render(nav::definition(&symbol, root)?),
        Commands::References { symbol } => {
            render(Gopls::new(config.gopls.clone(), root).references(&symbol)?)
        }
        Commands::Implementations { symbol } => {
            render(Gopls::new(config.gopls.clone(), root).implementations(&symbol)?)
        }
        Commands::Callers { symbol } => {
            render(Gopls::new(config.gopls.clone(), root).callers(&symbol)?)
        }
        Commands::Rename { old_name, new_name } => {
            render(Gopls::new(config.gopls.clone(), root).rename(&old_name, &new_name)?)
        }

        Commands::RenamePackage { old_name, new_name } => {
            render(project::rename_package(&old_name, &new_name, root)?)
        }

        Commands::Context { position } => {
            let position: Position = position.parse()?;
            render(nav::context(&position.file, position.line, position.column)?)
        }

        Commands::Version => render(VersionPayload {
            version: gosplice::VERSION,
        }),
    }
}

fn render<T: Serialize>(data: T) -> gosplice::Result<String> {
    serde_json::to_string_pretty(&CliSuccessPayload::new(data))
        .map_err(|e| GoSpliceError::Other(format!("Failed to encode output: {}", e)))
}
