//! Span-addressed declaration editing.
//!
//! Every operation re-reads and re-parses its file, recomputes the span of
//! the target declaration from that fresh tree, splices the bytes with
//! ropey, formats the result, and writes the whole file back atomically
//! (temp file + fsync + rename). Bytes outside the span are preserved.

pub mod relocate;

use crate::error::{GoSpliceError, Result};
use crate::format::{FormatOutcome, FormatterChain};
use crate::ingest::go::{GoFile, Located};
use crate::symbol::DeclKind;
use ropey::Rope;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub use relocate::move_declaration;

/// Which span-locating strategy a mutation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanTarget {
    /// Function or method declaration, `func` keyword through closing brace.
    Function,
    /// Whole `type` declaration, including its group.
    Type,
    /// Whole `var`/`const` declaration, including its group.
    Value,
}

impl SpanTarget {
    /// Mutation strategy for a declaration kind. Fields have none.
    pub fn for_kind(kind: DeclKind) -> Option<Self> {
        match kind {
            DeclKind::Function | DeclKind::Method => Some(SpanTarget::Function),
            DeclKind::Struct | DeclKind::Interface | DeclKind::Alias => Some(SpanTarget::Type),
            DeclKind::Variable | DeclKind::Constant => Some(SpanTarget::Value),
            DeclKind::Field => None,
        }
    }

    /// Convert target to string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanTarget::Function => "function",
            SpanTarget::Type => "type",
            SpanTarget::Value => "var/const",
        }
    }

    fn locate(&self, file: &GoFile, name: &str) -> Option<Located> {
        match self {
            SpanTarget::Function => file.locate_function(name),
            SpanTarget::Type => file.locate_type(name),
            SpanTarget::Value => file.locate_value(name),
        }
    }

    fn locate_or_err(&self, file: &GoFile, name: &str) -> Result<Located> {
        self.locate(file, name).ok_or_else(|| {
            GoSpliceError::SymbolNotFound(format!(
                "{} {} in {}",
                self.as_str(),
                name,
                file.path.display()
            ))
        })
    }
}

/// Declaration text and metadata returned by a read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    /// Name as requested.
    pub name: String,
    /// Kind of the declaration.
    pub kind: DeclKind,
    /// File the text was read from.
    pub file: PathBuf,
    /// 1-based first line of `code`.
    pub line: usize,
    /// 1-based last line of `code`.
    pub end_line: usize,
    /// Receiver type, for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Rendered signature, for functions and methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Raw source text of the span.
    pub code: String,
    /// Initializer of a variable or constant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Declared type of a variable, constant or field.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    /// Enclosing type, for fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ReadResult {
    fn from_located(name: &str, located: Located, code: String) -> Self {
        let decl = located.decl;
        Self {
            name: name.to_string(),
            kind: decl.kind,
            file: decl.file,
            line: located.span.start_line,
            end_line: located.span.end_line,
            receiver: decl.receiver,
            signature: decl.signature,
            code,
            value: decl.value,
            declared_type: decl.declared_type,
            parent: decl.parent,
        }
    }
}

/// Outcome of a mutation.
#[derive(Debug, Clone, Serialize)]
pub struct ModifyResult {
    /// File that was written.
    pub file: PathBuf,
    /// Human-readable summary.
    pub message: String,
    /// Non-fatal problems, such as formatting degradation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ModifyResult {
    pub(crate) fn new(file: &Path, message: String, outcomes: &[FormatOutcome]) -> Self {
        Self {
            file: file.to_path_buf(),
            message,
            warnings: outcomes.iter().filter_map(FormatOutcome::warning).collect(),
        }
    }
}

/// Read one declaration's span text from `path`.
///
/// Scoped to exactly this file: no project-wide fallback.
pub fn read_declaration(target: SpanTarget, name: &str, path: &Path) -> Result<ReadResult> {
    let file = GoFile::read(path)?;
    let located = target.locate_or_err(&file, name)?;
    let code = file.text(located.span.range()).to_string();
    Ok(ReadResult::from_located(name, located, code))
}

/// Read a struct field addressed as `Type.Field`.
///
/// The returned code is the field rendered as `Name Type [tag]`.
pub fn read_field(name: &str, path: &Path) -> Result<ReadResult> {
    let Some((_, field_name)) = name.split_once('.') else {
        return Err(GoSpliceError::InvalidArgument(format!(
            "field name must be Type.Field, got '{}'",
            name
        )));
    };

    let file = GoFile::read(path)?;
    let located = file.locate_field(name).ok_or_else(|| {
        GoSpliceError::SymbolNotFound(format!("field {} in {}", name, path.display()))
    })?;

    let mut code = field_name.to_string();
    if let Some(ty) = &located.decl.declared_type {
        code.push(' ');
        code.push_str(ty);
    }
    if let Some(tag) = &located.tag {
        code.push(' ');
        code.push_str(tag);
    }

    Ok(ReadResult::from_located(name, located, code))
}

/// Replace the span of `name` in `path` with `new_text`.
pub fn replace_declaration(
    target: SpanTarget,
    name: &str,
    path: &Path,
    new_text: &str,
    formatter: &FormatterChain,
) -> Result<ModifyResult> {
    let file = GoFile::read(path)?;
    let located = target.locate_or_err(&file, name)?;
    let source = std::str::from_utf8(&file.source)?;

    let edited = splice(path, source, located.span.range(), new_text)?;
    let outcome = write_formatted(path, edited.as_bytes(), formatter)?;

    log::info!(
        "Replaced {} {} at bytes {}..{} in {}",
        located.decl.kind,
        name,
        located.span.start,
        located.span.end,
        path.display()
    );
    Ok(ModifyResult::new(
        path,
        format!("replaced {} {}", located.decl.kind, name),
        &[outcome],
    ))
}

/// Remove the span of `name` from `path`, along with the line breaks that follow it.
pub fn delete_declaration(
    target: SpanTarget,
    name: &str,
    path: &Path,
    formatter: &FormatterChain,
) -> Result<ModifyResult> {
    let file = GoFile::read(path)?;
    let located = target.locate_or_err(&file, name)?;
    let source = std::str::from_utf8(&file.source)?;

    let range = extend_over_line_breaks(source, located.span.range());
    let edited = splice(path, source, range.clone(), "")?;
    let outcome = write_formatted(path, edited.as_bytes(), formatter)?;

    log::info!(
        "Deleted {} {} at bytes {}..{} in {}",
        located.decl.kind,
        name,
        range.start,
        range.end,
        path.display()
    );
    Ok(ModifyResult::new(
        path,
        format!("deleted {} {}", located.decl.kind, name),
        &[outcome],
    ))
}

/// Append a declaration to the end of `path`. No lookup is performed.
pub fn insert_declaration(
    path: &Path,
    new_text: &str,
    formatter: &FormatterChain,
) -> Result<ModifyResult> {
    let source = std::fs::read_to_string(path).map_err(|e| GoSpliceError::io(path, e))?;
    let edited = append_declaration(&source, new_text);
    let outcome = write_formatted(path, edited.as_bytes(), formatter)?;

    log::info!("Appended declaration to {}", path.display());
    Ok(ModifyResult::new(
        path,
        "added declaration".to_string(),
        &[outcome],
    ))
}

/// Replace `range` of `source` with `replacement`.
pub fn splice(path: &Path, source: &str, range: Range<usize>, replacement: &str) -> Result<String> {
    if range.start > range.end
        || range.end > source.len()
        || !source.is_char_boundary(range.start)
        || !source.is_char_boundary(range.end)
    {
        return Err(GoSpliceError::InvalidSpan {
            file: path.to_path_buf(),
            start: range.start,
            end: range.end,
        });
    }

    let mut rope = Rope::from_str(source);
    let start_char = rope.byte_to_char(range.start);
    let end_char = rope.byte_to_char(range.end);
    rope.remove(start_char..end_char);
    rope.insert(start_char, replacement);
    Ok(rope.to_string())
}

/// Grow `range` to swallow every `\n`/`\r` directly after it.
pub fn extend_over_line_breaks(source: &str, range: Range<usize>) -> Range<usize> {
    let bytes = source.as_bytes();
    let mut end = range.end;
    while end < bytes.len() && (bytes[end] == b'\n' || bytes[end] == b'\r') {
        end += 1;
    }
    range.start..end
}

/// `source` followed by a blank line, the declaration, and a newline.
pub fn append_declaration(source: &str, text: &str) -> String {
    let mut out = String::with_capacity(source.len() + text.len() + 3);
    out.push_str(source);
    out.push_str("\n\n");
    out.push_str(text);
    out.push('\n');
    out
}

/// Format `bytes` for `path` and write the result.
pub(crate) fn write_formatted(
    path: &Path,
    bytes: &[u8],
    formatter: &FormatterChain,
) -> Result<FormatOutcome> {
    let formatted = formatter.format_for(path, bytes);
    write_atomic(path, &formatted.bytes, "gosplice")?;
    Ok(formatted.outcome)
}

/// Write `content` to a sibling temp file, fsync it, then rename over `file_path`.
///
/// The original file's permissions are carried over.
pub fn write_atomic(file_path: &Path, content: &[u8], suffix: &str) -> Result<()> {
    let temp_path = temp_path_for(file_path, suffix)?;
    let permissions = std::fs::metadata(file_path).ok().map(|m| m.permissions());

    let mut temp_file = File::create(&temp_path).map_err(|e| GoSpliceError::io(&temp_path, e))?;
    temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all())
        .map_err(|e| GoSpliceError::io(&temp_path, e))?;
    if let Some(permissions) = permissions {
        std::fs::set_permissions(&temp_path, permissions)
            .map_err(|e| GoSpliceError::io(&temp_path, e))?;
    }

    std::fs::rename(&temp_path, file_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        GoSpliceError::io(file_path, e)
    })
}

fn temp_path_for(file_path: &Path, suffix: &str) -> Result<PathBuf> {
    let file_dir = file_path
        .parent()
        .ok_or_else(|| GoSpliceError::Other("File has no parent directory".to_string()))?;
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("tmp");
    Ok(file_dir.join(format!(".{}.{}.tmp", file_name, suffix)))
}
