//! Moving a declaration between files.
//!
//! A move is read + delete + append, in that order, with no rollback. The
//! destination is read before the source is touched, so a missing or
//! unreadable destination fails without loss. Once the source delete has
//! been written, a failed destination write is reported as
//! [`GoSpliceError::PartialMove`] carrying the declaration text.

use super::{
    append_declaration, delete_declaration, read_declaration, write_formatted, ModifyResult,
    SpanTarget,
};
use crate::error::{GoSpliceError, Result};
use crate::format::FormatterChain;
use std::path::Path;

/// Move the declaration `name` from `src` to the end of `dst`.
///
/// Both files are formatted independently after the move.
pub fn move_declaration(
    target: SpanTarget,
    name: &str,
    src: &Path,
    dst: &Path,
    formatter: &FormatterChain,
) -> Result<ModifyResult> {
    let read = read_declaration(target, name, src)?;
    let destination = std::fs::read_to_string(dst).map_err(|e| GoSpliceError::io(dst, e))?;

    let removed = delete_declaration(target, name, src, formatter)?;

    let appended = append_declaration(&destination, &read.code);
    let dst_outcome = match write_formatted(dst, appended.as_bytes(), formatter) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!(
                "{} was removed from {} but could not be written to {}: {}",
                name,
                src.display(),
                dst.display(),
                e
            );
            return Err(GoSpliceError::PartialMove {
                name: name.to_string(),
                source_file: src.to_path_buf(),
                destination: dst.to_path_buf(),
                message: e.to_string(),
                code: read.code,
            });
        }
    };

    log::info!("Moved {} from {} to {}", name, src.display(), dst.display());

    let mut result = ModifyResult::new(
        dst,
        format!("moved {} from {} to {}", name, src.display(), dst.display()),
        &[dst_outcome],
    );
    result.warnings.extend(removed.warnings);
    Ok(result)
}
