//! Recovers the next sequence index from the image folder.
//!
//! The set of files on disk is the only durable record of where a previous
//! session left off; there is no separate index file. The resolver runs once
//! per `start()`, never per tick.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CaptureError;

/// Extensions the resolver considers part of the sequence (case-sensitive).
pub const VALID_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Returns the index the next capture should be written under.
///
/// Picks the most recently modified image file in `folder`, parses the
/// numeric suffix between `prefix` and `.{extension}`, and returns it plus
/// one. An empty or missing folder starts the sequence at 0. A latest file
/// that does not strictly match the naming pattern is a
/// [`CaptureError::MalformedSequenceFile`]: guessing an index here risks
/// overwriting images from an earlier session.
pub fn resolve_next_index(
    folder: &Path,
    prefix: &str,
    extension: &str,
) -> Result<u64, CaptureError> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches_filter = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| VALID_EXTENSIONS.contains(&ext));
        if !matches_filter {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        // `>=` so a tie goes to the last entry encountered.
        if latest.as_ref().map_or(true, |(when, _)| modified >= *when) {
            latest = Some((modified, path));
        }
    }

    match latest {
        Some((_, path)) => Ok(parse_sequence_index(&path, prefix, extension)? + 1),
        None => Ok(0),
    }
}

/// Strict parse of `{prefix}<digits>.{extension}`; anything else is malformed.
fn parse_sequence_index(
    path: &Path,
    prefix: &str,
    extension: &str,
) -> Result<u64, CaptureError> {
    let malformed = || CaptureError::MalformedSequenceFile {
        path: path.to_path_buf(),
        prefix: prefix.to_string(),
        extension: extension.to_string(),
    };

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(malformed)?;
    let digits = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(&format!(".{extension}")))
        .ok_or_else(malformed)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    digits.parse::<u64>().map_err(|_| malformed())
}
