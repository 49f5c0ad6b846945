use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry name to a path inside `base`.
///
/// Entry names are split on both separators. Absolute names, drive prefixes
/// and `..` segments that climb above `base` are rejected (zip-slip).
pub fn sanitize_entry_path(entry: &str, base: &Path) -> Result<PathBuf> {
    let zip_slip = || Error::ZipSlip {
        entry: entry.to_string(),
        resolved: base.join(entry),
    };

    if entry.starts_with(['/', '\\']) || has_drive_prefix(entry) {
        return Err(zip_slip());
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in entry.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(zip_slip());
                }
            }
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(zip_slip());
    }

    let resolved = parts.iter().fold(base.to_path_buf(), |acc, part| acc.join(part));
    if !resolved.starts_with(base) {
        return Err(Error::ZipSlip {
            entry: entry.to_string(),
            resolved,
        });
    }

    Ok(resolved)
}

fn has_drive_prefix(entry: &str) -> bool {
    let bytes = entry.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
