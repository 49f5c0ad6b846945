//! Top-down directory walks.
//!
//! Order follows the platform's directory listing: the files of a directory are
//! considered before any of its sub-directories, and sub-directories are
//! visited in listing order. Unreadable directories are skipped and symlinked
//! directories are not descended into.

use std::fs;
use std::path::{Path, PathBuf};

struct Listing {
    files: Vec<(String, PathBuf)>,
    dirs: Vec<(String, PathBuf)>,
}

fn list(dir: &Path) -> Option<Listing> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::trace!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return None;
        }
    };

    let mut listing = Listing {
        files: Vec::new(),
        dirs: Vec::new(),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_real_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_real_dir {
            listing.dirs.push((name, path));
        } else if !path.is_dir() {
            listing.files.push((name, path));
        }
    }
    Some(listing)
}

/// First file named `file_name` at or below `dir`.
pub fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let listing = list(dir)?;

    if let Some((_, path)) = listing.files.into_iter().find(|(name, _)| name == file_name) {
        return Some(path);
    }

    listing
        .dirs
        .into_iter()
        .find_map(|(_, path)| find_file(&path, file_name))
}

/// Every file below `dir` as a `/`-joined path relative to `dir`.
///
/// Directories whose name is in `ignored_dirs` are pruned, at any depth, before
/// they are read.
pub fn relative_files(dir: &Path, ignored_dirs: &[&str]) -> Vec<String> {
    let mut files = Vec::new();
    collect(dir, "", ignored_dirs, &mut files);
    files
}

fn collect(dir: &Path, prefix: &str, ignored_dirs: &[&str], out: &mut Vec<String>) {
    let Some(listing) = list(dir) else {
        return;
    };

    out.extend(listing.files.into_iter().map(|(name, _)| format!("{prefix}{name}")));

    for (name, path) in listing.dirs {
        if ignored_dirs.contains(&name.as_str()) {
            tracing::trace!(dir = %path.display(), "pruned ignored directory");
            continue;
        }
        collect(&path, &format!("{prefix}{name}/"), ignored_dirs, out);
    }
}
