//! Scoped access to zip-format package archives.
//!
//! # Architecture
//!
//! - `archive.rs` - [`Archive`] handle: list, read, extract one entry
//! - `sanitize.rs` - Entry path sanitization (zip-slip prevention)
//! - `error.rs` - Errors; [`Error::is_miss`] separates absence from failure
//!
//! The free functions open the archive, do one thing and close it again, so no
//! handle outlives a single lookup.

pub use archive::Archive;
pub use error::{Error, Result};
pub use sanitize::sanitize_entry_path;

use std::path::{Path, PathBuf};

mod archive;
mod error;
mod sanitize;

/// Entry names of the archive at `archive`, in archive order.
pub fn list_entries(archive: impl AsRef<Path>) -> Result<Vec<String>> {
    Ok(Archive::open(archive)?.entries())
}

/// Raw bytes of `entry` inside the archive at `archive`.
pub fn read_entry(archive: impl AsRef<Path>, entry: &str) -> Result<Vec<u8>> {
    Archive::open(archive)?.read(entry)
}

/// Extract `entry` below `dest_dir` and return the extracted path.
pub fn extract_entry(archive: impl AsRef<Path>, entry: &str, dest_dir: &Path) -> Result<PathBuf> {
    Archive::open(archive)?.extract(entry, dest_dir)
}

/// Extract `entry` into a fresh temporary directory, see [`Archive::extract_to_temp`].
pub fn extract_to_temp(archive: impl AsRef<Path>, entry: &str) -> Result<PathBuf> {
    Archive::open(archive)?.extract_to_temp(entry)
}
