use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};
use crate::sanitize::sanitize_entry_path;

/// Upper bound on the buffer reserved from an entry's declared size.
const READ_RESERVE_LIMIT: u64 = 64 * 1024;

/// An open zip archive.
///
/// Handles are meant to be scoped: open, query, drop. Nothing is cached
/// between handles.
pub struct Archive {
    path: PathBuf,
    inner: ZipArchive<BufReader<File>>,
}

impl Archive {
    /// Open the archive at `path`.
    ///
    /// A missing file is [`Error::ArchiveNotFound`]; a file that is not a
    /// readable zip is [`Error::Corrupted`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ArchiveNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let inner = ZipArchive::new(BufReader::new(file)).map_err(|source| Error::Corrupted {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Entry names in archive order, directories included.
    pub fn entries(&self) -> Vec<String> {
        self.inner.file_names().map(str::to_string).collect()
    }

    /// Entry names in archive order, directory entries (`dir/`) skipped.
    pub fn file_entries(&self) -> Vec<String> {
        self.inner
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.inner.index_for_name(entry).is_some()
    }

    /// First entry, in archive order, whose name ends with `suffix`.
    pub fn find_suffix(&self, suffix: &str) -> Option<String> {
        self.inner
            .file_names()
            .find(|name| name.ends_with(suffix))
            .map(str::to_string)
    }

    /// Raw bytes of `entry`.
    ///
    /// The declared size only sizes the initial buffer, up to a small limit; it
    /// is never trusted for a full allocation.
    pub fn read(&mut self, entry: &str) -> Result<Vec<u8>> {
        let mut file = self.inner.by_name(entry).map_err(|e| zip_error(&self.path, entry, e))?;
        let mut content = Vec::with_capacity(file.size().min(READ_RESERVE_LIMIT) as usize);
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Extract the single `entry` below `dest_dir` and return its path.
    ///
    /// Intermediate directories are created as needed. The entry name is
    /// sanitized first, so an entry cannot be written outside `dest_dir`.
    pub fn extract(&mut self, entry: &str, dest_dir: &Path) -> Result<PathBuf> {
        let target = sanitize_entry_path(entry, dest_dir)?;
        let mut file = self.inner.by_name(entry).map_err(|e| zip_error(&self.path, entry, e))?;

        if file.is_dir() {
            fs::create_dir_all(&target).map_err(|source| Error::DirectoryCreationFailed {
                path: target.clone(),
                source,
            })?;
            return Ok(target);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = File::create(&target).map_err(|source| Error::ExtractionFailed {
            path: target.clone(),
            source,
        })?;
        io::copy(&mut file, &mut out).map_err(|source| Error::ExtractionFailed {
            path: target.clone(),
            source,
        })?;

        tracing::trace!(archive = %self.path.display(), entry, target = %target.display(), "extracted entry");
        Ok(target)
    }

    /// Extract `entry` into a newly created temporary directory.
    ///
    /// The directory is not removed afterwards; it belongs to the caller.
    pub fn extract_to_temp(&mut self, entry: &str) -> Result<PathBuf> {
        self.extract_to_temp_in(entry, &std::env::temp_dir())
    }

    /// Like [`extract_to_temp`](Self::extract_to_temp), creating the temporary
    /// directory inside `parent`. Nothing is left behind if extraction fails.
    pub fn extract_to_temp_in(&mut self, entry: &str, parent: &Path) -> Result<PathBuf> {
        let temp_dir = tempfile::Builder::new()
            .prefix("pkgres-")
            .tempdir_in(parent)
            .map_err(|source| Error::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        let extracted = self.extract(entry, temp_dir.path())?;
        let _ = temp_dir.keep();
        Ok(extracted)
    }
}

fn zip_error(archive: &Path, entry: &str, err: ZipError) -> Error {
    match err {
        ZipError::FileNotFound => Error::EntryNotFound {
            archive: archive.to_path_buf(),
            entry: entry.to_string(),
        },
        ZipError::Io(e) => Error::Io(e),
        source => Error::Corrupted {
            path: archive.to_path_buf(),
            source,
        },
    }
}
