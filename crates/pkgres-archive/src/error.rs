use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive not found: '{0}'")]
    ArchiveNotFound(PathBuf),

    #[error("entry '{entry}' not found in '{archive}'")]
    EntryNotFound { archive: PathBuf, entry: String },

    #[error("archive is corrupted: '{path}': {source}")]
    Corrupted {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: String, resolved: PathBuf },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Expected absences: the archive or the entry simply is not there.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::ArchiveNotFound(_) | Self::EntryNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
