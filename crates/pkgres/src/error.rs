use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Archive(#[from] pkgres_archive::Error),

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("'{name}' is not valid {encoding}")]
    Decode { name: String, encoding: &'static str },

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] figment::Error),

    #[error("cannot locate the host executable: {0}")]
    Executable(#[source] io::Error),
}
