use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};

use crate::error::{Error, Result};

/// How a resource lookup should behave and what it should return.
#[derive(Clone, Copy, Debug)]
pub struct LookupOptions {
    get_path:      bool,
    recursive:     bool,
    return_binary: bool,
    encoding:      &'static Encoding,
}

impl Default for LookupOptions {
    fn default() -> Self { Self::new() }
}

impl LookupOptions {
    pub fn new() -> Self {
        Self {
            get_path:      false,
            recursive:     false,
            return_binary: false,
            encoding:      UTF_8,
        }
    }

    /// Return a filesystem path instead of the content.
    ///
    /// Archive-resident resources are extracted to a new temporary directory
    /// that the caller then owns.
    pub fn get_path(mut self, get_path: bool) -> Self {
        self.get_path = get_path;
        self
    }

    /// Match by suffix instead of by exact relative path.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Skip text decoding and return raw bytes.
    pub fn return_binary(mut self, return_binary: bool) -> Self {
        self.return_binary = return_binary;
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Select the text encoding by WHATWG label (`utf-8`, `latin1`, `utf-16le`, ...).
    pub fn encoding_label(self, label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::UnknownEncoding(label.to_string()))?;
        Ok(self.encoding(encoding))
    }

    pub fn wants_path(&self) -> bool { self.get_path }

    pub fn is_recursive(&self) -> bool { self.recursive }

    pub fn wants_binary(&self) -> bool { self.return_binary }

    pub fn get_encoding(&self) -> &'static Encoding { self.encoding }

    /// Turn raw resource bytes into the value these options ask for.
    ///
    /// Decoding is strict: bytes that are malformed for the selected encoding
    /// are an [`Error::Decode`], not replacement characters.
    pub(crate) fn decode(&self, bytes: Vec<u8>, name: impl FnOnce() -> String) -> Result<Resolved> {
        if self.return_binary {
            return Ok(Resolved::Binary(bytes));
        }

        match self.encoding.decode_without_bom_handling_and_without_replacement(&bytes) {
            Some(text) => Ok(Resolved::Text(text.into_owned())),
            None => Err(Error::Decode {
                name:     name(),
                encoding: self.encoding.name(),
            }),
        }
    }
}

/// A found resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    Text(String),
    Binary(Vec<u8>),
    Path(PathBuf),
}

impl Resolved {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(text) => Some(text.as_bytes()),
            Self::Binary(bytes) => Some(bytes),
            Self::Path(_) => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }
}
