//! Lookup tiers.
//!
//! A [`ResourceSource`] is one place a package's files can live. The
//! [`Resolver`](crate::Resolver) chains sources in priority order: the first
//! source that finds a resource wins, while listings are the union of all
//! sources.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use pkgres_archive::Archive;
use pkgres_path::strip_archive_ext;

use crate::error::{Error, Result};
use crate::options::{LookupOptions, Resolved};
use crate::walk;

/// Where a resource was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Unpacked,
    InstalledArchive,
    SystemArchive,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpacked => write!(f, "unpacked"),
            Self::InstalledArchive => write!(f, "installed-archive"),
            Self::SystemArchive => write!(f, "system-archive"),
        }
    }
}

/// One lookup tier.
///
/// `resource` is always canonical and relative. Absence of the tier, the
/// package or the resource is `Ok(None)` / an empty list.
pub trait ResourceSource {
    fn tier(&self) -> Tier;

    fn lookup(&self, package: &str, resource: &str, options: &LookupOptions) -> Result<Option<Resolved>>;

    /// Package names visible in this tier.
    fn packages(&self) -> Result<Vec<String>>;

    /// Relative file paths of `package` in this tier, without ignored directories.
    fn files(&self, package: &str, ignored_dirs: &[&str]) -> Result<Vec<String>>;
}

/// Unpacked packages: `<root>/<package>/<resource>`.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn package_dir(&self, package: &str) -> PathBuf {
        self.root.join(package)
    }
}

impl ResourceSource for DirectorySource {
    fn tier(&self) -> Tier {
        Tier::Unpacked
    }

    fn lookup(&self, package: &str, resource: &str, options: &LookupOptions) -> Result<Option<Resolved>> {
        let package_dir = self.package_dir(package);
        if !package_dir.is_dir() {
            return Ok(None);
        }

        let found = if options.is_recursive() {
            let (subdir, file_name) = resource.rsplit_once('/').unwrap_or(("", resource));
            walk::find_file(&package_dir.join(subdir), file_name)
        } else {
            let path = package_dir.join(resource);
            path.is_file().then_some(path)
        };

        let Some(path) = found else {
            return Ok(None);
        };

        if options.wants_path() {
            return Ok(Some(Resolved::Path(path)));
        }

        let bytes = fs::read(&path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        options.decode(bytes, || path.display().to_string()).map(Some)
    }

    fn packages(&self) -> Result<Vec<String>> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Ok(Vec::new());
        };

        Ok(entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect())
    }

    fn files(&self, package: &str, ignored_dirs: &[&str]) -> Result<Vec<String>> {
        Ok(walk::relative_files(&self.package_dir(package), ignored_dirs))
    }
}

/// Archived packages: `<root>/<package>.<ext>`.
#[derive(Clone, Debug)]
pub struct ArchiveSource {
    tier: Tier,
    root: PathBuf,
    extension: String,
}

impl ArchiveSource {
    pub fn new(tier: Tier, root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            tier,
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn archive_path(&self, package: &str) -> PathBuf {
        self.root.join(format!("{package}.{}", self.extension))
    }

    /// Open the package's archive, or `None` if it does not exist.
    fn open(&self, package: &str) -> Result<Option<Archive>> {
        let path = self.archive_path(package);
        if !path.is_file() {
            return Ok(None);
        }
        match Archive::open(&path) {
            Ok(archive) => Ok(Some(archive)),
            Err(e) if e.is_miss() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl ResourceSource for ArchiveSource {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn lookup(&self, package: &str, resource: &str, options: &LookupOptions) -> Result<Option<Resolved>> {
        let Some(mut archive) = self.open(package)? else {
            return Ok(None);
        };

        let entry = if options.is_recursive() {
            archive.find_suffix(resource)
        } else {
            archive.contains(resource).then(|| resource.to_string())
        };

        let Some(entry) = entry else {
            return Ok(None);
        };

        if options.wants_path() {
            return absorb_miss(archive.extract_to_temp(&entry)).map(|path| path.map(Resolved::Path));
        }

        let Some(bytes) = absorb_miss(archive.read(&entry))? else {
            return Ok(None);
        };
        options
            .decode(bytes, || format!("{}:{entry}", archive.path().display()))
            .map(Some)
    }

    fn packages(&self) -> Result<Vec<String>> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Ok(Vec::new());
        };

        let suffix = format!(".{}", self.extension);
        Ok(entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(&suffix) && name.len() > suffix.len())
            .map(|name| strip_archive_ext(&name, &self.extension).to_string())
            .collect())
    }

    fn files(&self, package: &str, ignored_dirs: &[&str]) -> Result<Vec<String>> {
        let Some(archive) = self.open(package)? else {
            return Ok(Vec::new());
        };

        Ok(archive
            .file_entries()
            .into_iter()
            .filter(|entry| !under_ignored_dir(entry, ignored_dirs))
            .collect())
    }
}

/// Whether any directory segment of `entry` is one of `ignored_dirs`.
fn under_ignored_dir(entry: &str, ignored_dirs: &[&str]) -> bool {
    let mut segments: Vec<&str> = entry.split('/').collect();
    segments.pop();
    segments.iter().any(|segment| ignored_dirs.contains(segment))
}

fn absorb_miss<T>(result: pkgres_archive::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_miss() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Sources for the given roots, in priority order.
pub(crate) fn tiered(
    unpacked: &Path,
    archives: Option<(&Path, &Path)>,
    extension: &str,
) -> Vec<Box<dyn ResourceSource>> {
    let mut sources: Vec<Box<dyn ResourceSource>> = vec![Box::new(DirectorySource::new(unpacked))];
    if let Some((installed, system)) = archives {
        sources.push(Box::new(ArchiveSource::new(Tier::InstalledArchive, installed, extension)));
        sources.push(Box::new(ArchiveSource::new(Tier::SystemArchive, system, extension)));
    }
    sources
}
