//! The environment the resolver runs in.
//!
//! The host supplies the three package roots, its build number, the list of
//! ignored packages and, on newer builds, a native resource loader. The
//! resolver itself never asks which host it runs under; [`Capabilities`]
//! decides which tiers exist.

use std::io;
use std::path::{Path, PathBuf};

use pkgres_path::CanonicalPath;

/// Archive extension used when the host does not name one.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "sublime-package";

/// Name of the archive directory next to the host executable.
pub const SYSTEM_PACKAGES_DIR: &str = "Packages";

/// First host build that installs packages as archives.
pub const ARCHIVE_TIERS_SINCE: u32 = 3006;

/// Last host build without a native resource loader.
pub const NATIVE_LOADER_AFTER: u32 = 3013;

/// The three package locations, in lookup priority order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roots {
    /// Directory of unpacked packages, one sub-directory per package.
    pub unpacked: PathBuf,
    /// Directory of user-installed `<package>.<ext>` archives.
    pub installed_archives: PathBuf,
    /// Directory of archives shipped with the host.
    pub system_archives: PathBuf,
}

impl Roots {
    pub fn new(
        unpacked: impl Into<PathBuf>,
        installed_archives: impl Into<PathBuf>,
        system_archives: impl Into<PathBuf>,
    ) -> Self {
        Self {
            unpacked: unpacked.into(),
            installed_archives: installed_archives.into(),
            system_archives: system_archives.into(),
        }
    }

    /// The system archive root for a host executable at `executable`.
    pub fn system_archives_beside(executable: &Path) -> PathBuf {
        executable
            .parent()
            .unwrap_or(Path::new(""))
            .join(SYSTEM_PACKAGES_DIR)
    }

    /// All roots in canonical form, in priority order.
    pub fn canonical(&self) -> [CanonicalPath; 3] {
        [
            CanonicalPath::from_path(&self.unpacked),
            CanonicalPath::from_path(&self.installed_archives),
            CanonicalPath::from_path(&self.system_archives),
        ]
    }
}

/// What a host build can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub archive_tiers: bool,
    pub native_loader: bool,
}

impl Capabilities {
    pub fn for_version(version: u32) -> Self {
        Self {
            archive_tiers: version >= ARCHIVE_TIERS_SINCE,
            native_loader: version > NATIVE_LOADER_AFTER,
        }
    }
}

/// A host-provided loader addressed by virtual path.
pub trait NativeLoader {
    fn load_resource(&self, virtual_path: &str) -> io::Result<Vec<u8>>;
}

impl<F> NativeLoader for F
where
    F: Fn(&str) -> io::Result<Vec<u8>>,
{
    fn load_resource(&self, virtual_path: &str) -> io::Result<Vec<u8>> {
        self(virtual_path)
    }
}

/// The environment collaborator.
pub trait Host {
    fn roots(&self) -> &Roots;

    fn version(&self) -> u32;

    fn ignored_packages(&self) -> Vec<String>;

    fn archive_extension(&self) -> &str {
        DEFAULT_ARCHIVE_EXTENSION
    }

    fn native_loader(&self) -> Option<&dyn NativeLoader> {
        None
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::for_version(self.version())
    }
}

/// A [`Host`] with fixed values, usually built from [`Settings`](crate::Settings).
pub struct StaticHost {
    roots: Roots,
    version: u32,
    archive_extension: String,
    ignored_packages: Vec<String>,
    loader: Option<Box<dyn NativeLoader>>,
}

impl StaticHost {
    /// A host with every capability and no native loader.
    pub fn new(roots: Roots) -> Self {
        Self {
            roots,
            version: u32::MAX,
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
            ignored_packages: Vec::new(),
            loader: None,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into();
        self
    }

    pub fn with_ignored_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_native_loader(mut self, loader: impl NativeLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }
}

impl Host for StaticHost {
    fn roots(&self) -> &Roots {
        &self.roots
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn ignored_packages(&self) -> Vec<String> {
        self.ignored_packages.clone()
    }

    fn archive_extension(&self) -> &str {
        &self.archive_extension
    }

    fn native_loader(&self) -> Option<&dyn NativeLoader> {
        self.loader.as_deref()
    }
}
