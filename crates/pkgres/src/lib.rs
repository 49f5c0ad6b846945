//! Package resource resolution.
//!
//! A package's files live in up to three places, searched in this order:
//!
//! 1. `<unpacked root>/<package>/...` loose files
//! 2. `<installed archive root>/<package>.<ext>` zip archive
//! 3. `<system archive root>/<package>.<ext>` zip archive shipped with the host
//!
//! Single-resource lookups return the first hit. Package and file listings are
//! the union of all three. Nothing is cached.
//!
//! # Example
//!
//! ```no_run
//! use pkgres::{LookupOptions, PackageResources, Roots, StaticHost};
//!
//! let roots = Roots::new("/data/Packages", "/data/Installed Packages", "/opt/editor/Packages");
//! let resources = PackageResources::new(StaticHost::new(roots));
//!
//! let keymap = resources.get_resource("Default", "Default.sublime-keymap", &LookupOptions::new())?;
//! let packages = resources.list_packages(true)?;
//! # Ok::<(), pkgres::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod options;
pub mod resolver;
pub mod source;

mod files;
mod packages;
mod walk;

pub use config::Settings;
pub use error::{Error, Result};
pub use host::{Capabilities, Host, NativeLoader, Roots, StaticHost};
pub use options::{LookupOptions, Resolved};
pub use pkgres_path::{CanonicalPath, ResourceName, canonicalize};
pub use resolver::{Hit, Resolver};
pub use source::{ArchiveSource, DirectorySource, ResourceSource, Tier};

use pkgres_path::{is_package_name, split_package_and_resource};

/// Resource access for one [`Host`].
pub struct PackageResources<H> {
    host: H,
}

impl PackageResources<StaticHost> {
    pub fn from_settings(settings: Settings) -> Result<Self> {
        Ok(Self::new(settings.into_host()?))
    }
}

impl<H: Host> PackageResources<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// A resolver over the tiers the host supports, built from the current roots.
    pub fn resolver(&self) -> Resolver {
        Resolver::for_host(&self.host)
    }

    /// Content or path of `resource` in `package`, or `None` if it does not exist.
    ///
    /// On hosts with a native loader, plain content lookups go through the
    /// loader and any loader failure is a miss. Path and recursive lookups
    /// always use the tiers.
    pub fn get_resource(&self, package: &str, resource: &str, options: &LookupOptions) -> Result<Option<Resolved>> {
        if let Some(loader) = self.delegate(options) {
            if !is_package_name(package) {
                return Ok(None);
            }
            let Some(resource) = resolver::package_relative(resource) else {
                return Ok(None);
            };

            let virtual_path = format!("Package/{package}/{resource}");
            return match loader.load_resource(&virtual_path) {
                Ok(bytes) => {
                    tracing::debug!(%virtual_path, "resolved resource through native loader");
                    options.decode(bytes, || virtual_path.clone()).map(Some)
                }
                Err(e) => {
                    tracing::trace!(%virtual_path, error = %e, "native loader miss");
                    Ok(None)
                }
            };
        }

        self.resolver().resolve(package, resource, options)
    }

    fn delegate(&self, options: &LookupOptions) -> Option<&dyn NativeLoader> {
        if options.wants_path() || options.is_recursive() || !self.host.capabilities().native_loader {
            return None;
        }
        self.host.native_loader()
    }

    /// Sorted names of all known packages, without the host's ignored ones if
    /// `filter_ignored` is set.
    pub fn list_packages(&self, filter_ignored: bool) -> Result<Vec<String>> {
        let ignored = if filter_ignored {
            self.host.ignored_packages()
        } else {
            Vec::new()
        };
        self.resolver().list_packages(&ignored)
    }

    /// Sorted canonical relative paths of every file in `package`.
    pub fn list_package_files(&self, package: &str, ignored_dirs: &[&str]) -> Result<Vec<String>> {
        self.resolver().list_package_files(package, ignored_dirs)
    }

    /// The package and resource `path` refers to, for a `Packages/<package>/...`
    /// identifier or an absolute path below one of the host's roots.
    pub fn package_and_resource(&self, path: impl AsRef<str>) -> Option<ResourceName> {
        split_package_and_resource(path, &self.host.roots().canonical(), self.host.archive_extension())
    }
}
