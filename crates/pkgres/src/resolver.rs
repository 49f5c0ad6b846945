//! Tiered single-resource lookup.

use pkgres_path::{canonicalize, is_package_name};

use crate::error::Result;
use crate::host::{Host, Roots};
use crate::options::{LookupOptions, Resolved};
use crate::source::{self, ResourceSource, Tier};

/// A resolved resource and the tier it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    pub tier: Tier,
    pub value: Resolved,
}

/// Resolves resources against an ordered chain of [`ResourceSource`]s.
///
/// Nothing is cached: every call re-reads the filesystem and reopens archives.
pub struct Resolver {
    sources: Vec<Box<dyn ResourceSource>>,
}

impl Resolver {
    /// Unpacked directory first, then installed archives, then system archives.
    pub fn new(roots: &Roots, archive_extension: &str) -> Self {
        Self {
            sources: source::tiered(
                &roots.unpacked,
                Some((&roots.installed_archives, &roots.system_archives)),
                archive_extension,
            ),
        }
    }

    /// Only the unpacked directory tier.
    pub fn unpacked_only(roots: &Roots) -> Self {
        Self {
            sources: source::tiered(&roots.unpacked, None, ""),
        }
    }

    /// The tiers `host` supports.
    pub fn for_host(host: &impl Host) -> Self {
        if host.capabilities().archive_tiers {
            Self::new(host.roots(), host.archive_extension())
        } else {
            Self::unpacked_only(host.roots())
        }
    }

    pub fn from_sources(sources: Vec<Box<dyn ResourceSource>>) -> Self {
        Self { sources }
    }

    pub fn tiers(&self) -> Vec<Tier> {
        self.sources.iter().map(|source| source.tier()).collect()
    }

    pub(crate) fn sources(&self) -> &[Box<dyn ResourceSource>] {
        &self.sources
    }

    /// Content or path of `resource` in `package`, or `None` if no tier has it.
    pub fn resolve(&self, package: &str, resource: &str, options: &LookupOptions) -> Result<Option<Resolved>> {
        Ok(self.locate(package, resource, options)?.map(|hit| hit.value))
    }

    /// Like [`resolve`](Self::resolve), also reporting the tier that answered.
    ///
    /// Tiers are tried strictly in order and the first hit wins; tiers are never
    /// merged for a single resource. A package that is not a single name, or a
    /// resource path that is absolute or climbs out of the package, is a miss.
    pub fn locate(&self, package: &str, resource: &str, options: &LookupOptions) -> Result<Option<Hit>> {
        if !is_package_name(package) {
            tracing::trace!(package, "not a package name");
            return Ok(None);
        }

        let Some(resource) = package_relative(resource) else {
            tracing::trace!(package, resource, "resource path leaves the package");
            return Ok(None);
        };
        let resource = resource.as_str();

        for source in &self.sources {
            let tier = source.tier();
            match source.lookup(package, resource, options)? {
                Some(value) => {
                    tracing::debug!(package, resource, %tier, "resolved resource");
                    return Ok(Some(Hit { tier, value }));
                }
                None => tracing::trace!(package, resource, %tier, "tier miss"),
            }
        }

        Ok(None)
    }
}

/// Canonical form of `resource` if it names something inside a package.
pub(crate) fn package_relative(resource: &str) -> Option<String> {
    let resource = canonicalize(resource).into_string();
    let escapes = resource == "." || resource == ".." || resource.starts_with('/') || resource.starts_with("../");
    (!escapes).then_some(resource)
}
