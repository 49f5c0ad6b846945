//! Path to `(package, resource)` splitting.
//!
//! Two input shapes are accepted:
//!
//! - relative identifiers such as `Packages/User/nested/a.py`
//! - absolute filesystem paths below one of the known package roots, where the
//!   first segment below the root is either a package directory or an archive
//!   named `<package>.<ext>`
//!
//! Anything else is a miss (`None`), never an error.

use std::fmt;

use crate::canonical::{CanonicalPath, canonicalize};

/// Leading segment of relative resource identifiers.
pub const PACKAGES_SEGMENT: &str = "Packages";

/// A package name plus an optional canonical resource path inside it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceName {
    pub package: String,
    pub resource: Option<String>,
}

impl ResourceName {
    pub fn new(package: impl Into<String>, resource: impl AsRef<str>) -> Self {
        Self {
            package: package.into(),
            resource: Some(canonicalize(resource).into_string()),
        }
    }

    pub fn package_only(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            resource: None,
        }
    }

    /// The `Packages/<package>/<resource>` identifier, the inverse of
    /// [`split_relative`].
    pub fn to_relative(&self) -> String {
        match &self.resource {
            Some(resource) => format!("{PACKAGES_SEGMENT}/{}/{resource}", self.package),
            None => format!("{PACKAGES_SEGMENT}/{}", self.package),
        }
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_relative())
    }
}

/// Split `path`, choosing the relative or absolute rule from its canonical form.
///
/// `roots` are checked in order and the first one that contains `path` wins.
pub fn split_package_and_resource(
    path: impl AsRef<str>,
    roots: &[CanonicalPath],
    archive_ext: &str,
) -> Option<ResourceName> {
    let path = canonicalize(path);
    if path.is_absolute() {
        split_absolute(&path, roots, archive_ext)
    } else {
        split_relative(&path, archive_ext)
    }
}

/// Split a relative identifier, with or without the leading `Packages/`.
pub fn split_relative(path: &CanonicalPath, archive_ext: &str) -> Option<ResourceName> {
    let rest = path.as_str();
    let rest = rest
        .strip_prefix(PACKAGES_SEGMENT)
        .and_then(|r| r.strip_prefix('/'))
        .unwrap_or(rest);
    split_first_segment(rest, archive_ext)
}

/// Split an absolute path against the first root that contains it.
pub fn split_absolute(
    path: &CanonicalPath,
    roots: &[CanonicalPath],
    archive_ext: &str,
) -> Option<ResourceName> {
    roots
        .iter()
        .find_map(|root| path.strip_root(root))
        .and_then(|rest| split_first_segment(rest, archive_ext))
}

/// Remove a trailing `.<archive_ext>` from `name`, if present.
pub fn strip_archive_ext<'a>(name: &'a str, archive_ext: &str) -> &'a str {
    name.strip_suffix(archive_ext)
        .and_then(|stem| stem.strip_suffix('.'))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(name)
}

/// Whether `name` can name a package: a single path segment that stays in
/// place when joined onto a root.
pub fn is_package_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    !(name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) || drive)
}

fn split_first_segment(rest: &str, archive_ext: &str) -> Option<ResourceName> {
    if rest.is_empty() || rest == "." || rest == ".." || rest.starts_with("../") {
        return None;
    }

    let (package, resource) = match rest.split_once('/') {
        Some((package, resource)) => (package, Some(resource)),
        None => (rest, None),
    };

    Some(ResourceName {
        package: strip_archive_ext(package, archive_ext).to_string(),
        resource: resource.map(str::to_string),
    })
}
