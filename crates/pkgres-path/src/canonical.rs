//! Canonical path form.
//!
//! Every path handled by the resolver is reduced to one string shape before it
//! is compared or split:
//!
//! - backslashes become forward slashes
//! - a drive prefix `C:` becomes a leading segment `/C`
//! - empty and `.` segments are dropped, `..` pops the previous segment
//! - no trailing separator (except for the bare root `/`)
//!
//! The transform is idempotent, so a canonical path can be fed back in freely.

use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

static DRIVE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-zA-Z]):").unwrap());

/// A normalized, forward-slash path string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Canonicalize a filesystem path, lossily converting non UTF-8 parts.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        canonicalize(path.as_ref().to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Anchored at a root marker (`/`, or a drive rewritten to `/C`).
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    /// The part of `self` below `root`, without the joining separator.
    ///
    /// Matching is per segment: `/a/bc` is not below `/a/b`. Returns `None` when
    /// `self` is not strictly below `root`.
    pub fn strip_root(&self, root: &CanonicalPath) -> Option<&str> {
        let rest = self.0.strip_prefix(root.as_str())?;
        let rest = if root.0.ends_with('/') {
            rest
        } else {
            rest.strip_prefix('/')?
        };
        (!rest.is_empty()).then_some(rest)
    }

    /// Append a relative path and re-canonicalize.
    pub fn join(&self, relative: &str) -> CanonicalPath {
        canonicalize(format!("{}/{}", self.0, relative))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CanonicalPath> for String {
    fn from(path: CanonicalPath) -> Self {
        path.0
    }
}

/// Reduce `path` to its canonical form.
pub fn canonicalize(path: impl AsRef<str>) -> CanonicalPath {
    let slashed = path.as_ref().replace('\\', "/");
    if let Some(rooted) = rewrite_drive(&slashed) {
        return CanonicalPath(rooted);
    }

    // Normalizing can surface a drive-looking first segment (`./C:/x`).
    let normalized = normalize_segments(&slashed);
    CanonicalPath(rewrite_drive(&normalized).unwrap_or(normalized))
}

/// `C:<rest>` as `/C/<rest>`, with the drive acting as the root so that `..`
/// never climbs above it.
fn rewrite_drive(path: &str) -> Option<String> {
    let captures = DRIVE_PREFIX.captures(path)?;
    let drive = &captures[1];
    let rest = normalize_segments(&format!("/{}", &path[captures[0].len()..]));
    Some(match rest.as_str() {
        "/" => format!("/{drive}"),
        rest => format!("/{drive}{rest}"),
    })
}

fn normalize_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if !absolute => segments.push(".."),
                _ => {}
            },
            part => segments.push(part),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
