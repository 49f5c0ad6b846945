//! Canonical path form and package/resource splitting.
//!
//! Forward lookup (`package` + `resource` to content) and reverse lookup
//! (path to `package` + `resource`) only agree if both sides compare paths in
//! the same shape. This crate owns that shape:
//!
//! - [`canonicalize`] reduces any path (Windows or POSIX, relative or absolute)
//!   to a forward-slash [`CanonicalPath`]
//! - [`split_package_and_resource`] turns a relative identifier or an absolute
//!   path below a known root into a [`ResourceName`]
//!
//! # Example
//!
//! ```
//! use pkgres_path::{canonicalize, split_package_and_resource, ResourceName};
//!
//! let roots = [canonicalize("C:\\Data\\Packages")];
//! let name = split_package_and_resource("C:\\Data\\Packages\\User\\a.py", &roots, "sublime-package");
//! assert_eq!(name, Some(ResourceName::new("User", "a.py")));
//! ```

pub use canonical::{CanonicalPath, canonicalize};
pub use split::{
    PACKAGES_SEGMENT, ResourceName, is_package_name, split_absolute, split_package_and_resource,
    split_relative, strip_archive_ext,
};

mod canonical;
mod split;
