//! Listing every file of one package.

use std::collections::BTreeSet;

use pkgres_path::{canonicalize, is_package_name};

use crate::error::Result;
use crate::resolver::Resolver;

impl Resolver {
    /// Sorted, de-duplicated canonical relative paths of `package` across all tiers.
    ///
    /// Directory subtrees named in `ignored_dirs` are pruned in the unpacked
    /// tier and filtered out of archive entry lists.
    pub fn list_package_files(&self, package: &str, ignored_dirs: &[&str]) -> Result<Vec<String>> {
        if !is_package_name(package) {
            return Ok(Vec::new());
        }

        let mut files = BTreeSet::new();
        for source in self.sources() {
            let found = source.files(package, ignored_dirs)?;
            tracing::trace!(package, tier = %source.tier(), count = found.len(), "listed package files");
            files.extend(found.iter().map(|file| canonicalize(file).into_string()));
        }

        Ok(files.into_iter().collect())
    }
}
