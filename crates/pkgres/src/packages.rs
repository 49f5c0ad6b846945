//! Package enumeration across all tiers.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::resolver::Resolver;

impl Resolver {
    /// Sorted, de-duplicated names of every package any tier knows, minus `ignored`.
    pub fn list_packages(&self, ignored: &[String]) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();
        for source in self.sources() {
            names.extend(source.packages()?);
        }

        names.retain(|name| !ignored.contains(name));
        tracing::trace!(count = names.len(), "listed packages");
        Ok(names.into_iter().collect())
    }
}
