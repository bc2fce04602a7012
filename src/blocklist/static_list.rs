//! Blocklists that never change once built.

use std::path::Path;

use super::loader::{FileLoader, LoadError};
use super::matcher::SuffixMatcher;
use super::order::canonicalize;
use super::{Blocker, ListFormat};

/// An immutable blocklist.
///
/// Built once from a set of names, always ready, and safe to share between
/// any number of readers without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticList {
    name: String,
    matcher: SuffixMatcher,
}

impl StaticList {
    /// Build a list from domain names.
    ///
    /// Every entry is canonicalized. Nothing is rejected: entries that aren't
    /// valid domain names are kept as opaque strings and only ever match
    /// themselves.
    pub fn new<I, S>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| canonicalize(entry.as_ref()).into_owned())
            .collect();

        Self {
            name: name.into(),
            matcher: SuffixMatcher::new(entries),
        }
    }

    /// Build a list from a file holding one domain per line.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be read.
    pub async fn from_file(name: impl Into<String>, path: &Path) -> Result<Self, LoadError> {
        let domains = FileLoader::load(path, ListFormat::Domains).await?;
        Ok(Self::new(name, domains))
    }

    /// Number of entries used for matching.
    ///
    /// Duplicates and subdomains of other entries are not counted.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matcher.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    /// Canonical entries, sorted in matching order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        self.matcher.entries()
    }
}

impl Blocker for StaticList {
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn block(&self, host: &str) -> bool {
        self.matcher.matches(&canonicalize(host))
    }

    fn ready(&self) -> bool {
        true
    }
}
