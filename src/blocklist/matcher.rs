//! Suffix matching over a sorted list of domains.

use super::order::{is_subdomain_or_equal, reversed_cmp};

/// An immutable set of canonical domains answering "is this host one of them,
/// or a subdomain of one of them?" in logarithmic time.
///
/// Entries are kept sorted by [`reversed_cmp`]. Entries that are subdomains of
/// another entry are dropped at construction since the parent already blocks
/// them. With both properties, the only candidate ancestor of a host is the
/// entry sorting immediately before the host's insertion point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixMatcher {
    entries: Vec<String>,
}

impl SuffixMatcher {
    /// Build a matcher from canonical domain names.
    ///
    /// Duplicates are harmless and collapse into a single entry.
    #[must_use]
    pub fn new(mut entries: Vec<String>) -> Self {
        entries.sort_unstable_by(|a, b| reversed_cmp(a, b));

        // Subdomains sort directly after their parent, so comparing with the
        // last kept entry is enough to find every redundant one.
        let mut kept: Vec<String> = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(last) = kept.last()
                && is_subdomain_or_equal(last, &entry)
            {
                continue;
            }
            kept.push(entry);
        }
        kept.shrink_to_fit();

        Self { entries: kept }
    }

    /// Returns true if `host` equals an entry or is a subdomain of one.
    ///
    /// `host` must be canonical.
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        match self
            .entries
            .binary_search_by(|entry| reversed_cmp(entry, host))
        {
            Ok(_) => true,
            // Nothing sorts before the host, so nothing can be its parent.
            Err(0) => false,
            Err(index) => is_subdomain_or_equal(&self.entries[index - 1], host),
        }
    }

    /// Entries in matching order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of distinct, non-redundant entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
