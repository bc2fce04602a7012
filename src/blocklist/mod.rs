//! Blocklists and the formats they are loaded from.
//!
//! A [`Blocker`] answers whether a host should be blocked. Two kinds exist:
//!
//! - [`StaticList`]: built once from literal names or a local file, never changes.
//! - [`DynamicList`]: bootstrapped from a local file, then periodically replaced
//!   by a fresh copy fetched from a remote `AdBlock`-style rule list.
//!
//! Both delegate matching to a [`SuffixMatcher`], which blocks a host if it
//! equals a listed domain or is a subdomain of one.
//!
//! # Example
//!
//! ```
//! use nope::blocklist::{Blocker, StaticList};
//!
//! let list = StaticList::new("ads", ["ads.example.com", "tracker.net"]);
//! assert!(list.block("pixel.ads.example.com."));
//! assert!(!list.block("example.com."));
//! ```

mod adblock;
mod domains;
pub mod dynamic;
pub mod loader;
pub mod matcher;
pub mod order;
pub mod remote;
pub mod static_list;

use std::io::BufRead;

pub use adblock::AdBlockParser;
pub use domains::DomainListParser;
pub use dynamic::{DynamicList, RefreshHandle, RefreshSettings};
pub use matcher::SuffixMatcher;
pub use static_list::StaticList;

/// Something that blocks hosts.
///
/// Implementations must be cheap to query from many tasks at once.
pub trait Blocker: Send + Sync {
    /// Identifier of the list, used in logs and reported on a match.
    fn name(&self) -> &str;

    /// Returns true if `host` should be blocked.
    ///
    /// `host` is expected to be a fully qualified name; it is canonicalized
    /// before matching, so case and a missing trailing dot don't matter.
    fn block(&self, host: &str) -> bool;

    /// Returns true if the blocker can answer [`block`](Self::block) calls.
    fn ready(&self) -> bool;
}

/// Error type for blocklist parsing operations.
///
/// Lines that don't follow the format are skipped rather than reported, so
/// reading is the only thing that can fail.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Trait for blocklist parsers.
pub trait BlocklistParser: Send + Sync {
    /// Parse blocklist content and return the domains it lists.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if reading fails.
    fn parse(&self, reader: &mut dyn BufRead) -> Result<Vec<String>, ParseError>;
}

/// Formats a blocklist can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// One domain per line, `#` comments.
    Domains,
    /// `||domain^` rules; everything else is ignored.
    Adblock,
}

/// Returns a boxed parser for the given format.
#[must_use]
pub fn parser_for_format(format: ListFormat) -> Box<dyn BlocklistParser> {
    match format {
        ListFormat::Domains => Box::new(DomainListParser),
        ListFormat::Adblock => Box::new(AdBlockParser),
    }
}

/// Reads the next line into `buf`, without its terminator.
///
/// Returns `false` once the reader is exhausted. Bytes that aren't valid UTF-8
/// are replaced, which at worst turns a rule into a line that doesn't match.
fn next_line(reader: &mut dyn BufRead, raw: &mut Vec<u8>, buf: &mut String) -> std::io::Result<bool> {
    raw.clear();
    buf.clear();
    if reader.read_until(b'\n', raw)? == 0 {
        return Ok(false);
    }
    if raw.last() == Some(&b'\n') {
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
    }
    buf.push_str(&String::from_utf8_lossy(raw));
    Ok(true)
}
