//! Domain list format parser.
//!
//! Parses simple blocklist files with one domain per line.
//! Comments start with `#` and are ignored.

use std::io::BufRead;

use super::{BlocklistParser, ParseError, next_line};

/// Parser for simple domain list format.
///
/// # Format
///
/// - One domain per line
/// - Comments start with `#`
/// - Empty lines are ignored
/// - Whitespace is trimmed
///
/// ```text
/// # This is a comment
/// example.com
/// ads.example.org
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainListParser;

impl BlocklistParser for DomainListParser {
    fn parse(&self, reader: &mut dyn BufRead) -> Result<Vec<String>, ParseError> {
        let mut domains = Vec::new();
        let mut raw = Vec::new();
        let mut line = String::new();

        while next_line(reader, &mut raw, &mut line)? {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            domains.push(trimmed.to_string());
        }

        Ok(domains)
    }
}
