//! `AdBlock` rule-list parser.
//!
//! Only the plainest domain rule is understood: a line that starts with `||`
//! and ends with `^`. The domain is whatever sits between the two markers.

use std::io::BufRead;

use super::{BlocklistParser, ParseError, next_line};

const RULE_PREFIX: &str = "||";
const RULE_SUFFIX: &str = "^";

/// Parser for `AdBlock` domain rules.
///
/// # Format
///
/// ```text
/// ! Comment
/// ||ads.example.com^
/// ||tracker.example.com^$third-party
/// @@||allowed.example.com^
/// example.com##.ad-banner
/// ```
///
/// Only `ads.example.com` would be extracted from the above. Comments,
/// exceptions, cosmetic rules and rules with modifiers are not errors, they
/// are just not domain rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdBlockParser;

impl BlocklistParser for AdBlockParser {
    fn parse(&self, reader: &mut dyn BufRead) -> Result<Vec<String>, ParseError> {
        let mut domains = Vec::new();
        let mut raw = Vec::new();
        let mut line = String::new();

        while next_line(reader, &mut raw, &mut line)? {
            if let Some(domain) = parse_domain_rule(&line) {
                domains.push(domain.to_string());
            }
        }

        Ok(domains)
    }
}

/// Extract the domain from a `||domain^` rule.
fn parse_domain_rule(rule: &str) -> Option<&str> {
    rule.strip_prefix(RULE_PREFIX)?.strip_suffix(RULE_SUFFIX)
}
