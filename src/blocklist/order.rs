//! Canonical domain names and the reversed-lexical order.
//!
//! Domains share suffixes, not prefixes: `ads.example.com` and `example.com`
//! agree from the back. Comparing strings from their last byte towards their
//! first sorts every domain before the subdomains that extend it, which is
//! what lets [`SuffixMatcher`](super::matcher::SuffixMatcher) answer
//! "equal to, or a subdomain of" with a single binary search.

use std::borrow::Cow;
use std::cmp::Ordering;

/// Separator between labels of a domain name.
pub const DELIMITER: char = '.';

/// Returns the canonical form of a domain name.
///
/// The canonical form is ASCII-lowercased and fully qualified (ends with
/// [`DELIMITER`]). Canonicalization never fails: anything that is not a
/// well-formed name is kept as an opaque string. The empty string stays empty
/// so that it can only ever match itself.
///
/// Names that are already canonical are borrowed.
///
/// ```
/// use nope::blocklist::order::canonicalize;
///
/// assert_eq!(canonicalize("Ads.Example.COM"), "ads.example.com.");
/// assert_eq!(canonicalize("example.com."), "example.com.");
/// assert_eq!(canonicalize(""), "");
/// ```
#[must_use]
pub fn canonicalize(name: &str) -> Cow<'_, str> {
    let qualified = name.is_empty() || name.ends_with(DELIMITER);
    let lowercase = !name.bytes().any(|b| b.is_ascii_uppercase());
    if qualified && lowercase {
        return Cow::Borrowed(name);
    }

    let mut canonical = String::with_capacity(name.len() + 1);
    canonical.push_str(name);
    canonical.make_ascii_lowercase();
    if !qualified {
        canonical.push(DELIMITER);
    }
    Cow::Owned(canonical)
}

/// Weight of a byte in the reversed order.
///
/// The label delimiter weighs less than every other byte, so that all
/// subdomains of a name sort directly after it, before any sibling whose label
/// ends in a byte like `-` that is smaller than `.` in plain byte order.
#[inline]
fn weight(byte: u8) -> u16 {
    if byte == DELIMITER as u8 {
        0
    } else {
        u16::from(byte) + 1
    }
}

/// Compares two strings byte-wise, starting from their last byte and working
/// towards the first.
///
/// The empty string sorts first. When one string runs out before a difference
/// is found, the shorter one sorts first. Apart from the label delimiter,
/// which weighs less than any other byte, bytes compare by value.
///
/// ```
/// use std::cmp::Ordering;
/// use nope::blocklist::order::reversed_cmp;
///
/// assert_eq!(reversed_cmp("edcba", "fdcba"), Ordering::Less);
/// assert_eq!(reversed_cmp("ba", "a"), Ordering::Greater);
/// assert_eq!(reversed_cmp("", "a"), Ordering::Less);
/// ```
#[must_use]
pub fn reversed_cmp(a: &str, b: &str) -> Ordering {
    let a = a.bytes().rev().map(weight);
    let b = b.bytes().rev().map(weight);
    a.cmp(b)
}

/// Returns true if `host` equals `ancestor` or is a subdomain of it.
///
/// Both names are expected in canonical form. The empty string is an ancestor
/// of nothing but itself.
#[must_use]
pub fn is_subdomain_or_equal(ancestor: &str, host: &str) -> bool {
    if ancestor.is_empty() {
        return host.is_empty();
    }
    match host.strip_suffix(ancestor) {
        Some("") => true,
        Some(rest) => rest.ends_with(DELIMITER),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cmp(a: &str, b: &str, want: Ordering) {
        assert_eq!(reversed_cmp(a, b), want, "reversed_cmp({a:?}, {b:?})");
        assert_eq!(
            reversed_cmp(b, a),
            want.reverse(),
            "reversed_cmp({b:?}, {a:?})"
        );
    }

    #[test]
    fn should_treat_empty_strings_as_equal() {
        assert_cmp("", "", Ordering::Equal);
    }

    #[test]
    fn should_sort_empty_string_first() {
        assert_cmp("", "not empty", Ordering::Less);
        assert_cmp("", ".", Ordering::Less);
    }

    #[test]
    fn should_compare_single_characters_as_usual() {
        assert_cmp("a", "b", Ordering::Less);
        assert_cmp("b", "c", Ordering::Less);
        assert_cmp("a", "c", Ordering::Less);
        assert_cmp("a", "a", Ordering::Equal);
    }

    #[test]
    fn should_order_by_first_difference_from_the_back() {
        assert_cmp("edcba", "fdcba", Ordering::Less);
        assert_cmp("abcde", "bbcdd", Ordering::Greater);
    }

    #[test]
    fn should_sort_shorter_string_first_when_suffixes_agree() {
        assert_cmp("ba", "a", Ordering::Greater);
        assert_cmp("subdomain.example.com", "example.com", Ordering::Greater);
    }

    #[test]
    fn should_sort_delimiter_before_other_bytes() {
        // '-' is smaller than '.' as a byte, but subdomains must stay next to
        // their parent.
        assert_cmp("b.a.com.", "x-a.com.", Ordering::Less);
        assert_cmp("a.com.", "b.a.com.", Ordering::Less);
    }

    const SAMPLE: &[&str] = &[
        "",
        ".",
        "\u{0}",
        "\u{0}.",
        ".\u{0}",
        "a",
        "ba",
        "a.com.",
        "b.a.com.",
        "x-a.com.",
        "a-.com.",
        "a..com.",
        "a\u{0}.com.",
        "com.",
        "com\u{7f}",
        "edcba",
        "fdcba",
    ];

    #[test]
    fn should_be_antisymmetric_over_a_sample() {
        for a in SAMPLE {
            for b in SAMPLE {
                assert_eq!(
                    reversed_cmp(a, b),
                    reversed_cmp(b, a).reverse(),
                    "{a:?} vs {b:?}"
                );
                assert_eq!(reversed_cmp(a, b) == Ordering::Equal, a == b);
            }
        }
    }

    #[test]
    fn should_be_transitive_over_a_sample() {
        for a in SAMPLE {
            for b in SAMPLE {
                for c in SAMPLE {
                    if reversed_cmp(a, b).is_le() && reversed_cmp(b, c).is_le() {
                        assert!(reversed_cmp(a, c).is_le(), "{a:?} <= {b:?} <= {c:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn should_canonicalize_case_and_trailing_delimiter() {
        assert_eq!(canonicalize("Example.COM"), "example.com.");
        assert_eq!(canonicalize("example.com"), "example.com.");
        assert_eq!(canonicalize("EXAMPLE.COM."), "example.com.");
    }

    #[test]
    fn should_borrow_already_canonical_names() {
        assert!(matches!(canonicalize("example.com."), Cow::Borrowed(_)));
        assert!(matches!(canonicalize(""), Cow::Borrowed(_)));
        assert!(matches!(canonicalize("example.com"), Cow::Owned(_)));
    }

    #[test]
    fn should_keep_malformed_names_as_opaque_strings() {
        assert_eq!(canonicalize("not a domain!"), "not a domain!.");
        assert_eq!(canonicalize("."), ".");
    }

    #[test]
    fn should_detect_ancestors() {
        assert!(is_subdomain_or_equal("example.com.", "example.com."));
        assert!(is_subdomain_or_equal("example.com.", "ads.example.com."));
        assert!(is_subdomain_or_equal("example.com.", "a.b.example.com."));
        assert!(!is_subdomain_or_equal("example.com.", "badexample.com."));
        assert!(!is_subdomain_or_equal("ads.example.com.", "example.com."));
    }

    #[test]
    fn should_not_treat_empty_string_as_ancestor() {
        assert!(!is_subdomain_or_equal("", "example.com."));
        assert!(is_subdomain_or_equal("", ""));
    }
}
