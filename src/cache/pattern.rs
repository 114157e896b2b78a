//! Wildcard pattern translation.
//!
//! A wildcard key matches whole keys only; every character other than the
//! wildcard marker is literal.

use regex::Regex;

use crate::cache::WILDCARD;
use crate::error::Result;

/// Compiles a wildcard key into an anchored regex.
pub(crate) fn to_regex(wildcard: &str) -> Result<Regex> {
    let body = wildcard
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Ok(Regex::new(&format!("^{}$", body))?)
}

/// Escapes a wildcard key for Redis glob matching, keeping the marker.
pub(crate) fn to_glob(wildcard: &str) -> String {
    let mut glob = String::with_capacity(wildcard.len());
    for c in wildcard.chars() {
        if matches!(c, '?' | '[' | ']' | '\\') {
            glob.push('\\');
        }
        glob.push(c);
    }
    glob
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_matches_prefix() {
        let re = to_regex("asterisk*").unwrap();
        assert!(re.is_match("asterisk_1"));
        assert!(re.is_match("asterisk"));
        assert!(!re.is_match("x_asterisk_1"));
    }

    #[test]
    fn test_regex_escapes_metacharacters() {
        let re = to_regex("a.b(*)").unwrap();
        assert!(re.is_match("a.b(1)"));
        assert!(!re.is_match("axb(1)"));
    }

    #[test]
    fn test_glob_escapes() {
        assert_eq!(to_glob("user_*"), "user_*");
        assert_eq!(to_glob("a?[b]*"), "a\\?\\[b\\]*");
    }
}
