//! Address pattern matching
//!
//! Three forms, checked in this order after one leading sigil is stripped
//! from both sides:
//! - `customers:` matches every address starting with `customers`, so
//!   `@customers` and `@customersvip:1` match too
//! - `customers::available` matches `customers:<any>:available`, segment for segment
//! - anything else must equal the address exactly

use crate::semantic::strip_sigil;

pub fn matches_pattern(address: &str, pattern: &str) -> bool {
    let address = strip_sigil(address);
    let pattern = strip_sigil(pattern);

    if let Some(prefix) = pattern.strip_suffix(':') {
        return address.starts_with(prefix);
    }

    if pattern.contains("::") {
        let address_segments: Vec<&str> = address.split(':').collect();
        let pattern_segments: Vec<&str> = pattern.split(':').collect();
        if address_segments.len() != pattern_segments.len() {
            return false;
        }
        return pattern_segments
            .iter()
            .zip(&address_segments)
            .all(|(p, a)| p.is_empty() || p == a);
    }

    address == pattern
}
