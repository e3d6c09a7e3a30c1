//! False-positive guardrails for PII candidates.

use std::collections::BTreeMap;

const ASCENDING_DIGITS: &str = "0123456789";
const DESCENDING_DIGITS: &str = "9876543210";

/// Digit runs this long or shorter are never considered noise.
const NOISE_MIN_DIGITS: usize = 4;

/// Returns true for placeholder-looking values.
///
/// Noise is a digit sequence (other characters ignored) longer than four
/// digits that is either a single repeated digit (`000000`) or a straight
/// ascending/descending run (`123456789`, `98765`).
pub fn is_noisy(value: &str) -> bool {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= NOISE_MIN_DIGITS {
        return false;
    }

    let first = digits.as_bytes()[0];
    if digits.bytes().all(|b| b == first) {
        return true;
    }

    ASCENDING_DIGITS.contains(digits.as_str()) || DESCENDING_DIGITS.contains(digits.as_str())
}

/// Luhn checksum over every digit in `value`.
///
/// Returns false when the value holds no digits.
pub fn luhn_check(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.is_empty() {
        return false;
    }

    let checksum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    checksum % 10 == 0
}

/// Shannon entropy of the character distribution, in bits.
pub fn shannon_entropy(value: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in value.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    -counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Returns true if `value` starts with a `YYYY-MM-DD` shape.
pub fn looks_like_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// Returns true for non-empty, all-digit strings.
pub fn is_bare_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
