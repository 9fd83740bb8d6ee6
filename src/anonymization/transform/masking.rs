//! Masking transformer

use super::{CellInput, Transformer};
use regex::Regex;

const MASK: &str = "****";
const MASK_CHAR: char = '*';
const KEEP: usize = 2;

/// Interior masking with `*`
pub struct Masking;

impl Transformer for Masking {
    fn apply(&self, input: &CellInput<'_>) -> Result<String, String> {
        Ok(match input.mask_pattern {
            Some(pattern) => mask_matching(input.value, pattern),
            None => mask(input.value),
        })
    }
}

/// Masks a value, keeping two characters at each end when longer than four
///
/// ```
/// use veil::anonymization::transform::masking::mask;
///
/// assert_eq!(mask("1234"), "****");
/// assert_eq!(mask("jane.doe@example.com"), "ja****om");
/// ```
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 2 * KEEP {
        return MASK.to_string();
    }
    let head: String = chars[..KEEP].iter().collect();
    let tail: String = chars[chars.len() - KEEP..].iter().collect();
    format!("{head}{MASK}{tail}")
}

/// Replaces interior characters matching `pattern` one-for-one with `*`
pub fn mask_matching(value: &str, pattern: &Regex) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 2 * KEEP {
        return MASK.to_string();
    }
    let mut buf = [0u8; 4];
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let interior = i >= KEEP && i < chars.len() - KEEP;
            if interior && pattern.is_match(c.encode_utf8(&mut buf)) {
                MASK_CHAR
            } else {
                *c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("" ; "empty")]
    #[test_case("a" ; "one char")]
    #[test_case("abcd" ; "four chars")]
    fn test_short_values_fully_masked(value: &str) {
        assert_eq!(mask(value), "****");
    }

    #[test_case("abcde", "ab****de")]
    #[test_case("555-123-4567", "55****67")]
    #[test_case("Zoë Müller", "Zo****er")]
    fn test_long_values_keep_ends(value: &str, expected: &str) {
        assert_eq!(mask(value), expected);
    }

    #[test]
    fn test_custom_pattern_masks_digits_only() {
        let digits = Regex::new(r"\d").unwrap();
        assert_eq!(mask_matching("555-123-4567", &digits), "55*-***-**67");
        assert_eq!(mask_matching("abc", &digits), "****");
    }
}
