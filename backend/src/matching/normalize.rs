//! Identifier normalization.
//!
//! Two sources rarely spell an identifier the same way (`"P-001"`,
//! `" p001 "`, `"P.001"`). Normalization folds those spellings into one
//! comparable form, and can additionally hash it so the matching key
//! carries no recoverable identifier.

use sha2::{Digest, Sha256};

/// Normalize a raw identifier.
///
/// Steps, in order:
/// 1. lowercase
/// 2. trim surrounding whitespace
/// 3. drop every character that is not an ASCII letter or digit
/// 4. if `hash` is set, replace the result with its SHA-256 digest as
///    64 lowercase hex characters
///
/// Never fails. An empty input yields `""`, or the digest of `""` when hashing.
///
/// # Example
/// ```
/// use recmatch::normalize_id;
///
/// assert_eq!(normalize_id("  P-001 ", false), "p001");
/// assert_eq!(normalize_id("P-001", true).len(), 64);
/// ```
pub fn normalize_id(raw: &str, hash: bool) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if hash {
        hex::encode(Sha256::digest(cleaned.as_bytes()))
    } else {
        cleaned
    }
}

/// Normalize a sequence of identifiers, preserving order.
pub fn normalize_ids<I, S>(raw_ids: I, hash: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw_ids
        .into_iter()
        .map(|raw| normalize_id(raw.as_ref(), hash))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_whitespace_punctuation_fold_together() {
        let variants = ["P-001", " p-001", "P.001 ", "p_0_0_1", "\tP 001\n"];
        for v in variants {
            assert_eq!(normalize_id(v, false), "p001", "variant {:?}", v);
        }
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        assert_eq!(normalize_id("Émile-42", false), "mile42");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_id("", false), "");
        assert_eq!(normalize_id("---", false), "");
        // SHA-256 of the empty string
        assert_eq!(
            normalize_id("", true),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_is_lowercase_hex_of_cleaned_value() {
        let hashed = normalize_id("P-003", true);
        assert_eq!(hashed.len(), 64);
        assert!(hashed.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hashed, normalize_id("p003", true));
        assert_ne!(hashed, normalize_id("p004", true));
    }

    #[test]
    fn test_normalize_ids_keeps_order() {
        let ids = normalize_ids(["B-2", "A-1", "B-2"], false);
        assert_eq!(ids, vec!["b2", "a1", "b2"]);
    }
}
