//! Common identifier set between two datasets.

use std::collections::BTreeSet;

/// Identifiers present in both inputs, deduplicated and sorted ascending.
///
/// The sort makes downstream filtering reproducible no matter how the
/// inputs were ordered.
///
/// # Example
/// ```
/// use recmatch::intersect_ids;
///
/// let common = intersect_ids(["c", "a", "b", "a"], ["b", "c", "d"]);
/// assert_eq!(common, vec!["b", "c"]);
/// ```
pub fn intersect_ids<A, B, S, T>(ids_a: A, ids_b: B) -> Vec<String>
where
    A: IntoIterator<Item = S>,
    B: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    let set_a: BTreeSet<String> = ids_a.into_iter().map(|s| s.as_ref().to_string()).collect();
    if set_a.is_empty() {
        return Vec::new();
    }
    let set_b: BTreeSet<String> = ids_b.into_iter().map(|s| s.as_ref().to_string()).collect();

    set_a.intersection(&set_b).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_deduplicated() {
        let common = intersect_ids(["P-004", "P-003", "P-003", "P-001"], ["P-006", "P-003", "P-004"]);
        assert_eq!(common, vec!["P-003", "P-004"]);
    }

    #[test]
    fn test_empty_inputs() {
        let empty: [&str; 0] = [];
        assert!(intersect_ids(empty, ["a"]).is_empty());
        assert!(intersect_ids(["a"], empty).is_empty());
    }

    #[test]
    fn test_disjoint() {
        assert!(intersect_ids(["a", "b"], ["c"]).is_empty());
    }

    #[test]
    fn test_accepts_owned_and_borrowed() {
        let owned = vec!["x".to_string(), "y".to_string()];
        let common = intersect_ids(&owned, ["y"]);
        assert_eq!(common, vec!["y"]);
    }
}
