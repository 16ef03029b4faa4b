//! Cartesian product of two datasets.

use tracing::debug;

use crate::models::Record;

/// Pair every row of `a` with every row of `b`.
///
/// `a` is the outer loop, so the output is row-major on `a` and has exactly
/// `a.len() * b.len()` records. Field names are prefixed with `prefix_a` /
/// `prefix_b` to keep both sides apart; if two prefixed names still collide,
/// the `b` value wins.
pub fn cross_join(a: &[Record], b: &[Record], prefix_a: &str, prefix_b: &str) -> Vec<Record> {
    let mut result = Vec::with_capacity(a.len().saturating_mul(b.len()));

    for row_a in a {
        for row_b in b {
            let mut combined = Record::new();
            for (field, value) in row_a {
                combined.insert(format!("{}{}", prefix_a, field), value.clone());
            }
            for (field, value) in row_b {
                combined.insert(format!("{}{}", prefix_b, field), value.clone());
            }
            result.push(combined);
        }
    }

    debug!(left = a.len(), right = b.len(), output = result.len(), "cross join");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use crate::record;

    #[test]
    fn test_row_major_order_and_prefixes() {
        let a = vec![record! { "id" => "P-001" }, record! { "id" => "P-002" }];
        let b = vec![record! { "id" => "P-002", "cost" => 1000 }, record! { "id" => "P-003", "cost" => 2000 }];

        let out = cross_join(&a, &b, "a_", "b_");
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], record! { "a_id" => "P-001", "b_id" => "P-002", "b_cost" => 1000 });
        assert_eq!(out[1], record! { "a_id" => "P-001", "b_id" => "P-003", "b_cost" => 2000 });
        assert_eq!(out[2].get("a_id"), Some(&FieldValue::from("P-002")));
    }

    #[test]
    fn test_collision_b_wins() {
        let a = vec![record! { "x" => 1 }];
        let b = vec![record! { "x" => 2 }];
        let out = cross_join(&a, &b, "", "");
        assert_eq!(out, vec![record! { "x" => 2 }]);
    }

    #[test]
    fn test_empty_side_yields_nothing() {
        let a = vec![record! { "x" => 1 }];
        assert!(cross_join(&a, &[], "a_", "b_").is_empty());
        assert!(cross_join(&[], &a, "a_", "b_").is_empty());
    }
}
