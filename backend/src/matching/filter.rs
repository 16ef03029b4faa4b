//! Restrict a dataset to records whose identifier is in a given set.

use std::collections::HashSet;

use tracing::debug;

use crate::models::Record;

/// Keep, in original order, every record whose `key` field is a string in `ids`.
///
/// Records missing `key`, or holding a non-string or unknown value there,
/// are dropped. The input is not modified.
pub fn filter_by_ids(data: &[Record], ids: &HashSet<String>, key: &str) -> Vec<Record> {
    let kept: Vec<Record> = data
        .iter()
        .filter(|row| {
            row.get(key)
                .and_then(|v| v.as_str())
                .is_some_and(|id| ids.contains(id))
        })
        .cloned()
        .collect();

    debug!(key, input = data.len(), kept = kept.len(), "filtered records by id set");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    fn id_set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keeps_matching_rows_in_order() {
        let data = vec![
            record! { "id" => "P-004", "n" => 1 },
            record! { "id" => "P-001", "n" => 2 },
            record! { "id" => "P-003", "n" => 3 },
        ];
        let kept = filter_by_ids(&data, &id_set(&["P-003", "P-004"]), "id");
        assert_eq!(kept, vec![data[0].clone(), data[2].clone()]);
    }

    #[test]
    fn test_rows_without_key_are_dropped() {
        let data = vec![record! { "name" => "Alice" }, record! { "id" => "P-003" }];
        let kept = filter_by_ids(&data, &id_set(&["P-003"]), "id");
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_non_string_values_never_match() {
        let data = vec![record! { "id" => 3 }];
        let kept = filter_by_ids(&data, &id_set(&["3"]), "id");
        assert!(kept.is_empty());
    }

    #[test]
    fn test_empty_id_set_drops_everything() {
        let data = vec![record! { "id" => "P-001" }];
        assert!(filter_by_ids(&data, &HashSet::new(), "id").is_empty());
    }
}
