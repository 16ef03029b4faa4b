//! Keyed horizontal merge (relational join on one field).
//!
//! # Duplicate keys
//!
//! Lookup tables are built by walking a dataset in order and overwriting on
//! every repeated key value, so the **last** record with a given key wins and
//! earlier ones are shadowed. Callers that need every duplicate preserved
//! must deduplicate or aggregate before merging.
//!
//! # Field collisions
//!
//! When both sides carry the same field name, the right-hand (`b`) value
//! wins, except for the join key itself, which is always set to the key
//! value that produced the match.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::MergeError;
use crate::models::{FieldValue, JoinMode, Record};

/// Last-write-wins index from key value to record.
///
/// Records without `key` are skipped.
fn build_lookup<'a>(data: &'a [Record], key: &str) -> HashMap<&'a FieldValue, &'a Record> {
    let mut lookup = HashMap::with_capacity(data.len());
    for row in data {
        if let Some(value) = row.get(key) {
            lookup.insert(value, row);
        }
    }
    lookup
}

/// `base` overlaid by `overlay`, with `key` pinned to `key_value`.
fn merge_pair(base: &Record, overlay: &Record, key: &str, key_value: &FieldValue) -> Record {
    let mut merged = base.clone();
    merged.extend_from(overlay);
    merged.insert(key, key_value.clone());
    merged
}

/// Join `a` and `b` on `key` using `mode`.
///
/// | Mode    | Rows emitted                                  | Order          |
/// |---------|-----------------------------------------------|----------------|
/// | `inner` | keyed rows of `a` with a match in `b`         | `a`            |
/// | `left`  | every keyed row of `a`, merged when matched   | `a`            |
/// | `right` | one row per distinct key value of `b`         | first seen in `b` |
/// | `outer` | one row per distinct key value on either side | first seen, `a` then `b` |
///
/// Unmatched rows are emitted unchanged: missing fields stay absent and are
/// never null-filled.
pub fn horizontal_merge(a: &[Record], b: &[Record], key: &str, mode: JoinMode) -> Vec<Record> {
    let result = match mode {
        JoinMode::Inner => inner_join(a, b, key),
        JoinMode::Left => left_join(a, b, key),
        JoinMode::Right => right_join(a, b, key),
        JoinMode::Outer => outer_join(a, b, key),
    };

    debug!(
        key,
        mode = %mode,
        left = a.len(),
        right = b.len(),
        output = result.len(),
        "horizontal merge"
    );
    result
}

/// Same as [`horizontal_merge`], with the mode given as text.
///
/// Fails with [`MergeError::InvalidArgument`] before touching the data when
/// `mode` is not one of `inner`, `left`, `right`, `outer`.
pub fn horizontal_merge_by_name(a: &[Record], b: &[Record], key: &str, mode: &str) -> Result<Vec<Record>, MergeError> {
    let mode: JoinMode = mode.parse()?;
    Ok(horizontal_merge(a, b, key, mode))
}

fn inner_join(a: &[Record], b: &[Record], key: &str) -> Vec<Record> {
    let lookup_b = build_lookup(b, key);

    a.iter()
        .filter_map(|row_a| {
            let key_value = row_a.get(key)?;
            let row_b = lookup_b.get(key_value)?;
            Some(merge_pair(row_a, row_b, key, key_value))
        })
        .collect()
}

fn left_join(a: &[Record], b: &[Record], key: &str) -> Vec<Record> {
    let lookup_b = build_lookup(b, key);

    a.iter()
        .filter_map(|row_a| {
            let key_value = row_a.get(key)?;
            Some(match lookup_b.get(key_value) {
                Some(row_b) => merge_pair(row_a, row_b, key, key_value),
                None => row_a.clone(),
            })
        })
        .collect()
}

/// Distinct key values of `data`, in first-appearance order.
fn distinct_keys<'a>(data: &'a [Record], key: &str, seen: &mut HashSet<&'a FieldValue>, keys: &mut Vec<&'a FieldValue>) {
    for row in data {
        if let Some(value) = row.get(key) {
            if seen.insert(value) {
                keys.push(value);
            }
        }
    }
}

fn right_join(a: &[Record], b: &[Record], key: &str) -> Vec<Record> {
    let lookup_a = build_lookup(a, key);
    let lookup_b = build_lookup(b, key);

    let mut seen = HashSet::with_capacity(lookup_b.len());
    let mut keys = Vec::with_capacity(lookup_b.len());
    distinct_keys(b, key, &mut seen, &mut keys);

    keys.into_iter()
        .filter_map(|key_value| {
            let row_b = lookup_b.get(key_value)?;
            Some(match lookup_a.get(key_value) {
                Some(row_a) => merge_pair(row_a, row_b, key, key_value),
                None => (*row_b).clone(),
            })
        })
        .collect()
}

fn outer_join(a: &[Record], b: &[Record], key: &str) -> Vec<Record> {
    let lookup_a = build_lookup(a, key);
    let lookup_b = build_lookup(b, key);

    // Key universe in first-appearance order, a before b
    let mut seen = HashSet::with_capacity(lookup_a.len() + lookup_b.len());
    let mut keys = Vec::with_capacity(lookup_a.len() + lookup_b.len());
    distinct_keys(a, key, &mut seen, &mut keys);
    distinct_keys(b, key, &mut seen, &mut keys);

    keys.into_iter()
        .map(|key_value| {
            let mut merged = Record::new();
            if let Some(row_a) = lookup_a.get(key_value) {
                merged.extend_from(row_a);
            }
            if let Some(row_b) = lookup_b.get(key_value) {
                merged.extend_from(row_b);
            }
            merged.insert(key, key_value.clone());
            merged
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    fn people() -> Vec<Record> {
        vec![
            record! { "id" => "P-001", "name" => "Alice", "age" => 25 },
            record! { "id" => "P-002", "name" => "Bob", "age" => 30 },
        ]
    }

    fn diagnoses() -> Vec<Record> {
        vec![
            record! { "id" => "P-002", "diagnosis" => "A", "cost" => 1000 },
            record! { "id" => "P-003", "diagnosis" => "B", "cost" => 2000 },
        ]
    }

    #[test]
    fn test_inner() {
        let out = horizontal_merge(&people(), &diagnoses(), "id", JoinMode::Inner);
        assert_eq!(
            out,
            vec![record! { "id" => "P-002", "name" => "Bob", "age" => 30, "diagnosis" => "A", "cost" => 1000 }]
        );
    }

    #[test]
    fn test_left_keeps_unmatched_without_null_fill() {
        let out = horizontal_merge(&people(), &diagnoses(), "id", JoinMode::Left);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], people()[0]);
        assert!(!out[0].contains_field("diagnosis"));
        assert_eq!(out[1].get("diagnosis"), Some(&FieldValue::from("A")));
    }

    #[test]
    fn test_right_follows_b_order() {
        let out = horizontal_merge(&people(), &diagnoses(), "id", JoinMode::Right);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("name"), Some(&FieldValue::from("Bob")));
        assert_eq!(out[1], diagnoses()[1]);
    }

    #[test]
    fn test_outer_first_appearance_order() {
        let out = horizontal_merge(&people(), &diagnoses(), "id", JoinMode::Outer);
        let ids: Vec<_> = out.iter().map(|r| r.get("id").and_then(FieldValue::as_str).unwrap()).collect();
        assert_eq!(ids, vec!["P-001", "P-002", "P-003"]);
        assert_eq!(out[1].get("cost"), Some(&FieldValue::from(1000)));
        assert_eq!(out[1].get("name"), Some(&FieldValue::from("Bob")));
    }

    #[test]
    fn test_b_wins_on_collision_except_key() {
        let a = vec![record! { "id" => "X", "status" => "old" }];
        let b = vec![record! { "id" => "X", "status" => "new" }];
        for mode in JoinMode::ALL {
            let out = horizontal_merge(&a, &b, "id", mode);
            assert_eq!(out.len(), 1, "mode {}", mode);
            assert_eq!(out[0].get("status"), Some(&FieldValue::from("new")), "mode {}", mode);
        }
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let a = vec![record! { "id" => "X" }];
        let b = vec![record! { "id" => "X", "v" => 1 }, record! { "id" => "X", "v" => 2 }];
        let out = horizontal_merge(&a, &b, "id", JoinMode::Inner);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("v"), Some(&FieldValue::from(2)));
    }

    #[test]
    fn test_right_join_collapses_duplicate_keys() {
        let a = vec![record! { "id" => "X", "w" => 0 }];
        let b = vec![
            record! { "id" => "X", "v" => 1 },
            record! { "id" => "Y", "v" => 5 },
            record! { "id" => "X", "v" => 2 },
        ];
        let out = horizontal_merge(&a, &b, "id", JoinMode::Right);
        assert_eq!(
            out,
            vec![record! { "id" => "X", "w" => 0, "v" => 2 }, record! { "id" => "Y", "v" => 5 }]
        );
    }

    #[test]
    fn test_outer_join_duplicate_keys_last_wins() {
        let a = vec![
            record! { "id" => "X", "w" => 1 },
            record! { "id" => "Z", "w" => 9 },
            record! { "id" => "X", "w" => 2 },
        ];
        let b = vec![record! { "id" => "X", "v" => 1 }, record! { "id" => "X", "v" => 2 }];
        let out = horizontal_merge(&a, &b, "id", JoinMode::Outer);
        assert_eq!(
            out,
            vec![record! { "id" => "X", "w" => 2, "v" => 2 }, record! { "id" => "Z", "w" => 9 }]
        );
    }

    #[test]
    fn test_rows_without_key_are_skipped() {
        let a = vec![record! { "name" => "ghost" }, record! { "id" => "P-002" }];
        let b = vec![record! { "cost" => 1 }, record! { "id" => "P-002", "cost" => 2 }];
        for mode in JoinMode::ALL {
            let out = horizontal_merge(&a, &b, "id", mode);
            assert_eq!(out.len(), 1, "mode {}", mode);
            assert!(out[0].contains_field("id"));
        }
    }

    #[test]
    fn test_key_types_must_match() {
        let a = vec![record! { "id" => 1 }];
        let b = vec![record! { "id" => "1", "v" => true }];
        assert!(horizontal_merge(&a, &b, "id", JoinMode::Inner).is_empty());
        assert_eq!(horizontal_merge(&a, &b, "id", JoinMode::Outer).len(), 2);
    }

    #[test]
    fn test_invalid_mode_name() {
        let err = horizontal_merge_by_name(&people(), &diagnoses(), "id", "bogus").unwrap_err();
        assert!(matches!(err, MergeError::InvalidArgument(_)));

        let out = horizontal_merge_by_name(&people(), &diagnoses(), "id", "LEFT").unwrap();
        assert_eq!(out.len(), 2);
    }
}
