//! Row-wise concatenation of two datasets.

use tracing::{debug, warn};

use crate::error::MergeError;
use crate::models::Record;

/// Concatenate `a` followed by `b`, keeping each side's order.
///
/// With `ensure_same_keys`, when both sides are non-empty, the field-name
/// sets of `a[0]` and `b[0]` must be equal or the merge fails with
/// [`MergeError::SchemaMismatch`]. Only those two rows are inspected.
pub fn vertical_merge(a: &[Record], b: &[Record], ensure_same_keys: bool) -> Result<Vec<Record>, MergeError> {
    if ensure_same_keys {
        if let (Some(first_a), Some(first_b)) = (a.first(), b.first()) {
            let keys_a = first_a.field_names();
            let keys_b = first_b.field_names();
            if keys_a != keys_b {
                warn!(left = ?keys_a, right = ?keys_b, "vertical merge schema mismatch");
                return Err(MergeError::SchemaMismatch {
                    left: keys_a.into_iter().map(String::from).collect(),
                    right: keys_b.into_iter().map(String::from).collect(),
                });
            }
        }
    }

    let mut merged = Vec::with_capacity(a.len() + b.len());
    merged.extend_from_slice(a);
    merged.extend_from_slice(b);

    debug!(left = a.len(), right = b.len(), output = merged.len(), "vertical merge");
    Ok(merged)
}
