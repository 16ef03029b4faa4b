//! High-level pipeline API for matching two datasets.
//!
//! This module combines all steps: identifier normalization, intersection,
//! filtering, and the selected merge strategy.
//!
//! # Example
//!
//! ```rust
//! use recmatch::{match_datasets, record, MatchOptions};
//!
//! let left = vec![record! { "id" => "P-003", "name" => "Charlie" }];
//! let right = vec![record! { "id" => "p003", "cost" => 1000 }];
//!
//! let result = match_datasets(&left, &right, &MatchOptions::default()).unwrap();
//! assert_eq!(result.summary.matching, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, info_span, warn};

use super::filter::filter_by_ids;
use super::intersect::intersect_ids;
use super::normalize::normalize_id;
use crate::error::PipelineError;
use crate::merge::{cross_join, horizontal_merge, vertical_merge};
use crate::models::{JoinMode, Record};

/// How the two filtered datasets are combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Stop after filtering; no merged output.
    None,

    /// Cartesian product with field prefixes.
    Cross {
        #[serde(default = "default_prefix_a")]
        prefix_a: String,
        #[serde(default = "default_prefix_b")]
        prefix_b: String,
    },

    /// Row-wise concatenation.
    Vertical {
        #[serde(default = "default_ensure_same_keys")]
        ensure_same_keys: bool,
    },

    /// Keyed join on the normalized identifier field.
    Horizontal {
        #[serde(default)]
        how: JoinMode,
    },
}

fn default_prefix_a() -> String {
    "a_".to_string()
}

fn default_prefix_b() -> String {
    "b_".to_string()
}

fn default_ensure_same_keys() -> bool {
    true
}

impl Default for MergeStrategy {
    fn default() -> Self {
        MergeStrategy::Horizontal { how: JoinMode::Inner }
    }
}

impl MergeStrategy {
    /// Short name for logs and summaries.
    pub fn name(&self) -> String {
        match self {
            MergeStrategy::None => "none".to_string(),
            MergeStrategy::Cross { .. } => "cross".to_string(),
            MergeStrategy::Vertical { .. } => "vertical".to_string(),
            MergeStrategy::Horizontal { how } => format!("horizontal ({})", how),
        }
    }
}

/// Options for the matching pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Field holding the raw identifier in both datasets
    pub id_key: String,

    /// Replace normalized identifiers with their SHA-256 digest
    pub hash_ids: bool,

    /// Field the normalized identifier is written to
    pub match_field: String,

    /// Merge applied after filtering
    pub strategy: MergeStrategy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            id_key: "id".to_string(),
            hash_ids: true,
            match_field: "match_id".to_string(),
            strategy: MergeStrategy::default(),
        }
    }
}

/// Counts reported after a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub input_left: usize,
    pub input_right: usize,
    /// Records without a usable identifier
    pub missing_id_left: usize,
    pub missing_id_right: usize,
    /// Size of the common identifier set
    pub matching: usize,
    pub final_left: usize,
    pub final_right: usize,
    /// Merged record count, `None` when no merge was requested
    pub merged: Option<usize>,
}

/// Result of a complete matching run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Unique run identifier
    pub run_id: String,

    /// Completion timestamp (RFC 3339)
    pub finished_at: String,

    /// Strategy that produced `merged`
    pub strategy: MergeStrategy,

    pub summary: MatchSummary,

    /// Sorted common normalized identifiers
    pub common_ids: Vec<String>,

    /// Left records restricted to the common set, annotated with the match field
    pub left: Vec<Record>,

    /// Right records restricted to the common set, annotated with the match field
    pub right: Vec<Record>,

    /// Merge output, absent for [`MergeStrategy::None`]
    pub merged: Option<Vec<Record>>,
}

/// Records carrying an identifier, each annotated with its normalized form.
struct Annotated {
    records: Vec<Record>,
    ids: Vec<String>,
    missing: usize,
}

/// Annotate every record that has a non-null identifier.
///
/// Numbers and booleans are matched through their text form.
fn annotate(data: &[Record], options: &MatchOptions) -> Annotated {
    let mut records = Vec::with_capacity(data.len());
    let mut ids = Vec::with_capacity(data.len());
    let mut missing = 0;

    for row in data {
        match row.get(&options.id_key).and_then(|v| v.as_text()) {
            Some(raw) => {
                let normalized = normalize_id(&raw, options.hash_ids);
                let mut annotated = row.clone();
                annotated.insert(options.match_field.clone(), normalized.clone());
                records.push(annotated);
                ids.push(normalized);
            }
            None => missing += 1,
        }
    }

    Annotated { records, ids, missing }
}

/// Match two datasets end to end.
///
/// 1. Annotate each record with its normalized identifier
/// 2. Intersect the identifier sets
/// 3. Filter both sides to the common set
/// 4. Merge with the configured strategy (keyed merges use `match_field`)
///
/// # Errors
/// - [`PipelineError::EmptyInput`] when both datasets are empty
/// - [`PipelineError::Merge`] when the vertical schema check fails
pub fn match_datasets(
    left: &[Record],
    right: &[Record],
    options: &MatchOptions,
) -> Result<MatchResult, PipelineError> {
    let _span = info_span!("match", id_key = %options.id_key, hash = options.hash_ids).entered();

    if left.is_empty() && right.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    info!(left = left.len(), right = right.len(), "normalizing identifiers");
    let annotated_left = annotate(left, options);
    let annotated_right = annotate(right, options);

    if annotated_left.missing > 0 || annotated_right.missing > 0 {
        warn!(
            left = annotated_left.missing,
            right = annotated_right.missing,
            "records without '{}' excluded",
            options.id_key
        );
    }

    let common_ids = intersect_ids(&annotated_left.ids, &annotated_right.ids);
    info!(matching = common_ids.len(), "computed common identifier set");

    let id_set: HashSet<String> = common_ids.iter().cloned().collect();
    let filtered_left = filter_by_ids(&annotated_left.records, &id_set, &options.match_field);
    let filtered_right = filter_by_ids(&annotated_right.records, &id_set, &options.match_field);

    debug!(strategy = %options.strategy.name(), "merging filtered datasets");
    let merged = match &options.strategy {
        MergeStrategy::None => None,
        MergeStrategy::Cross { prefix_a, prefix_b } => {
            Some(cross_join(&filtered_left, &filtered_right, prefix_a, prefix_b))
        }
        MergeStrategy::Vertical { ensure_same_keys } => {
            Some(vertical_merge(&filtered_left, &filtered_right, *ensure_same_keys)?)
        }
        MergeStrategy::Horizontal { how } => Some(horizontal_merge(
            &filtered_left,
            &filtered_right,
            &options.match_field,
            *how,
        )),
    };

    let summary = MatchSummary {
        input_left: left.len(),
        input_right: right.len(),
        missing_id_left: annotated_left.missing,
        missing_id_right: annotated_right.missing,
        matching: common_ids.len(),
        final_left: filtered_left.len(),
        final_right: filtered_right.len(),
        merged: merged.as_ref().map(Vec::len),
    };
    info!(
        final_left = summary.final_left,
        final_right = summary.final_right,
        merged = ?summary.merged,
        "matching complete"
    );

    Ok(MatchResult {
        run_id: uuid::Uuid::new_v4().to_string(),
        finished_at: chrono::Utc::now().to_rfc3339(),
        strategy: options.strategy.clone(),
        summary,
        common_ids,
        left: filtered_left,
        right: filtered_right,
        merged,
    })
}
