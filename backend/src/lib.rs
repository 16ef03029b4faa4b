//! # Recmatch - record matching and merging across two sources
//!
//! Recmatch aligns two datasets on a shared identifier: identifiers are
//! normalized (and optionally hashed), the common set is computed, both
//! sides are filtered to it, and the results are merged.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / JSON │────▶│   Parser    │────▶│  Matching   │────▶│    Merge    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (norm+filt) │     │ (x / v / h) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use recmatch::{horizontal_merge, record, JoinMode};
//!
//! let a = vec![record! { "id" => "P-003", "name" => "Charlie" }];
//! let b = vec![record! { "id" => "P-003", "cost" => 1000 }];
//!
//! let merged = horizontal_merge(&a, &b, "id", JoinMode::Inner);
//! assert_eq!(merged.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Field values, records, join modes
//! - [`matching`] - Normalization, intersection, filtering, pipeline
//! - [`merge`] - Cross, vertical and horizontal merges
//! - [`parser`] - CSV/JSON loading with auto-detection
//! - [`config`] - Option files and environment overrides
//! - [`logging`] - Tracing subscriber setup

// Core modules
pub mod error;
pub mod models;

// Matching and merging
pub mod matching;
pub mod merge;

// Input / output
pub mod parser;

// Ambient
pub mod config;
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, LoadError, LoadResult, MergeError, MergeResult, PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Dataset, FieldValue, JoinMode, Record};

// =============================================================================
// Re-exports - Matching
// =============================================================================

pub use matching::{filter_by_ids, intersect_ids, normalize_id, normalize_ids};

// =============================================================================
// Re-exports - Merge
// =============================================================================

pub use merge::{cross_join, horizontal_merge, horizontal_merge_by_name, vertical_merge};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use matching::pipeline::{match_datasets, MatchOptions, MatchResult, MatchSummary, MergeStrategy};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, load_dataset, parse_bytes_auto,
    parse_csv_str, parse_json_str, save_dataset, write_csv, write_json, DataFormat, LoadedDataset,
};
