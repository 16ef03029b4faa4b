//! Identifier matching.
//!
//! This module handles the steps before any merge:
//! - Normalize: Canonical (optionally hashed) identifiers
//! - Intersect: Sorted common identifier set
//! - Filter: Keep records whose identifier is in the common set
//! - Pipeline: End-to-end matching of two datasets

pub mod filter;
pub mod intersect;
pub mod normalize;
pub mod pipeline;

pub use filter::filter_by_ids;
pub use intersect::intersect_ids;
pub use normalize::{normalize_id, normalize_ids};
pub use pipeline::*;
