//! Data-combination strategies.
//!
//! - Cross: Cartesian product with field prefixes
//! - Vertical: Row-wise concatenation with an optional schema check
//! - Horizontal: Keyed join (inner, left, right, outer)

pub mod cross;
pub mod horizontal;
pub mod vertical;

pub use cross::cross_join;
pub use horizontal::{horizontal_merge, horizontal_merge_by_name};
pub use vertical::vertical_merge;
