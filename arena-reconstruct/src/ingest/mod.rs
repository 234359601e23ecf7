//! Sample ingestion
//!
//! Builds the working point set from a capture session and applies the
//! filters that run before any geometry is estimated:
//! - Height band outlier filter
//! - Duplicate sample filter

pub mod filter;
pub mod point_set;

pub use filter::{filter_duplicates, filter_height};
pub use point_set::{IndexMapping, PointSet};
