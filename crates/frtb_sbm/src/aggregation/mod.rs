//! Bucket and cross-bucket aggregation.
//!
//! - [`BucketAggregator`]: `Kb` and `Sb` of one bucket from weighted factors
//! - [`CrossBucketAggregator`]: risk-class capital from bucket results and Γ

pub mod bucket;
pub mod cross_bucket;

pub use bucket::BucketAggregator;
pub use cross_bucket::CrossBucketAggregator;
