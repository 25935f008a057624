//! Numerical building blocks.
//!
//! - [`CorrelationMatrix`]: dense symmetric matrix with the quadratic form
//!   used for bucket and cross-bucket aggregation.

pub mod correlation;

pub use correlation::CorrelationMatrix;
