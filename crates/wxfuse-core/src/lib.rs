//! Core data types and aggregation logic for wxfuse
//!
//! This crate holds the pure parts of the system: per-source readings,
//! the cross-source aggregation that reconciles them into one record per
//! collection cycle, the data-quality score, and the windowed statistics
//! used when serving historical queries. No I/O happens here.

pub mod aggregate;
pub mod reading;
pub mod stats;

pub use aggregate::*;
pub use reading::*;
pub use stats::*;
