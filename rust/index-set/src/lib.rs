//! Run-length encoded sets of unsigned integer indices.
//!
//! An [`IndexSet`] stores a collection of unique indices as a minimal sorted
//! list of disjoint [`Range`] runs, coalescing neighbors as members are
//! added. It offers:
//!
//! - **Membership queries**: single indices and whole ranges
//! - **Nearest-neighbor queries**: the closest member under one of four
//!   directional [`Predicate`]s
//! - **Enumeration**: forward or backward, optionally restricted to a
//!   sub-range, with caller-driven early stop and no allocation
//!
//! # Key Types
//!
//! - [`Range`] - A `(start, length)` interval value
//! - [`IndexSet`] - The run-length encoded set container
//! - [`Predicate`] - Ordering relations for nearest-member queries

pub mod error;
pub mod index_set;
pub mod range;
#[cfg(test)]
mod tests;

pub use error::{Error, ErrorKind, Result};
pub use index_set::{EnumerateFlags, IndexSet, IndicesIter, Predicate};
pub use range::Range;
