//! Implementation of a contiguous interval tree ([`contiguous_interval_tree::ContiguousIntervalTree`]):
//! a binary search tree keyed on non-overlapping intervals. Besides the stored
//! intervals, the tree also describes the gaps between them: point queries
//! distinguish "inside a stored interval", "inside a gap" and "outside the
//! covered range", and the in-order traversal yields the gaps as synthetic
//! segments, so that the whole span between the first and last interval is
//! partitioned.
//!
//! Zero-length intervals are allowed, and any number of them may be stacked
//! at the same point.
//!
//! Keys are ordered by a comparator supplied at construction; any type
//! satisfying the [`Ord`] trait can use the default one.

/// A contiguous interval tree implemented with an unbalanced binary search tree.
pub mod contiguous_interval_tree;
/// The interval capability and its default implementation.
pub mod interval;
mod node;
