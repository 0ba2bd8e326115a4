use std::fmt;
use std::ops::Range;
#[cfg(feature="serde")]
use serde::{Serialize, Deserialize};

/// Anything with a start and an end over a key domain `K`, read as `[start, end)`.
///
/// Intervals are expected to satisfy `start <= end`. This is not validated:
/// inserting an interval with `start > end` leaves the results of every
/// tree operation unspecified.
pub trait Interval<K> {
    fn start(&self) -> &K;
    fn end(&self) -> &K;
}

/// A plain `[start, end)` pair. This is also the type of the gaps
/// synthesized during an in-order traversal.
#[cfg_attr(feature="serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SimpleInterval<K> {
    pub start: K,
    pub end: K,
}

impl<K> SimpleInterval<K> {
    pub fn new(start: K, end: K) -> Self {
        SimpleInterval { start, end }
    }
}

impl<K> Interval<K> for SimpleInterval<K> {
    fn start(&self) -> &K {
        &self.start
    }

    fn end(&self) -> &K {
        &self.end
    }
}

impl<K> From<Range<K>> for SimpleInterval<K> {
    fn from(range: Range<K>) -> Self {
        SimpleInterval::new(range.start, range.end)
    }
}

impl<K> From<(K, K)> for SimpleInterval<K> {
    fn from((start, end): (K, K)) -> Self {
        SimpleInterval::new(start, end)
    }
}

impl<K> fmt::Display for SimpleInterval<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl<K> Interval<K> for Range<K> {
    fn start(&self) -> &K {
        &self.start
    }

    fn end(&self) -> &K {
        &self.end
    }
}

impl<K> Interval<K> for (K, K) {
    fn start(&self) -> &K {
        &self.0
    }

    fn end(&self) -> &K {
        &self.1
    }
}
