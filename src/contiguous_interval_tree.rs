use std::cmp::Ordering;
use std::cmp::Ordering::*;
use std::error;
use std::fmt;
use std::marker::PhantomData;

use log::{debug, trace};
#[cfg(feature="serde")]
use serde::{de::Error as _, ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};

use crate::interval::{Interval, SimpleInterval};
use crate::node::{clone_link, dismantle, height, size, Link, Node};

/// The comparator installed by [`Default`]: the key type's own [`Ord`].
pub type Comparator<K> = fn(&K, &K) -> Ordering;

/// A binary search tree of non-overlapping intervals `[start, end)` over keys `K`,
/// each associated with a value `V`.
///
/// Stored intervals never overlap, with one exception: any number of
/// zero-length intervals can be stacked at the same point, as long as that
/// point is not strictly inside a stored interval. The tree also describes the
/// gaps between its intervals: [`search`](Self::search) tells whether a point
/// lies in a gap, and [`iter`](Self::iter) yields every gap between two stored
/// intervals as a [`Segment::Gap`]. Together, the stored intervals and the gaps
/// partition the whole span from the first start to the last end.
///
/// Keys are ordered by the comparator `C` given to [`new`](Self::new). The tree
/// is never rebalanced, so its shape only depends on the order of insertion.
///
/// ```
/// use contiguous_interval_tree::contiguous_interval_tree::ContiguousIntervalTree;
/// use contiguous_interval_tree::interval::SimpleInterval;
///
/// let mut tree: ContiguousIntervalTree<i32, &str> = ContiguousIntervalTree::default();
/// assert!(tree.insert(SimpleInterval::new(9, 10), "b"));
/// assert!(tree.insert(SimpleInterval::new(1, 4), "a"));
/// assert!(!tree.insert(SimpleInterval::new(3, 5), "overlap"));
///
/// let segments: Vec<String> = tree.iter().map(|s| s.to_string()).collect();
/// assert_eq!(segments, ["[1, 4):a", "[4, 9):", "[9, 10):b"]);
/// ```
pub struct ContiguousIntervalTree<K, V, I = SimpleInterval<K>, C = Comparator<K>> {
    root: Link<I, V>,
    comparator: C,
    _key: PhantomData<fn() -> K>,
}

/// Where a point falls, as reported by [`ContiguousIntervalTree::search`].
#[derive(Debug, PartialEq)]
pub enum Lookup<'a, I, V> {
    /// The point is inside (or on a bound of) this stored interval.
    Stored { interval: &'a I, value: &'a V },
    /// The point is in a gap between two stored intervals.
    Gap,
    /// The point is before the first or after the last stored interval,
    /// or the tree is empty.
    OutOfRange,
}

impl<'a, I, V> Lookup<'a, I, V> {
    /// Whether the point is covered, by a stored interval or by a gap.
    pub fn is_found(&self) -> bool {
        !matches!(self, Lookup::OutOfRange)
    }

    pub fn value(&self) -> Option<&'a V> {
        match *self {
            Lookup::Stored { value, .. } => Some(value),
            Lookup::Gap | Lookup::OutOfRange => None,
        }
    }
}

/// One element of the in-order traversal: either a stored interval with its
/// value, or a synthesized gap between two stored intervals.
#[derive(Debug, PartialEq)]
pub enum Segment<'a, K, I, V> {
    Stored { interval: &'a I, value: &'a V },
    Gap(SimpleInterval<K>),
}

impl<'a, K, I, V> Segment<'a, K, I, V> {
    pub fn is_gap(&self) -> bool {
        matches!(self, Segment::Gap(_))
    }

    /// The value of a stored interval. Gaps carry no value.
    pub fn value(&self) -> Option<&'a V> {
        match *self {
            Segment::Stored { value, .. } => Some(value),
            Segment::Gap(_) => None,
        }
    }
}

impl<'a, K, I, V> Interval<K> for Segment<'a, K, I, V>
where
    I: Interval<K>,
{
    fn start(&self) -> &K {
        match self {
            Segment::Stored { interval, .. } => interval.start(),
            Segment::Gap(gap) => &gap.start,
        }
    }

    fn end(&self) -> &K {
        match self {
            Segment::Stored { interval, .. } => interval.end(),
            Segment::Gap(gap) => &gap.end,
        }
    }
}

impl<'a, K, I, V> fmt::Display for Segment<'a, K, I, V>
where
    K: fmt::Display,
    I: Interval<K>,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}):", self.start(), self.end())?;
        match self.value() {
            Some(value) => write!(f, "{}", value),
            None => Ok(()),
        }
    }
}

/// Returned by [`ContiguousIntervalTree::try_insert`] when the interval
/// overlaps a stored one. The rejected interval and value are handed back.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapError<I, V> {
    interval: I,
    value: V,
}

impl<I, V> OverlapError<I, V> {
    pub fn interval(&self) -> &I {
        &self.interval
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_inner(self) -> (I, V) {
        (self.interval, self.value)
    }
}

impl<I, V> fmt::Display for OverlapError<I, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "interval overlaps an interval already stored in the tree")
    }
}

impl<I: fmt::Debug, V: fmt::Debug> error::Error for OverlapError<I, V> {}

impl<K, V, I, C> fmt::Debug for ContiguousIntervalTree<K, V, I, C>
where
    I: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ContiguousIntervalTree")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<K, V, I, C> fmt::Display for ContiguousIntervalTree<K, V, I, C>
where
    I: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.root {
            Some(ref root) => write!(f, "{}", root),
            None => write!(f, "Empty tree"),
        }
    }
}

impl<K, V, I, C> Clone for ContiguousIntervalTree<K, V, I, C>
where
    V: Clone,
    I: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        ContiguousIntervalTree {
            root: clone_link(&self.root),
            comparator: self.comparator.clone(),
            _key: PhantomData,
        }
    }
}

// Sorted insertions build arbitrarily long chains; dropping them node by
// node keeps the stack flat.
impl<K, V, I, C> Drop for ContiguousIntervalTree<K, V, I, C> {
    fn drop(&mut self) {
        dismantle(&mut self.root);
    }
}

impl<K: Ord, V, I> Default for ContiguousIntervalTree<K, V, I> {
    fn default() -> Self {
        Self::new(K::cmp)
    }
}

impl<K, V, I, C> ContiguousIntervalTree<K, V, I, C> {
    /// Creates an empty tree ordering keys with `comparator`. The comparator
    /// must be a consistent total order; it is kept for the lifetime of the tree.
    ///
    /// ```
    /// use contiguous_interval_tree::contiguous_interval_tree::ContiguousIntervalTree;
    ///
    /// // Keys grow towards smaller numbers.
    /// let mut tree: ContiguousIntervalTree<i32, &str, (i32, i32), _> =
    ///     ContiguousIntervalTree::new(|a: &i32, b: &i32| b.cmp(a));
    /// assert!(tree.insert((10, 5), "a"));
    /// assert!(tree.find(&7));
    /// ```
    pub fn new(comparator: C) -> Self {
        ContiguousIntervalTree {
            root: None,
            comparator,
            _key: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of stored intervals, including stacked zero-length
    /// ones. This does not count gaps: see [`num_intervals`](Self::num_intervals).
    pub fn size(&self) -> usize {
        size(&self.root)
    }

    /// Returns the height of the tree. An empty tree has height 0, one with a
    /// single interval has height 1, etc.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Diagnostic weight-balance check of the root: neither subtree holds more
    /// than `alpha` times the number of intervals in the tree. An empty tree
    /// is balanced. Nothing in the tree acts on this.
    pub fn is_alpha_balanced(&self, alpha: f64) -> bool {
        match self.root {
            Some(ref root) => root.alpha_balanced(alpha),
            None => true,
        }
    }
}

impl<K, V, I, C> ContiguousIntervalTree<K, V, I, C>
where
    I: Interval<K>,
    C: Fn(&K, &K) -> Ordering,
{
    /// Inserts `interval` with its `value`. Returns false, leaving the tree
    /// untouched, if the interval overlaps a stored interval.
    pub fn insert(&mut self, interval: I, value: V) -> bool {
        self.try_insert(interval, value).is_ok()
    }

    /// Same as [`insert`](Self::insert), but gives the interval and value back
    /// on overlap.
    ///
    /// ```
    /// use contiguous_interval_tree::contiguous_interval_tree::ContiguousIntervalTree;
    ///
    /// let mut tree: ContiguousIntervalTree<i32, char, std::ops::Range<i32>> =
    ///     ContiguousIntervalTree::default();
    /// tree.try_insert(1..3, 'a').unwrap();
    /// let err = tree.try_insert(2..4, 'b').unwrap_err();
    /// assert_eq!(err.into_inner(), (2..4, 'b'));
    /// ```
    pub fn try_insert(&mut self, interval: I, value: V) -> Result<(), OverlapError<I, V>> {
        let cmp = &self.comparator;
        let mut depth = 0;

        let mut curr = &mut self.root;
        while let Some(curr_node) = curr {
            if cmp(interval.start(), curr_node.interval.start()) != Greater {
                // A zero-length interval at the same start goes left.
                if cmp(interval.end(), curr_node.interval.start()) != Greater {
                    curr = &mut curr_node.left;
                    depth += 1;
                    continue;
                }
            } else if cmp(interval.start(), curr_node.interval.end()) != Less {
                curr = &mut curr_node.right;
                depth += 1;
                continue;
            }
            debug!("rejected interval overlapping the one stored at depth {}", depth);
            return Err(OverlapError { interval, value });
        }

        trace!("attached interval at depth {}", depth);
        *curr = Some(Box::new(Node::new(interval, value)));
        Ok(())
    }

    /// Whether `point` is covered, either by a stored interval or by a gap
    /// between two of them. Both bounds of a stored interval count as covered.
    ///
    /// ```
    /// use contiguous_interval_tree::contiguous_interval_tree::ContiguousIntervalTree;
    ///
    /// let mut tree: ContiguousIntervalTree<i32, (), (i32, i32)> = ContiguousIntervalTree::default();
    /// tree.insert((1, 3), ());
    /// tree.insert((6, 8), ());
    /// assert!(tree.find(&1) && tree.find(&5) && tree.find(&8));
    /// assert!(!tree.find(&0) && !tree.find(&9));
    /// ```
    pub fn find(&self, point: &K) -> bool {
        self.search(point).is_found()
    }

    /// Returns the value of the stored interval containing `point`, if any.
    pub fn get(&self, point: &K) -> Option<&V> {
        self.search(point).value()
    }

    /// Locates `point` in the tree.
    ///
    /// The walk counts its moves: `depth` is the total, `drift` is the number
    /// of right moves minus the number of left moves. Falling off the tree
    /// after moving in a single direction only means the point is beyond the
    /// extremity on that side; any other walk was bounded on both sides, so the
    /// point is in a gap.
    pub fn search(&self, point: &K) -> Lookup<'_, I, V> {
        let cmp = &self.comparator;
        let mut drift: isize = 0;
        let mut depth: usize = 0;

        let mut curr = match self.root {
            Some(ref root) => root,
            None => return Lookup::OutOfRange,
        };
        loop {
            if cmp(point, curr.interval.start()) == Less {
                match curr.left {
                    Some(ref left) => curr = left,
                    None if drift == -(depth as isize) => return Lookup::OutOfRange,
                    None => return Lookup::Gap,
                }
                drift -= 1;
            } else if cmp(point, curr.interval.end()) == Greater {
                match curr.right {
                    Some(ref right) => curr = right,
                    None if drift == depth as isize => return Lookup::OutOfRange,
                    None => return Lookup::Gap,
                }
                drift += 1;
            } else {
                return Lookup::Stored {
                    interval: &curr.interval,
                    value: &curr.value,
                };
            }
            depth += 1;
        }
    }
}

impl<K, V, I, C> ContiguousIntervalTree<K, V, I, C>
where
    K: Clone,
    I: Interval<K>,
    C: Fn(&K, &K) -> Ordering,
{
    /// Returns a lazy in-order iterator over the stored intervals and the gaps
    /// between them, by increasing start.
    pub fn iter(&self) -> Iter<'_, K, V, I, C> {
        Iter::new(self)
    }

    /// Calls `visit` on every segment of [`iter`](Self::iter), in order.
    pub fn traverse_in_order<'a, F>(&'a self, visit: F)
    where
        F: FnMut(Segment<'a, K, I, V>),
    {
        self.iter().for_each(visit)
    }

    /// Returns the number of segments of the in-order traversal: stored
    /// intervals plus the gaps between them. Never less than [`size`](Self::size).
    pub fn num_intervals(&self) -> usize {
        self.iter().count()
    }

    /// Visits the segments between `start` and `end`. Range traversal is not
    /// supported yet: this visits nothing.
    // TODO: visit the segments overlapping `[start, end)`, pruning subtrees
    // that end before `start` or begin after `end`.
    pub fn traverse_between<'a, F>(&'a self, _start: &K, _end: &K, _visit: F)
    where
        F: FnMut(Segment<'a, K, I, V>),
    {
    }
}

impl<'a, K, V, I, C> IntoIterator for &'a ContiguousIntervalTree<K, V, I, C>
where
    K: Clone,
    I: Interval<K>,
    C: Fn(&K, &K) -> Ordering,
{
    type Item = Segment<'a, K, I, V>;
    type IntoIter = Iter<'a, K, V, I, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over a [`ContiguousIntervalTree`], yielding a
/// [`Segment::Gap`] before any stored interval that does not start where the
/// previous one ended.
pub struct Iter<'a, K, V, I, C> {
    comparator: &'a C,
    stack: Vec<&'a Node<I, V>>,
    // End of the last stored interval yielded.
    last_end: Option<&'a K>,
    // Node to yield right after the gap preceding it.
    pending: Option<&'a Node<I, V>>,
}

impl<'a, K, V, I, C> Iter<'a, K, V, I, C> {
    fn new(tree: &'a ContiguousIntervalTree<K, V, I, C>) -> Self {
        let mut iter = Iter {
            comparator: &tree.comparator,
            stack: Vec::new(),
            last_end: None,
            pending: None,
        };
        iter.push_left_spine(&tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut link: &'a Link<I, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K, V, I, C> Iter<'a, K, V, I, C>
where
    I: Interval<K>,
{
    fn stored(&mut self, node: &'a Node<I, V>) -> Segment<'a, K, I, V> {
        self.last_end = Some(node.interval.end());
        Segment::Stored {
            interval: &node.interval,
            value: &node.value,
        }
    }
}

impl<'a, K, V, I, C> Iterator for Iter<'a, K, V, I, C>
where
    K: Clone,
    I: Interval<K>,
    C: Fn(&K, &K) -> Ordering,
{
    type Item = Segment<'a, K, I, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(node) = self.pending.take() {
            return Some(self.stored(node));
        }

        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);

        if let Some(last_end) = self.last_end {
            let start = node.interval.start();
            if (self.comparator)(last_end, start) == Less {
                self.pending = Some(node);
                return Some(Segment::Gap(SimpleInterval::new(
                    last_end.clone(),
                    start.clone(),
                )));
            }
        }
        Some(self.stored(node))
    }
}

/// Serialized as the pre-order sequence of `(interval, value)` pairs, so that
/// inserting them back in order rebuilds the same shape.
#[cfg(feature="serde")]
impl<K, V, I, C> Serialize for ContiguousIntervalTree<K, V, I, C>
where
    I: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.size()))?;
        let mut stack: Vec<&Node<I, V>> = self.root.iter().map(|root| &**root).collect();
        while let Some(node) = stack.pop() {
            seq.serialize_element(&(&node.interval, &node.value))?;
            if let Some(ref right) = node.right {
                stack.push(right);
            }
            if let Some(ref left) = node.left {
                stack.push(left);
            }
        }
        seq.end()
    }
}

#[cfg(feature="serde")]
impl<'de, K, V, I> Deserialize<'de> for ContiguousIntervalTree<K, V, I>
where
    K: Ord,
    I: Interval<K> + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<(I, V)>::deserialize(deserializer)?;
        let mut tree = ContiguousIntervalTree::default();
        for (interval, value) in pairs {
            tree.try_insert(interval, value).map_err(D::Error::custom)?;
        }
        Ok(tree)
    }
}
