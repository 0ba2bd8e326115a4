use std::fmt;

pub(crate) type Link<I, V> = Option<Box<Node<I, V>>>;

/// A stored interval and its value. The child links are only ever filled,
/// never reassigned or cleared.
#[derive(Debug)]
pub(crate) struct Node<I, V> {
    pub interval: I,
    pub value: V,
    pub left: Link<I, V>,
    pub right: Link<I, V>,
}

impl<I, V> fmt::Display for Node<I, V>
where
    I: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.left, &self.right) {
            (None, None) => write!(f, " {{ {}: {} }} ", self.interval, self.value),
            (None, Some(right)) => write!(
                f,
                " {{ {}: {} right:{}}} ",
                self.interval, self.value, right
            ),
            (Some(left), None) => write!(
                f,
                " {{ {}: {} left:{}}} ",
                self.interval, self.value, left
            ),
            (Some(left), Some(right)) => write!(
                f,
                " {{ {}: {} left:{}right:{}}} ",
                self.interval, self.value, left, right
            ),
        }
    }
}

impl<I, V> Node<I, V> {
    pub fn new(interval: I, value: V) -> Node<I, V> {
        Node {
            interval,
            value,
            left: None,
            right: None,
        }
    }

    /// Weight-balance criterion of BB[α] trees: neither subtree holds more
    /// than `alpha` times the nodes of the subtree rooted here.
    pub fn alpha_balanced(&self, alpha: f64) -> bool {
        let left = size(&self.left) as f64;
        let right = size(&self.right) as f64;
        let bound = alpha * (left + right + 1.0);
        left <= bound && right <= bound
    }
}

/// Number of nodes in the subtree behind `link`.
pub(crate) fn size<I, V>(link: &Link<I, V>) -> usize {
    let mut count = 0;
    let mut stack: Vec<&Node<I, V>> = link.iter().map(|node| &**node).collect();
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.left.as_deref());
        stack.extend(node.right.as_deref());
    }
    count
}

/// Number of nodes on the longest root-to-leaf path behind `link`.
pub(crate) fn height<I, V>(link: &Link<I, V>) -> usize {
    let mut max = 0;
    let mut stack: Vec<(&Node<I, V>, usize)> = link.iter().map(|node| (&**node, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        max = max.max(depth);
        stack.extend(node.left.as_deref().map(|left| (left, depth + 1)));
        stack.extend(node.right.as_deref().map(|right| (right, depth + 1)));
    }
    max
}

/// Deep copy of the subtree behind `link`, built without recursion.
pub(crate) fn clone_link<I: Clone, V: Clone>(link: &Link<I, V>) -> Link<I, V> {
    let mut cloned = None;
    let mut work: Vec<(&Node<I, V>, &mut Link<I, V>)> = Vec::new();
    if let Some(node) = link.as_deref() {
        work.push((node, &mut cloned));
    }
    while let Some((node, slot)) = work.pop() {
        let copy: &mut Node<I, V> =
            slot.insert(Box::new(Node::new(node.interval.clone(), node.value.clone())));
        if let Some(left) = node.left.as_deref() {
            work.push((left, &mut copy.left));
        }
        if let Some(right) = node.right.as_deref() {
            work.push((right, &mut copy.right));
        }
    }
    drop(work);
    cloned
}

/// Frees the subtree behind `link` one node at a time, detaching children
/// first so that dropping a node never recurses.
pub(crate) fn dismantle<I, V>(link: &mut Link<I, V>) {
    let mut work: Vec<Box<Node<I, V>>> = link.take().into_iter().collect();
    while let Some(mut node) = work.pop() {
        work.extend(node.left.take());
        work.extend(node.right.take());
    }
}
