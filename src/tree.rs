//! A height balanced (AVL) ordered set with bidirectional positions.
//!
//! Nodes live in an arena and refer to each other by [`Handle`]. Every node keeps a back-reference
//! to its parent so a [`Position`] can be moved to its in-order successor or predecessor without
//! a stack, which is what makes [`Tree::distance`] possible.
//!
//! # Examples
//!
//! ```
//! use avl_range::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert(5);
//! tree.insert(3);
//! tree.insert(7);
//!
//! // Duplicates are ignored.
//! assert!(!tree.insert(5));
//! assert_eq!(tree.size(), 3);
//!
//! // How many keys lie in [2, 6]?
//! let first = tree.lower_bound(&2);
//! let past_last = tree.upper_bound(&6);
//! assert_eq!(tree.get(first), Some(&3));
//! assert_eq!(tree.get(past_last), Some(&7));
//! assert_eq!(tree.distance(first, past_last), 2);
//! ```

use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::iter::FusedIterator;

use crate::compare::{Compare, Natural};
use crate::node::{Arena, Handle, Node};
use crate::rotate::{self, Local, Side};

/// A place in a [`Tree`]: either a stored key or the position just past the last key.
///
/// `End` carries no key so there is nothing to dereference; use [`Tree::get`] to read the key
/// behind any position or [`Tree::key`] once you hold a [`Handle`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Position {
    /// The node named by the handle.
    At(Handle),
    /// One past the largest key. Every bound query returns this when no key qualifies.
    End,
}

impl Position {
    /// The handle of a real position, `None` for [`Position::End`].
    pub fn handle(self) -> Option<Handle> {
        match self {
            Position::At(handle) => Some(handle),
            Position::End => None,
        }
    }

    /// Whether this is [`Position::End`].
    pub fn is_end(self) -> bool {
        self == Position::End
    }
}

impl From<Option<Handle>> for Position {
    fn from(handle: Option<Handle>) -> Self {
        handle.map_or(Position::End, Position::At)
    }
}

/// A structural problem found by [`Tree::check_invariants`].
///
/// Nodes are identified by their arena slot; slot 0 is the first key ever inserted.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvariantError {
    /// The root node has a parent back-reference.
    #[error("root at slot {root} has a parent")]
    RootHasParent {
        /// Arena slot of the root.
        root: usize,
    },
    /// A child's back-reference doesn't name the node that holds it.
    #[error("child at slot {child} does not point back to its parent at slot {parent}")]
    Parent {
        /// Arena slot of the parent.
        parent: usize,
        /// Arena slot of the child.
        child: usize,
    },
    /// A node's stored height disagrees with its children's heights.
    #[error("node at slot {node} stores height {stored} but its children imply {expected}")]
    Height {
        /// Arena slot of the node.
        node: usize,
        /// Height stored in the node.
        stored: u32,
        /// Height computed from the children.
        expected: u32,
    },
    /// A node's subtrees differ in height by more than one.
    #[error("node at slot {node} has balance factor {factor}")]
    Balance {
        /// Arena slot of the node.
        node: usize,
        /// Left height minus right height.
        factor: i64,
    },
    /// The in-order walk isn't strictly increasing.
    #[error("keys are not strictly increasing at in-order index {index}")]
    Order {
        /// Index of the first key that isn't greater than its predecessor.
        index: usize,
    },
    /// The recorded size disagrees with the number of reachable nodes.
    #[error("tree records {recorded} keys but {reachable} are reachable")]
    Size {
        /// What [`Tree::size`] reports.
        recorded: usize,
        /// How many nodes a walk from the root finds.
        reachable: usize,
    },
}

/// An ordered set of unique keys kept in a height balanced binary search tree.
///
/// Keys are arranged by the strict weak order `C` ([`Natural`] by default). Keys are never
/// removed and never move once inserted, so positions and handles stay valid for the lifetime of
/// the tree.
#[derive(Clone)]
pub struct Tree<K, C = Natural> {
    nodes: Arena<K>,
    root: Option<Handle>,
    len: usize,
    compare: C,
}

impl<K, C: Default> Default for Tree<K, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K> Tree<K> {
    /// Generates a new, empty `Tree` in ascending [`Ord`] order.
    ///
    /// Use [`Tree::default`] or [`Tree::with_comparator`] for other orders.
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, C> Tree<K, C> {
    /// Generates a new, empty `Tree` ordered by `compare`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_range::Tree;
    ///
    /// let mut tree = Tree::with_comparator(|a: &i32, b: &i32| a.abs() < b.abs());
    /// tree.insert(-3);
    /// tree.insert(2);
    ///
    /// // 3 is equivalent to -3 under this order.
    /// assert!(!tree.insert(3));
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![2, -3]);
    /// ```
    pub fn with_comparator(compare: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            compare,
        }
    }

    /// The comparator this tree orders its keys by.
    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Number of keys in the tree.
    pub fn size(&self) -> usize {
        self.len
    }

    /// Same as [`Tree::size`].
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels in the tree; 0 when empty.
    pub fn height(&self) -> u32 {
        self.nodes.height(self.root)
    }

    /// The key stored behind `handle`.
    ///
    /// ## Panics
    ///
    /// When `handle` was not handed out by this tree.
    pub fn key(&self, handle: Handle) -> &K {
        &self.nodes.get(handle).key
    }

    /// The key at `position`, or `None` for [`Position::End`].
    pub fn get(&self, position: Position) -> Option<&K> {
        position.handle().map(|handle| self.key(handle))
    }

    /// The position of the smallest key, or [`Position::End`] when empty.
    pub fn begin(&self) -> Position {
        self.root.map(|root| self.extreme(root, Side::Left)).into()
    }

    /// The past-the-end position.
    pub fn end(&self) -> Position {
        Position::End
    }

    /// The position of the largest key, or [`Position::End`] when empty.
    pub fn last(&self) -> Position {
        self.root.map(|root| self.extreme(root, Side::Right)).into()
    }

    /// The in-order successor of `position`.
    ///
    /// Moving past the largest key yields [`Position::End`], and `End` stays `End`.
    pub fn next(&self, position: Position) -> Position {
        match position {
            Position::At(handle) => self.step(handle, Side::Right),
            Position::End => Position::End,
        }
    }

    /// The in-order predecessor of `position`.
    ///
    /// Moving before the smallest key yields [`Position::End`]. The predecessor of `End` is the
    /// largest key, so a reverse walk can start from [`Tree::end`].
    pub fn prev(&self, position: Position) -> Position {
        match position {
            Position::At(handle) => self.step(handle, Side::Left),
            Position::End => self.last(),
        }
    }

    /// Number of [`Tree::next`] steps needed to get from `begin` to `end`, or `-1` if `end` can't
    /// be reached that way.
    ///
    /// When `begin` comes from [`Tree::lower_bound`] and `end` from [`Tree::upper_bound`] this is
    /// the number of keys in the closed range between the two query keys. The walk is linear in
    /// the answer, not logarithmic.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_range::Tree;
    ///
    /// let tree: Tree<i32> = [3, 5, 7].into_iter().collect();
    ///
    /// assert_eq!(tree.distance(tree.lower_bound(&3), tree.upper_bound(&7)), 3);
    /// assert_eq!(tree.distance(tree.end(), tree.begin()), -1);
    /// ```
    pub fn distance(&self, begin: Position, end: Position) -> i64 {
        self.checked_distance(begin, end)
            .map_or(-1, |steps| i64::try_from(steps).unwrap_or(i64::MAX))
    }

    /// Like [`Tree::distance`] but reports an unreachable `end` as `None`.
    pub fn checked_distance(&self, begin: Position, end: Position) -> Option<usize> {
        let mut steps = 0;
        let mut current = begin;
        while current != end {
            // Walked off the end without meeting `end`.
            let handle = current.handle()?;
            steps += 1;
            current = self.step(handle, Side::Right);
        }

        Some(steps)
    }

    /// Iterates over the keys in ascending order (as defined by the comparator).
    pub fn iter(&self) -> Iter<'_, K, C> {
        Iter {
            tree: self,
            front: self.begin(),
            back: self.last(),
            remaining: self.len,
        }
    }

    /// Checks every structural invariant of the tree: search order, AVL balance, stored heights,
    /// parent back-references and the recorded size.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        C: Compare<K>,
    {
        let Some(root) = self.root else {
            return match self.len {
                0 => Ok(()),
                recorded => Err(InvariantError::Size {
                    recorded,
                    reachable: 0,
                }),
            };
        };
        if self.nodes.get(root).parent.is_some() {
            return Err(InvariantError::RootHasParent {
                root: root.to_index(),
            });
        }

        // Children are visited after their parents so heights are checked against children that
        // may themselves be wrong; that's fine, the first bad node found is reported.
        let mut reachable = 0;
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            reachable += 1;
            let node = self.nodes.get(handle);
            for child in [node.left, node.right].into_iter().flatten() {
                if self.nodes.get(child).parent != Some(handle) {
                    return Err(InvariantError::Parent {
                        parent: handle.to_index(),
                        child: child.to_index(),
                    });
                }
                stack.push(child);
            }

            let expected = self.nodes.height(node.left).max(self.nodes.height(node.right)) + 1;
            if node.height != expected {
                return Err(InvariantError::Height {
                    node: handle.to_index(),
                    stored: node.height,
                    expected,
                });
            }
            let factor = self.nodes.balance_factor(handle);
            if factor.abs() > 1 {
                return Err(InvariantError::Balance {
                    node: handle.to_index(),
                    factor,
                });
            }
        }
        if reachable != self.len {
            return Err(InvariantError::Size {
                recorded: self.len,
                reachable,
            });
        }

        // Parent links are sound at this point so the positional walk terminates.
        let mut previous: Option<&K> = None;
        for (index, key) in self.iter().enumerate() {
            if let Some(previous) = previous {
                if !self.compare.less(previous, key) {
                    return Err(InvariantError::Order { index });
                }
            }
            previous = Some(key);
        }

        Ok(())
    }

    /// Renders the tree sideways, one node per line with its parent's key alongside.
    ///
    /// ```
    /// use avl_range::Tree;
    ///
    /// let tree: Tree<i32> = [2, 1, 3].into_iter().collect();
    /// assert_eq!(
    ///     tree.pretty(),
    ///     "└── 2 (parent: None)\n    ├── 1 (parent: Some(2))\n    └── 3 (parent: Some(2))\n"
    /// );
    /// ```
    pub fn pretty(&self) -> String
    where
        K: fmt::Debug,
    {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.pretty_node(&mut out, "", root, false);
        }
        out
    }

    fn pretty_node(&self, out: &mut String, prefix: &str, handle: Handle, is_left: bool)
    where
        K: fmt::Debug,
    {
        let node = self.nodes.get(handle);
        let parent = node.parent.map(|parent| self.key(parent));
        let branch = if is_left { "├── " } else { "└── " };
        // Writing into a `String` can't fail.
        let _ = writeln!(out, "{prefix}{branch}{:?} (parent: {parent:?})", node.key);

        let child_prefix = format!("{prefix}{}", if is_left { "│   " } else { "    " });
        for (child, is_left) in [(node.left, true), (node.right, false)] {
            if let Some(child) = child {
                self.pretty_node(out, &child_prefix, child, is_left);
            }
        }
    }

    /// Follows `side` links from `handle` as far as they go.
    fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.nodes.get(handle).child(side) {
            handle = child;
        }
        handle
    }

    /// One in-order step towards `side`: `Right` is the successor and `Left` the predecessor.
    fn step(&self, mut handle: Handle, side: Side) -> Position {
        if let Some(child) = self.nodes.get(handle).child(side) {
            return Position::At(self.extreme(child, side.opposite()));
        }

        // Climb until we arrive from the opposite side.
        while let Some(parent) = self.nodes.get(handle).parent {
            if self.nodes.get(parent).child(side.opposite()) == Some(handle) {
                return Position::At(parent);
            }
            handle = parent;
        }
        Position::End
    }
}

impl<K, C: Compare<K>> Tree<K, C> {
    /// Inserts `key` unless an equivalent key is already stored. Returns whether the key was
    /// inserted.
    ///
    /// An existing equivalent key is left untouched and `key` is dropped.
    pub fn insert(&mut self, key: K) -> bool {
        let Some(mut current) = self.root else {
            self.root = Some(self.nodes.alloc(Node::leaf(key, None)));
            self.len = 1;
            return true;
        };

        let side = loop {
            let node = self.nodes.get(current);
            let side = match self.compare.compare(&key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return false,
            };
            match node.child(side) {
                Some(child) => current = child,
                None => break side,
            }
        };

        let leaf = self.nodes.alloc(Node::leaf(key, Some(current)));
        self.nodes.get_mut(current).set_child(side, Some(leaf));
        self.len += 1;

        // Refresh and rebalance every ancestor, bottom-up.
        let mut ancestor = Some(current);
        while let Some(handle) = ancestor {
            let subtree = self.balance(handle);
            ancestor = self.nodes.get(subtree).parent;
        }

        debug_assert_eq!(self.nodes.len(), self.len);
        true
    }

    /// The first position whose key is not less than `key`.
    pub fn lower_bound(&self, key: &K) -> Position {
        let mut bound = Position::End;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if self.compare.less(&node.key, key) {
                current = node.right;
            } else {
                bound = Position::At(handle);
                current = node.left;
            }
        }
        bound
    }

    /// The first position whose key is greater than `key`.
    pub fn upper_bound(&self, key: &K) -> Position {
        let mut bound = Position::End;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if self.compare.less(key, &node.key) {
                bound = Position::At(handle);
                current = node.left;
            } else {
                current = node.right;
            }
        }
        bound
    }

    /// Number of stored keys `k` with `lhs <= k <= rhs`.
    ///
    /// This is `distance(lower_bound(lhs), upper_bound(rhs))`, so an inverted range whose bounds
    /// cross yields `-1`.
    pub fn range_count(&self, lhs: &K, rhs: &K) -> i64 {
        self.distance(self.lower_bound(lhs), self.upper_bound(rhs))
    }

    /// Refreshes the height of `handle` and rotates if its subtrees differ by two. Returns the
    /// node now occupying `handle`'s old spot.
    ///
    /// See https://en.wikipedia.org/wiki/AVL_tree#Rebalancing for terminology.
    fn balance(&mut self, handle: Handle) -> Handle {
        self.nodes.fix_height(handle);
        let rebalanced = match self.nodes.balance_factor(handle) {
            n if n > 1 => {
                let left = self.nodes.get(handle).left.expect("Left heavy => left child");
                if self.nodes.balance_factor(left) < 0 {
                    self.rotate(left, Side::Left);
                }
                self.rotate(handle, Side::Right)
            }
            n if n < -1 => {
                let right = self.nodes.get(handle).right.expect("Right heavy => right child");
                if self.nodes.balance_factor(right) > 0 {
                    self.rotate(right, Side::Right);
                }
                self.rotate(handle, Side::Left)
            }
            _ => handle,
        };

        if cfg!(debug_assertions) {
            let node = self.nodes.get(rebalanced);
            let left_height = self.nodes.height(node.left);
            let right_height = self.nodes.height(node.right);
            assert_eq!(node.height, left_height.max(right_height) + 1);
            assert!(left_height.abs_diff(right_height) <= 1);
        }
        rebalanced
    }

    /// Rotates `handle` towards `direction` and returns the promoted node.
    fn rotate(&mut self, handle: Handle, direction: Side) -> Handle {
        let node = self.nodes.get(handle);
        let child = node
            .child(direction.opposite())
            .expect("Rotating a node requires a child on its heavy side");
        let parent = node.parent.map(|parent| {
            let side = self
                .nodes
                .get(parent)
                .side_of(handle)
                .expect("Parent holds its child");
            (parent, side)
        });
        let local = Local {
            node: handle,
            parent,
            child,
            inner: self.nodes.get(child).child(direction),
        };

        let rotation = rotate::rotate(direction, local);
        for relink in rotation.relinks() {
            self.nodes.apply(relink);
        }
        self.nodes.fix_height(rotation.demoted);
        self.nodes.fix_height(rotation.root);
        if rotation.is_new_root() {
            self.root = Some(rotation.root);
        }

        rotation.root
    }
}

impl<K: fmt::Debug, C> fmt::Debug for Tree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, C: Compare<K>> Extend<K> for Tree<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K, C: Compare<K> + Default> FromIterator<K> for Tree<K, C> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, C> IntoIterator for &'a Tree<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An in-order iterator over the keys of a [`Tree`], created by [`Tree::iter`].
pub struct Iter<'a, K, C> {
    tree: &'a Tree<K, C>,
    front: Position,
    back: Position,
    remaining: usize,
}

impl<'a, K, C> Clone for Iter<'a, K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, C> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.get(self.front)?;
        self.front = self.tree.next(self.front);
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, C> DoubleEndedIterator for Iter<'a, K, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.get(self.back)?;
        self.back = self.tree.prev(self.back);
        self.remaining -= 1;
        Some(key)
    }
}

impl<K, C> ExactSizeIterator for Iter<'_, K, C> {}

impl<K, C> FusedIterator for Iter<'_, K, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Reversed;

    /// Assert the heights of the root, left child, and right child of a tree.
    macro_rules! assert_heights {
        ($tree:ident, $height:expr, $left_height:expr, $right_height:expr) => {{
            match $tree.root {
                Some(root) => {
                    let n = $tree.nodes.get(root);
                    assert_eq!(n.height, $height);
                    assert_eq!($tree.nodes.height(n.left), $left_height);
                    assert_eq!($tree.nodes.height(n.right), $right_height);
                }
                None => assert_eq!(0, $height),
            }
        }};
    }

    fn three_five_seven() -> Tree<i32> {
        let mut tree = Tree::new();
        tree.insert(5);
        tree.insert(3);
        tree.insert(7);
        tree
    }

    fn keys<C>(tree: &Tree<i32, C>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn empty_tree() {
        let tree: Tree<i32> = Tree::new();

        assert_eq!(tree.size(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.begin(), tree.end());
        assert_eq!(tree.last(), Position::End);
        assert_eq!(tree.lower_bound(&1), Position::End);
        assert_eq!(tree.upper_bound(&1), Position::End);
        assert_eq!(tree.distance(tree.begin(), tree.end()), 0);
        assert_heights!(tree, 0, 0, 0);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn insert_root_and_size() {
        let mut tree = Tree::new();

        assert!(tree.insert(5));
        assert_eq!(tree.size(), 1);
        assert_heights!(tree, 1, 0, 0);

        assert!(tree.insert(3));
        assert_eq!(tree.size(), 2);

        assert!(tree.insert(7));
        assert_eq!(tree.size(), 3);

        assert!(!tree.insert(5));
        assert_eq!(tree.size(), 3);
        assert_heights!(tree, 2, 1, 1);
    }

    #[test]
    fn custom_comparator() {
        let mut tree: Tree<i32, Reversed> = Tree::default();
        tree.extend([5, 3, 7, 5]);

        assert_eq!(tree.size(), 3);
        assert_eq!(keys(&tree), vec![7, 5, 3]);
        // "Not less than 6" means 6 or smaller under a descending order.
        assert_eq!(tree.get(tree.lower_bound(&6)), Some(&5));
        assert_eq!(tree.get(tree.upper_bound(&5)), Some(&3));
        assert_eq!(tree.range_count(&7, &4), 2);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn lower_bound_between_keys() {
        let tree = three_five_seven();

        assert_eq!(tree.get(tree.lower_bound(&4)), Some(&5));
        assert_eq!(tree.get(tree.lower_bound(&5)), Some(&5));
        assert_eq!(tree.get(tree.lower_bound(&i32::MIN)), Some(&3));
        assert_eq!(tree.lower_bound(&8), Position::End);
    }

    #[test]
    fn upper_bound_past_every_key_is_end() {
        let tree = three_five_seven();

        assert_eq!(tree.upper_bound(&10), tree.end());
        assert_eq!(tree.upper_bound(&7), tree.end());
    }

    #[test]
    fn upper_bound_not_end() {
        let tree = three_five_seven();

        assert_eq!(tree.get(tree.upper_bound(&6)), Some(&7));
        assert_eq!(tree.get(tree.upper_bound(&5)), Some(&7));
        assert_eq!(tree.get(tree.upper_bound(&2)), Some(&3));
    }

    #[test]
    fn distance_inside_the_range() {
        let tree = three_five_seven();

        let lower = tree.lower_bound(&2);
        assert_eq!(tree.get(lower), Some(&3));
        let upper = tree.upper_bound(&6);
        assert_eq!(tree.get(upper), Some(&7));

        assert_eq!(tree.distance(lower, upper), 2);
    }

    #[test]
    fn distance_to_end() {
        let tree = three_five_seven();

        let lower = tree.lower_bound(&3);
        let upper = tree.upper_bound(&7);
        assert!(upper.is_end());

        assert_eq!(tree.distance(lower, upper), 3);
        assert_eq!(tree.checked_distance(lower, upper), Some(3));
    }

    #[test]
    fn distance_is_minus_one_when_unreachable() {
        let tree = three_five_seven();

        // `end` before `begin`.
        let seven = tree.lower_bound(&7);
        let three = tree.lower_bound(&3);
        assert_eq!(tree.distance(seven, three), -1);
        assert_eq!(tree.checked_distance(seven, three), None);

        // Starting from the sentinel.
        assert_eq!(tree.distance(tree.end(), three), -1);
        assert_eq!(tree.distance(tree.end(), tree.end()), 0);
        assert_eq!(tree.distance(seven, seven), 0);

        // Crossed bounds.
        assert_eq!(tree.range_count(&6, &4), -1);
        assert_eq!(tree.range_count(&5, &4), 0);
    }

    #[test]
    fn next_and_prev_walk_in_order() {
        let tree: Tree<i32> = (0..20).rev().collect();

        let mut forward = Vec::new();
        let mut position = tree.begin();
        while let Some(key) = tree.get(position) {
            forward.push(*key);
            position = tree.next(position);
        }
        assert_eq!(forward, (0..20).collect::<Vec<_>>());

        let mut backward = Vec::new();
        let mut position = tree.prev(tree.end());
        while let Some(key) = tree.get(position) {
            backward.push(*key);
            position = tree.prev(position);
        }
        assert_eq!(backward, (0..20).rev().collect::<Vec<_>>());

        assert_eq!(tree.next(tree.end()), Position::End);
    }

    #[test]
    fn always_adding_left() {
        let mut tree = Tree::new();
        for key in (1..=10).rev() {
            tree.insert(key);
            assert_eq!(tree.check_invariants(), Ok(()));
        }

        assert_eq!(keys(&tree), (1..=10).collect::<Vec<_>>());
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn always_adding_right() {
        let mut tree = Tree::new();
        for key in 1..=10 {
            tree.insert(key);
            assert_eq!(tree.check_invariants(), Ok(()));
        }

        assert_eq!(keys(&tree), (1..=10).collect::<Vec<_>>());
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn test_left_right_rebalance() {
        let mut tree = Tree::new();

        tree.insert(0);
        tree.insert(-2);
        tree.insert(-1);

        assert_heights!(tree, 2, 1, 1);
        assert_eq!(tree.get(tree.root.into()), Some(&-1));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn test_right_left_rebalance() {
        let mut tree = Tree::new();

        tree.insert(0);
        tree.insert(2);
        tree.insert(1);

        assert_heights!(tree, 2, 1, 1);
        assert_eq!(tree.get(tree.root.into()), Some(&1));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn rotate_right_fixes_parent_pointers() {
        let mut tree = Tree::new();

        tree.insert(5);
        tree.insert(3);
        tree.insert(9);
        tree.insert(4);
        tree.insert(2);
        tree.insert(1);

        // 5 rotated down to the right of 3, taking 4 with it.
        let three = tree.root.unwrap();
        assert_eq!(*tree.key(three), 3);
        let five = tree.nodes.get(three).right.unwrap();
        let four = tree.nodes.get(five).left.unwrap();
        let nine = tree.nodes.get(five).right.unwrap();

        assert_eq!(*tree.key(four), 4);
        assert_eq!(tree.nodes.get(four).parent, Some(five));
        assert_eq!(tree.nodes.get(nine).parent, Some(five));
        assert_eq!(tree.nodes.get(five).parent, Some(three));
        assert_eq!(tree.nodes.get(three).parent, None);
    }

    #[test]
    fn rotate_left_fixes_parent_pointers() {
        let mut tree = Tree::new();

        tree.insert(-5);
        tree.insert(-3);
        tree.insert(-9);
        tree.insert(-4);
        tree.insert(-2);
        tree.insert(-1);

        let three = tree.root.unwrap();
        assert_eq!(*tree.key(three), -3);
        let five = tree.nodes.get(three).left.unwrap();
        let four = tree.nodes.get(five).right.unwrap();

        assert_eq!(*tree.key(four), -4);
        assert_eq!(tree.nodes.get(four).parent, Some(five));
        assert_eq!(tree.nodes.get(five).parent, Some(three));
    }

    #[test]
    fn handles_survive_rotations() {
        let mut tree = Tree::new();
        tree.insert(1);
        let one = tree.begin().handle().unwrap();

        // Plenty of rotations at and above `1`.
        tree.extend(2..100);

        assert_eq!(*tree.key(one), 1);
        assert_eq!(tree.begin(), Position::At(one));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn iter_is_double_ended() {
        let tree: Tree<i32> = [4, 2, 6, 1, 3, 5, 7].into_iter().collect();

        let mut iter = tree.iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&7));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.rev().copied().collect::<Vec<_>>(), vec![6, 5, 4, 3]);
    }

    #[test]
    fn broken_links_are_reported() {
        let mut tree = three_five_seven();
        let root = tree.root.unwrap();
        let left = tree.nodes.get(root).left.unwrap();

        tree.nodes.get_mut(left).parent = None;
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantError::Parent {
                parent: root.to_index(),
                child: left.to_index(),
            })
        );

        tree.nodes.get_mut(left).parent = Some(root);
        tree.nodes.get_mut(root).height = 7;
        assert!(matches!(
            tree.check_invariants(),
            Err(InvariantError::Height { stored: 7, .. })
        ));

        tree.nodes.get_mut(root).height = 2;
        tree.len = 4;
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantError::Size {
                recorded: 4,
                reachable: 3
            })
        );
    }

    #[test]
    fn out_of_order_keys_are_reported() {
        let mut tree = three_five_seven();
        let root = tree.root.unwrap();
        let right = tree.nodes.get(root).right.unwrap();

        tree.nodes.get_mut(right).key = 4;
        assert_eq!(tree.check_invariants(), Err(InvariantError::Order { index: 2 }));
    }

    #[test]
    fn debug_lists_keys_in_order() {
        let tree = three_five_seven();

        assert_eq!(format!("{tree:?}"), "{3, 5, 7}");
    }

    #[test]
    fn pretty_shows_parents() {
        let tree = three_five_seven();

        assert_eq!(
            tree.pretty(),
            "└── 5 (parent: None)\n    ├── 3 (parent: Some(5))\n    └── 7 (parent: Some(5))\n"
        );
    }
}
