use std::num::NonZeroU32;

use crate::rotate::{Relink, Side};

/// A stable reference to a node stored in a [`Tree`][crate::Tree].
///
/// Nodes are never moved or freed while the tree is alive so a `Handle` stays valid for the
/// lifetime of the tree that handed it out. Using a `Handle` with a different tree is a logic
/// error (it may panic or name an unrelated key) but never undefined behaviour.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// The largest arena index a `Handle` can name.
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    pub(crate) fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        // `index + 1` is at most `u32::MAX` so it neither overflows nor hits zero.
        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as u32;
        Self(NonZeroU32::new(raw).expect("index + 1 is never zero"))
    }

    pub(crate) fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// One stored key plus the links that place it in the tree.
///
/// `left` and `right` are the owning edges (conceptually - the arena owns the storage).
/// `parent` only exists so successor/predecessor walks can climb the tree.
#[derive(Clone, Debug)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    /// How many levels are in the subtree rooted at this node.
    /// A node with no children has a height of 1.
    pub(crate) height: u32,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) parent: Option<Handle>,
}

impl<K> Node<K> {
    pub(crate) fn leaf(key: K, parent: Option<Handle>) -> Self {
        Self {
            key,
            height: 1,
            left: None,
            right: None,
            parent,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Which slot of this node holds `child`, if either does.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Backing storage for every node of a tree.
///
/// There is no deletion so slots are only ever appended. Dropping the arena drops every key in
/// one pass without following any links.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K> {
    nodes: Vec<Node<K>>,
}

impl<K> Arena<K> {
    pub(crate) const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn alloc(&mut self, node: Node<K>) -> Handle {
        assert!(
            self.nodes.len() <= Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX
        );
        self.nodes.push(node);
        Handle::from_index(self.nodes.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &Node<K> {
        &self.nodes[handle.to_index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut Node<K> {
        &mut self.nodes[handle.to_index()]
    }

    /// Height of an optional subtree; an absent child has height 0.
    #[inline]
    pub(crate) fn height(&self, handle: Option<Handle>) -> u32 {
        handle.map_or(0, |h| self.get(h).height)
    }

    /// Left height minus right height.
    pub(crate) fn balance_factor(&self, handle: Handle) -> i64 {
        let node = self.get(handle);
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    /// Writes a single link produced by [`crate::rotate::rotate`].
    pub(crate) fn apply(&mut self, relink: Relink) {
        match relink {
            Relink::Child { node, side, child } => self.get_mut(node).set_child(side, child),
            Relink::Parent { node, parent } => self.get_mut(node).parent = parent,
        }
    }

    /// Recomputes the height of `handle` from its children.
    pub(crate) fn fix_height(&mut self, handle: Handle) {
        let node = self.get(handle);
        let height = self.height(node.left).max(self.height(node.right)) + 1;
        self.get_mut(handle).height = height;
    }
}
