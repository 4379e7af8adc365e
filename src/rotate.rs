//! The AVL rotation step, expressed as a pure function over handles.
//!
//! A rotation touches at most four nodes: the node being rotated, its child on the heavy side
//! (which gets promoted), that child's inner subtree (which changes hands) and the parent whose
//! child slot now names the promoted node. [`rotate`] describes the rewiring as a list of
//! [`Relink`]s without touching the arena so it can be checked in isolation; the tree applies
//! them and then recomputes heights.
//!
//! ```text
//!    Option<parent>              Option<parent>
//!      /                           /
//!    node                        child
//!    /  \         rotate left    /    \
//!   x   child        ->        node    z
//!       /   \                  /  \
//!    inner   z                x  inner
//! ```

use crate::node::Handle;

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One link to rewrite after a rotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Relink {
    /// Point `node`'s `side` child slot at `child`.
    Child {
        node: Handle,
        side: Side,
        child: Option<Handle>,
    },
    /// Point `node`'s parent back-reference at `parent`.
    Parent { node: Handle, parent: Option<Handle> },
}

/// The neighbourhood of a rotation, read from the tree before anything moves.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Local {
    /// The node being rotated down.
    pub(crate) node: Handle,
    /// `node`'s parent and the slot `node` occupies in it. `None` when `node` is the root.
    pub(crate) parent: Option<(Handle, Side)>,
    /// `node`'s child on the side opposite the rotation direction. It gets promoted.
    pub(crate) child: Handle,
    /// `child`'s subtree on the rotation side. It is handed over to `node`.
    pub(crate) inner: Option<Handle>,
}

/// The result of [`rotate`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rotation {
    /// The promoted node; it now sits where `Local::node` used to.
    pub(crate) root: Handle,
    /// The node whose heights must be recomputed first (it moved below `root`).
    pub(crate) demoted: Handle,
    relinks: [Relink; 4],
    reattached: Option<Relink>,
    ancestor: Option<Relink>,
}

impl Rotation {
    /// Every link that has to be written for the rotation to take effect.
    pub(crate) fn relinks(&self) -> impl Iterator<Item = Relink> + '_ {
        self.relinks.iter().copied().chain(self.reattached).chain(self.ancestor)
    }

    /// Whether the rotated subtree became the root of the whole tree.
    pub(crate) fn is_new_root(&self) -> bool {
        self.ancestor.is_none()
    }
}

/// Rotates `local.node` towards `direction`.
///
/// A left rotation promotes the right child and a right rotation promotes the left child. The
/// in-order sequence of the subtree is unchanged.
pub(crate) fn rotate(direction: Side, local: Local) -> Rotation {
    let heavy = direction.opposite();
    let Local {
        node,
        parent,
        child,
        inner,
    } = local;

    Rotation {
        root: child,
        demoted: node,
        relinks: [
            Relink::Child {
                node,
                side: heavy,
                child: inner,
            },
            Relink::Child {
                node: child,
                side: direction,
                child: Some(node),
            },
            Relink::Parent {
                node,
                parent: Some(child),
            },
            Relink::Parent {
                node: child,
                parent: parent.map(|(p, _)| p),
            },
        ],
        reattached: inner.map(|inner| Relink::Parent {
            node: inner,
            parent: Some(node),
        }),
        ancestor: parent.map(|(p, side)| Relink::Child {
            node: p,
            side,
            child: Some(child),
        }),
    }
}
