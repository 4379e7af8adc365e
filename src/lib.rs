//! An ordered set backed by an AVL tree, with positions that can walk in both directions and
//! count the keys between them.
//!
//! ## AVL trees
//!
//! A Binary Search Tree keeps, for every node, all smaller keys in its left subtree and all
//! larger keys in its right subtree. Lookups take `O(height)`. An AVL tree additionally keeps the
//! heights of every node's two subtrees within one of each other, rotating nodes after each
//! insertion when they drift further apart. That bounds the height to `O(lg N)`.
//!
//! ## Positions
//!
//! [`Tree::lower_bound`] and [`Tree::upper_bound`] return a [`Position`]: either a stored key or
//! [`Position::End`]. Every node remembers its parent so a position can step to its in-order
//! successor or predecessor, and [`Tree::distance`] counts the steps between two positions. With
//! both bounds that answers "how many keys lie in `[lhs, rhs]`?" in time linear in the answer.
//!
//! ```
//! use avl_range::Tree;
//!
//! let tree: Tree<i32> = [5, 3, 7].into_iter().collect();
//!
//! assert_eq!(tree.range_count(&2, &6), 2);
//! assert_eq!(tree.range_count(&3, &7), 3);
//! ```
//!
//! The [`script`] module replays text scripts of insertions and range counts against a tree and
//! against [`std::collections::BTreeSet`]; the `avl-range` binary wraps it.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod compare;
mod node;
mod rotate;
pub mod script;
mod timer;
mod tree;

pub use compare::{Compare, Natural, Reversed};
pub use node::Handle;
pub use timer::Timer;
pub use tree::{InvariantError, Iter, Position, Tree};
