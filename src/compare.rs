//! Strict weak orders used to arrange keys in a [`Tree`][crate::Tree].
//!
//! Only [`Compare::less`] has to be implemented. Two keys are treated as equivalent (and so as
//! duplicates) when neither is less than the other.
//!
//! # Examples
//!
//! ```
//! use avl_range::{Reversed, Tree};
//!
//! let mut tree: Tree<i32, Reversed> = Tree::default();
//! tree.extend([5, 3, 7]);
//!
//! // Largest first.
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![7, 5, 3]);
//! ```

use std::cmp::Ordering;

/// A strict weak order over `K`.
///
/// Implementations must be irreflexive and transitive, and equivalence (`!less(a, b) &&
/// !less(b, a)`) must be transitive too. A comparator that breaks these rules won't cause
/// undefined behaviour but the tree's answers become meaningless.
pub trait Compare<K: ?Sized> {
    /// Returns `true` if `lhs` is ordered strictly before `rhs`.
    fn less(&self, lhs: &K, rhs: &K) -> bool;

    /// Three-way comparison built from two calls to [`Compare::less`].
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        if self.less(lhs, rhs) {
            Ordering::Less
        } else if self.less(rhs, lhs) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Ascending order via [`Ord`]. This is the default comparator of a [`Tree`][crate::Tree].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline]
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        lhs < rhs
    }

    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Descending order via [`Ord`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reversed;

impl<K: Ord + ?Sized> Compare<K> for Reversed {
    #[inline]
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        lhs > rhs
    }

    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        rhs.cmp(lhs)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        self(lhs, rhs)
    }
}
