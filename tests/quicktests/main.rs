//! Property tests driving the public API against `BTreeSet`.

mod tree;
