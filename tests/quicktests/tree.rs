use avl_range::script::{self, Instruction, RangeSet, Script};
use avl_range::{Position, Reversed, Tree};

use std::collections::BTreeSet;

use quickcheck::quickcheck;

/// Inserts every element of `xs` into a tree and a set.
fn build(xs: &[i64]) -> (Tree<i64>, BTreeSet<i64>) {
    let mut tree = Tree::new();
    let mut set = BTreeSet::new();
    for &x in xs {
        assert_eq!(tree.insert(x), set.insert(x));
    }

    (tree, set)
}

quickcheck! {
    fn size_counts_distinct_keys(xs: Vec<i64>) -> bool {
        let (tree, set) = build(&xs);

        tree.size() == set.len() && tree.check_invariants().is_ok()
    }

    fn next_visits_every_key_once(xs: Vec<i64>) -> bool {
        let (tree, set) = build(&xs);

        let mut visited = Vec::new();
        let mut position = tree.begin();
        while let Some(&key) = tree.get(position) {
            visited.push(key);
            position = tree.next(position);
        }

        visited.iter().eq(set.iter())
    }

    fn prev_reverses_next(xs: Vec<i64>) -> bool {
        let (tree, set) = build(&xs);

        let mut visited = Vec::new();
        let mut position = tree.last();
        while let Some(&key) = tree.get(position) {
            visited.push(key);
            position = tree.prev(position);
        }

        visited.iter().eq(set.iter().rev())
    }

    fn bounds_match_the_reference(xs: Vec<i64>, probes: Vec<i64>) -> bool {
        let (tree, set) = build(&xs);

        probes.iter().chain(&xs).all(|&k| {
            let lower = set.range(k..).next();
            let upper = set.range(k..).find(|&&x| x > k);
            tree.get(tree.lower_bound(&k)) == lower && tree.get(tree.upper_bound(&k)) == upper
        })
    }

    fn distance_counts_the_closed_range(xs: Vec<i64>, ranges: Vec<(i64, i64)>) -> bool {
        let (tree, set) = build(&xs);

        ranges.iter().all(|&(a, b)| {
            let (lhs, rhs) = (a.min(b), a.max(b));
            let expected = set.range(lhs..=rhs).count() as i64;
            tree.distance(tree.lower_bound(&lhs), tree.upper_bound(&rhs)) == expected
        })
    }

    fn reversed_order_mirrors_natural_order(xs: Vec<i32>) -> bool {
        let natural: Tree<i32> = xs.iter().copied().collect();
        let reversed: Tree<i32, Reversed> = xs.iter().copied().collect();

        natural.iter().rev().eq(reversed.iter()) && reversed.check_invariants().is_ok()
    }

    fn scripts_agree_with_btreeset(inserts: Vec<i64>, queries: Vec<(i64, i64)>) -> bool {
        let instructions: Vec<Instruction> = inserts
            .iter()
            .map(|&k| Instruction::Insert(k))
            .chain(queries.iter().map(|&(lhs, rhs)| Instruction::Count { lhs, rhs }))
            .collect();

        script::compare(&Script::from(instructions)).agrees()
    }
}

#[test]
fn three_keys_walkthrough() {
    let (mut tree, _) = build(&[5, 3, 7]);
    tree.insert(5);
    assert_eq!(tree.size(), 3);

    assert_eq!(tree.get(tree.lower_bound(&4)), Some(&5));
    assert_eq!(tree.upper_bound(&10), Position::End);
    assert_eq!(tree.get(tree.upper_bound(&6)), Some(&7));
    assert_eq!(tree.distance(tree.lower_bound(&2), tree.upper_bound(&6)), 2);
    assert_eq!(tree.distance(tree.lower_bound(&3), tree.upper_bound(&7)), 3);

    let set: BTreeSet<i64> = [3, 5, 7].into_iter().collect();
    assert_eq!(RangeSet::range_count(&set, 2, 6), 2);
    assert_eq!(RangeSet::range_count(&tree, 2, 6), 2);
}
