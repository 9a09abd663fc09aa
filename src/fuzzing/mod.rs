//! Module for testing using fuzzing (quickcheck)

use std::collections::HashSet;
use std::fmt::Debug;

use crate::tree::key;
use crate::*;
use quickcheck::Arbitrary;

mod basic;
mod traversals;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<P> {
    Insert(P),
    Prune(P),
    Renumber(P, P),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 10000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    // sample all inputs
    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // if we reach this point, then all shrunken inputs work. Therefore, `inputs` is the minimal
    // input
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

/// Build a tree rooted at the zero prefix, ignoring rejected inserts and duplicates.
fn build<P: Prefix>(list: impl IntoIterator<Item = P>) -> PrefixTree<P> {
    let mut tree = PrefixTree::default();
    for p in list {
        let _ = tree.insert(p);
    }
    tree
}

/// All prefixes of the tree (including the root), sorted.
fn sorted_prefixes<P: Prefix + Ord>(tree: &PrefixTree<P>) -> Vec<P> {
    let mut prefixes: Vec<P> = tree.dfi().map(|(n, _)| n.prefix().clone()).collect();
    prefixes.sort();
    prefixes
}

/// Check the structural invariants of a tree:
/// - children are strictly contained in their parent and link back to it,
/// - siblings are disjoint,
/// - hosts have no children,
/// - the exact-match index knows every child,
/// - no prefix appears twice, and `len` counts every node.
fn invariants<P: Prefix>(tree: &PrefixTree<P>) -> bool {
    let mut seen = HashSet::new();
    for (node, _) in tree.dfi() {
        if !seen.insert(key(node.prefix())) {
            return false;
        }
        if node.prefix().is_host() && node.num_children() > 0 {
            return false;
        }
        let children: Vec<_> = node.children().collect();
        for (i, child) in children.iter().enumerate() {
            if !node.prefix().strictly_contains(child.prefix())
                || child.parent().map(|p| p.id()) != Some(node.id())
                || !node.has_child(child.prefix())
            {
                return false;
            }
            if children[i + 1..].iter().any(|other| {
                other.prefix().contains(child.prefix()) || child.prefix().contains(other.prefix())
            }) {
                return false;
            }
        }
    }
    seen.len() == tree.len()
}

impl<P: Prefix + Arbitrary> Arbitrary for PrefixTree<P> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        build(<Vec<P> as Arbitrary>::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let elems: Vec<P> = self
            .dfi()
            .skip(1)
            .map(|(n, _)| n.prefix().clone())
            .collect();
        Box::new(elems.shrink().map(build))
    }
}

impl<P: Arbitrary> Arbitrary for Operation<P> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let p = P::arbitrary(g);
        match g
            .choose(&[0, 0, 0, 0, 0, 0, 0, 1, 1, 2])
            .copied()
            .unwrap_or_default()
        {
            0 => Self::Insert(p),
            1 => Self::Prune(p),
            _ => Self::Renumber(p, P::arbitrary(g)),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Insert(p) => Box::new(p.clone().shrink().map(Operation::Insert)),
            Operation::Prune(p) => Box::new(p.clone().shrink().map(Operation::Prune)),
            Operation::Renumber(a, b) => {
                let b = b.clone();
                Box::new(
                    a.clone()
                        .shrink()
                        .map(move |a| Operation::Renumber(a, b.clone())),
                )
            }
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u32, u8);

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addr = format!("{:032b}", self.0)[..10].to_string();
        write!(f, "0b{addr}/{}", self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
                32, 32, 32,
            ])
            .unwrap();
        let x = u32::arbitrary(g);
        Self::from_repr_len(x, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            let len = self.1 - 1;
            let x = Self::from_repr_len(self.0, len);
            quickcheck::single_shrinker(x)
        }
    }
}

impl Prefix for TestPrefix {
    type R = u32;

    fn repr(&self) -> Self::R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: Self::R, len: u8) -> Self {
        let x = Prefix::mask(&(repr, len));
        Self(x, len)
    }
}
