use std::collections::HashSet;

use super::*;

qc!(new, _new);
fn _new(list: Vec<TestPrefix>) -> bool {
    let mut tree = PrefixTree::default();
    let mut hset = HashSet::new();
    let root = TestPrefix::zero();

    for p in list {
        let expected = if p == root {
            Ok(false)
        } else if hset.insert(p) {
            Ok(true)
        } else {
            Err(TreeError::DuplicatePrefix(p))
        };
        if tree.insert(p).map(|id| id.is_some()) != expected {
            return false;
        }
    }

    let mut want: Vec<_> = hset.into_iter().collect();
    want.push(root);
    want.sort();
    invariants(&tree) && sorted_prefixes(&tree) == want
}

qc!(new_mods, _new_mods);
fn _new_mods(list: Vec<Operation<TestPrefix>>) -> bool {
    let mut tree = PrefixTree::default();

    for op in list {
        match op {
            Operation::Insert(p) => {
                let _ = tree.insert(p);
            }
            Operation::Prune(p) => {
                let _ = tree.prune(&p);
            }
            Operation::Renumber(a, b) => {
                let _ = tree.renumber(&a, &b);
            }
        }
        if !invariants(&tree) {
            return false;
        }
    }
    true
}

qc!(insertion_order, _insertion_order);
fn _insertion_order(list: Vec<TestPrefix>) -> bool {
    let mut forward = build(list.iter().copied());
    let mut backward = build(list.iter().rev().copied());
    forward.sort();
    backward.sort();
    forward == backward
}

qc!(find_loose, _find_loose);
fn _find_loose((tree, p): (PrefixTree<TestPrefix>, TestPrefix)) -> bool {
    let want = tree
        .dfi()
        .map(|(n, _)| *n.prefix())
        .filter(|q| q.contains(&p))
        .max_by_key(|q| q.1);
    let found = tree.find(&p).map(|n| *n.prefix());
    tree.find_loose(&p).map(|n| *n.prefix()) == want
        && found == want.filter(|q| *q == p)
}

qc!(prune_graft, _prune_graft);
fn _prune_graft((mut tree, p): (PrefixTree<TestPrefix>, TestPrefix)) -> bool {
    let mut orig = tree.clone();
    match tree.prune(&p) {
        Err(TreeError::RootRemoval(_)) => p == TestPrefix::zero(),
        Err(_) => false,
        Ok(None) => tree == orig,
        Ok(Some(sub)) => {
            if tree.len() + sub.len() != orig.len()
                || sub.dfi().any(|(n, _)| tree.find(n.prefix()).is_some())
                || !invariants(&tree)
                || !invariants(&sub)
            {
                return false;
            }
            if tree.graft(sub).map(|id| id.is_some()) != Ok(true) {
                return false;
            }
            tree.sort();
            orig.sort();
            tree == orig
        }
    }
}

qc!(graft_atomic, _graft_atomic);
fn _graft_atomic((mut tree, sub): (PrefixTree<TestPrefix>, PrefixTree<TestPrefix>)) -> bool {
    // graft the children of `sub` one by one, as standalone trees
    let orig_len = tree.len();
    let mut added = 0;
    for (child, _) in sub.dfi().filter(|(_, d)| *d == 1) {
        let mut standalone = PrefixTree::new(*child.prefix());
        for (n, _) in child.dfi().skip(1) {
            let _ = standalone.insert(*n.prefix());
        }
        let before = tree.clone();
        match tree.graft(standalone.clone()) {
            Ok(Some(_)) => added += standalone.len(),
            Ok(None) => return false,
            Err(TreeError::DuplicatePrefix(p)) => {
                if tree != before || standalone.find(&p).is_none() || tree.find(&p).is_none() {
                    return false;
                }
            }
            Err(_) => return false,
        }
        if !invariants(&tree) {
            return false;
        }
    }
    tree.len() == orig_len + added
}

qc!(renumber_atomic, _renumber_atomic);
fn _renumber_atomic(
    (mut tree, old, new): (PrefixTree<TestPrefix>, TestPrefix, TestPrefix),
) -> bool {
    let orig = tree.clone();
    match tree.renumber(&old, &new) {
        Ok(id) => {
            let root = tree.get(id).map(|n| *n.prefix());
            invariants(&tree)
                && tree.len() == orig.len()
                && root == Some(old.renumbered(&new))
                && tree.find(&old).is_none() == (old != old.renumbered(&new))
        }
        Err(_) => tree == orig && invariants(&tree),
    }
}
