use super::*;

qc!(dfi_depth, _dfi_depth);
fn _dfi_depth(tree: PrefixTree<TestPrefix>) -> bool {
    let mut visited = HashSet::new();
    for (node, depth) in tree.dfi() {
        // pre-order: the parent is always visited first
        if let Some(parent) = node.parent() {
            if !visited.contains(&parent.id()) {
                return false;
            }
        }
        if node.depth() != depth {
            return false;
        }
        visited.insert(node.id());
    }
    visited.len() == tree.len()
}

qc!(subtree, _subtree);
fn _subtree((tree, start): (PrefixTree<TestPrefix>, TestPrefix)) -> bool {
    let mut want: Vec<TestPrefix> = tree
        .dfi()
        .map(|(n, _)| *n.prefix())
        .filter(|p| start.contains(p))
        .collect();
    want.sort();
    if let Some(node) = tree.find(&start) {
        let mut acq: Vec<TestPrefix> = node.dfi().map(|(n, _)| *n.prefix()).collect();
        acq.sort();
        acq == want
    } else {
        !want.contains(&start)
    }
}

qc!(dfi_part, _dfi_part);
fn _dfi_part((tree, filter): (PrefixTree<TestPrefix>, Vec<TestPrefix>)) -> bool {
    let accept = |p: &TestPrefix| filter.iter().any(|f| f.contains(p));
    // a node is visited iff all its ancestors are accepted
    let want: Vec<_> = tree
        .dfi()
        .filter(|(n, _)| n.ancestors().all(|a| accept(a.prefix())))
        .map(|(n, d)| (n.id(), d, accept(n.prefix())))
        .collect();
    let acq: Vec<_> = tree
        .dfi_part(accept)
        .map(|(n, d, f)| (n.id(), d, f))
        .collect();
    acq == want
}
