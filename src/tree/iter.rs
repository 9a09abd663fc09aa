//! Traversals over a [`PrefixTree`]. None of them mutate the tree.

use std::slice;

use super::{NodeRef, PrefixTree};
use crate::Prefix;

/// Pre-order depth-first traversal, yielding every node with its relative depth. Created by
/// [`PrefixTree::dfi`] and [`NodeRef::dfi`]. Cloning the iterator restarts the traversal from the
/// clone's current position.
#[derive(Clone)]
pub struct Dfi<'a, P: Prefix> {
    tree: &'a PrefixTree<P>,
    stack: Vec<(usize, usize)>,
}

impl<'a, P: Prefix> Dfi<'a, P> {
    pub(crate) fn new(tree: &'a PrefixTree<P>, start: usize) -> Self {
        Self {
            tree,
            stack: vec![(start, 0)],
        }
    }
}

impl<'a, P: Prefix> Iterator for Dfi<'a, P> {
    type Item = (NodeRef<'a, P>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, depth) = self.stack.pop()?;
        let children = &self.tree.table[idx].children;
        self.stack
            .extend(children.iter().rev().map(|&child| (child, depth + 1)));
        Some((NodeRef::new(self.tree, idx), depth))
    }
}

/// Pre-order depth-first traversal that only descends below nodes accepted by a filter. Created
/// by [`PrefixTree::dfi_part`] and [`NodeRef::dfi_part`].
///
/// Each item is `(node, depth, in_filter)`. A node outside the filter is still yielded (with
/// `in_filter == false`), but its children are not visited.
#[derive(Clone)]
pub struct DfiPart<'a, P: Prefix, F> {
    tree: &'a PrefixTree<P>,
    stack: Vec<(usize, usize)>,
    filter: F,
}

impl<'a, P: Prefix, F> DfiPart<'a, P, F> {
    pub(crate) fn new(tree: &'a PrefixTree<P>, start: usize, filter: F) -> Self {
        Self {
            tree,
            stack: vec![(start, 0)],
            filter,
        }
    }
}

impl<'a, P, F> Iterator for DfiPart<'a, P, F>
where
    P: Prefix,
    F: Fn(&P) -> bool,
{
    type Item = (NodeRef<'a, P>, usize, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, depth) = self.stack.pop()?;
        let node = &self.tree.table[idx];
        let in_filter = (self.filter)(&node.prefix);
        if in_filter {
            self.stack
                .extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        Some((NodeRef::new(self.tree, idx), depth, in_filter))
    }
}

/// The ancestors of a node, from its parent up to the root. Created by [`NodeRef::ancestors`].
#[derive(Clone)]
pub struct Ancestors<'a, P: Prefix> {
    tree: &'a PrefixTree<P>,
    next: Option<usize>,
}

impl<'a, P: Prefix> Ancestors<'a, P> {
    pub(crate) fn new(tree: &'a PrefixTree<P>, next: Option<usize>) -> Self {
        Self { tree, next }
    }
}

impl<'a, P: Prefix> Iterator for Ancestors<'a, P> {
    type Item = NodeRef<'a, P>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        self.next = self.tree.table[idx].parent;
        Some(NodeRef::new(self.tree, idx))
    }
}

/// The direct children of a node. Created by [`NodeRef::children`].
#[derive(Clone)]
pub struct Children<'a, P: Prefix> {
    tree: &'a PrefixTree<P>,
    iter: slice::Iter<'a, usize>,
}

impl<'a, P: Prefix> Children<'a, P> {
    pub(crate) fn new(tree: &'a PrefixTree<P>, children: &'a [usize]) -> Self {
        Self {
            tree,
            iter: children.iter(),
        }
    }
}

impl<'a, P: Prefix> Iterator for Children<'a, P> {
    type Item = NodeRef<'a, P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|&idx| NodeRef::new(self.tree, idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<P: Prefix> ExactSizeIterator for Children<'_, P> {}
