//! Nodes of the arena, handles to them, and borrowed views.

use std::{collections::HashMap, fmt};

use super::{Ancestors, Children, Dfi, DfiPart, PrefixTree, Search};
use crate::Prefix;

/// Key of the exact-match index of a node.
pub(crate) type Key<P> = (<P as Prefix>::R, u8);

#[inline(always)]
pub(crate) fn key<P: Prefix>(prefix: &P) -> Key<P> {
    (prefix.mask(), prefix.prefix_len())
}

#[derive(Clone)]
pub(crate) struct Node<P: Prefix> {
    pub(crate) prefix: P,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    /// exact-match index over `children`
    pub(crate) index: HashMap<Key<P>, usize>,
    /// children that are not hosts, i.e., that may have children of their own
    pub(crate) candidates: Vec<usize>,
    pub(crate) live: bool,
    /// bumped whenever the slot is reused for a new node
    pub(crate) generation: u32,
}

impl<P: Prefix> Node<P> {
    pub(crate) fn new(prefix: P) -> Self {
        Self {
            prefix,
            parent: None,
            children: Vec::new(),
            index: HashMap::new(),
            candidates: Vec::new(),
            live: true,
            generation: 0,
        }
    }
}

/// Handle of a node in a [`PrefixTree`].
///
/// A handle stays valid until its node is pruned, or moved by a successful renumber. Afterwards,
/// the tree treats it as stale, even once its slot holds a new node. Handles are only meaningful
/// for the tree that issued them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    pub(crate) idx: usize,
    pub(crate) generation: u32,
}

/// A borrowed view of one node and the subtree below it.
pub struct NodeRef<'a, P: Prefix> {
    pub(crate) tree: &'a PrefixTree<P>,
    pub(crate) idx: usize,
}

impl<P: Prefix> Clone for NodeRef<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Prefix> Copy for NodeRef<'_, P> {}

impl<P: Prefix> fmt::Debug for NodeRef<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(self.prefix()).finish()
    }
}

impl<'a, P: Prefix> NodeRef<'a, P> {
    pub(crate) fn new(tree: &'a PrefixTree<P>, idx: usize) -> Self {
        Self { tree, idx }
    }

    /// The handle of this node.
    pub fn id(&self) -> NodeId {
        NodeId {
            idx: self.idx,
            generation: self.tree.table[self.idx].generation,
        }
    }

    /// The prefix of this node.
    pub fn prefix(&self) -> &'a P {
        &self.tree.table[self.idx].prefix
    }

    /// Whether this node is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.tree.table[self.idx].parent.is_none()
    }

    /// The direct parent of this node, or `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'a, P>> {
        self.tree.table[self.idx]
            .parent
            .map(|idx| Self::new(self.tree, idx))
    }

    /// The direct children of this node, in their current order.
    pub fn children(&self) -> Children<'a, P> {
        Children::new(self.tree, &self.tree.table[self.idx].children)
    }

    /// Number of direct children.
    pub fn num_children(&self) -> usize {
        self.tree.table[self.idx].children.len()
    }

    /// Whether a direct child has exactly the given prefix. This lookup does not descend.
    pub fn has_child(&self, prefix: &P) -> bool {
        self.tree.table[self.idx].index.contains_key(&key(prefix))
    }

    /// All ancestors of this node, starting with its parent and ending with the root.
    pub fn ancestors(&self) -> Ancestors<'a, P> {
        Ancestors::new(self.tree, self.tree.table[self.idx].parent)
    }

    /// Number of ancestors. The root has depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Number of nodes in the subtree rooted at this node, including the node itself.
    pub fn subtree_len(&self) -> usize {
        self.dfi().count()
    }

    /// Search for the node with exactly `prefix` in the subtree rooted at this node.
    pub fn find(&self, prefix: &P) -> Option<NodeRef<'a, P>> {
        match self.tree.search(self.idx, prefix) {
            Search::Found(idx) => Some(Self::new(self.tree, idx)),
            Search::Enclosed(_) | Search::Outside => None,
        }
    }

    /// Search for `prefix` in the subtree rooted at this node. If there is no exact match,
    /// return the most specific node that contains `prefix`. Returns `None` only if this node does
    /// not contain `prefix` at all.
    pub fn find_loose(&self, prefix: &P) -> Option<NodeRef<'a, P>> {
        match self.tree.search(self.idx, prefix) {
            Search::Found(idx) | Search::Enclosed(idx) => Some(Self::new(self.tree, idx)),
            Search::Outside => None,
        }
    }

    /// Pre-order depth-first traversal of the subtree rooted at this node. Yields each node
    /// together with its depth relative to this node (which has depth 0).
    pub fn dfi(&self) -> Dfi<'a, P> {
        Dfi::new(self.tree, self.idx)
    }

    /// Like [`Self::dfi`], but only descends below nodes whose prefix satisfies `filter`. Every
    /// visited node is yielded once, together with its depth and whether it satisfies `filter`.
    pub fn dfi_part<F>(&self, filter: F) -> DfiPart<'a, P, F>
    where
        F: Fn(&P) -> bool,
    {
        DfiPart::new(self.tree, self.idx, filter)
    }
}
