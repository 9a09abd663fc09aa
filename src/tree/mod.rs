//! The prefix tree: a rooted tree of prefixes ordered by strict containment.

use std::collections::HashSet;

use log::{debug, trace};

use crate::{Prefix, TreeError};

mod iter;
mod node;

pub use iter::{Ancestors, Children, Dfi, DfiPart};
pub use node::{NodeId, NodeRef};

pub(crate) use node::{key, Node};

/// The root always lives in the first slot of the table.
pub(crate) const ROOT: usize = 0;

/// A tree of prefixes, where each node's prefix is strictly contained in its parent's prefix,
/// and the prefixes of siblings never contain one another.
///
/// A tree always has a root. Every other prefix is placed below the most specific node that
/// strictly contains it, and any existing nodes that the new prefix strictly contains are moved
/// below it. Host prefixes (with the maximum prefix length) never have children.
///
/// All nodes are stored in one table and addressed with [`NodeId`]. Each node knows its parent, so
/// the tree can be walked upwards with [`NodeRef::ancestors`].
///
/// ```
/// # use cidr_tree::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree: PrefixTree<Ipv4Prefix> = PrefixTree::new("0.0.0.0/0".parse()?);
/// tree.insert("10.1.0.0/16".parse()?)?;
/// tree.insert("10.0.0.0/8".parse()?)?;
/// tree.insert("10.1.2.3/32".parse()?)?;
///
/// let host = tree.find(&"10.1.2.3/32".parse()?).unwrap();
/// assert_eq!(
///     host.ancestors().map(|n| n.prefix().to_string()).collect::<Vec<_>>(),
///     vec!["10.1.0.0/16", "10.0.0.0/8", "0.0.0.0/0"],
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PrefixTree<P: Prefix> {
    pub(crate) table: Vec<Node<P>>,
    free: Vec<usize>,
}

impl<P: Prefix> Default for PrefixTree<P> {
    /// A tree rooted at the prefix that covers the entire address space.
    fn default() -> Self {
        Self::new(P::zero())
    }
}

/// Outcome of searching for a prefix below a node.
pub(crate) enum Search {
    /// A node with exactly that prefix.
    Found(usize),
    /// No exact match. The index is the most specific node strictly containing the prefix.
    Enclosed(usize),
    /// The start node does not contain the prefix.
    Outside,
}

/// Where a new prefix would be attached.
enum Landing {
    Rejected,
    Duplicate,
    Parent(usize),
}

/// Outcome of attaching a detached subtree.
enum Placement<P: Prefix> {
    Placed(usize),
    Rejected(PrefixTree<P>),
    Duplicate(P, PrefixTree<P>),
}

/// A subtree removed from the table, with the position it was removed from. `slots[i]` is the
/// former table index of node `i` of `subtree`.
struct Detached<P: Prefix> {
    parent: usize,
    position: usize,
    slots: Vec<usize>,
    subtree: PrefixTree<P>,
}

impl<P: Prefix> PrefixTree<P> {
    /// Create a new tree that only contains `root`.
    pub fn new(root: P) -> Self {
        let mut tree = Self {
            table: Vec::new(),
            free: Vec::new(),
        };
        tree.new_node(root);
        tree
    }

    /// The root of the tree.
    pub fn root(&self) -> NodeRef<'_, P> {
        NodeRef::new(self, ROOT)
    }

    /// The handle of the root.
    pub fn root_id(&self) -> NodeId {
        self.id(ROOT)
    }

    /// Number of nodes in the tree, including the root.
    pub fn len(&self) -> usize {
        self.table.len() - self.free.len()
    }

    /// Whether the tree contains nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.table[ROOT].children.is_empty()
    }

    /// Get a view of the node with the given handle, or `None` if the handle is stale.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, P>> {
        self.is_valid(id).then(|| NodeRef::new(self, id.idx))
    }

    /// Search for the node with exactly `prefix`. See [`NodeRef::find`].
    pub fn find(&self, prefix: &P) -> Option<NodeRef<'_, P>> {
        self.root().find(prefix)
    }

    /// Search for `prefix`, falling back to the most specific node containing it. See
    /// [`NodeRef::find_loose`].
    pub fn find_loose(&self, prefix: &P) -> Option<NodeRef<'_, P>> {
        self.root().find_loose(prefix)
    }

    /// Search for the node with exactly `prefix` below `at`. Returns `None` for a stale handle.
    pub fn find_at(&self, at: NodeId, prefix: &P) -> Option<NodeRef<'_, P>> {
        self.get(at)?.find(prefix)
    }

    /// Like [`Self::find_loose`], but searching below `at`. Returns `None` for a stale handle.
    pub fn find_loose_at(&self, at: NodeId, prefix: &P) -> Option<NodeRef<'_, P>> {
        self.get(at)?.find_loose(prefix)
    }

    /// Pre-order depth-first traversal of the whole tree. See [`NodeRef::dfi`].
    pub fn dfi(&self) -> Dfi<'_, P> {
        self.root().dfi()
    }

    /// Filtered pre-order traversal of the whole tree. See [`NodeRef::dfi_part`].
    pub fn dfi_part<F>(&self, filter: F) -> DfiPart<'_, P, F>
    where
        F: Fn(&P) -> bool,
    {
        self.root().dfi_part(filter)
    }

    /// Insert `prefix` below the root. See [`Self::insert_at`].
    pub fn insert(&mut self, prefix: P) -> Result<Option<NodeId>, TreeError<P>> {
        self.insert_at(self.root_id(), prefix)
    }

    /// Insert `prefix` into the subtree rooted at `at`.
    ///
    /// The new node is attached below the most specific node that strictly contains it, and all
    /// direct children of that node which `prefix` strictly contains are moved below the new
    /// node. Returns the handle of the new node.
    ///
    /// Returns `Ok(None)` and leaves the tree unchanged if `at` is a host prefix, or if `at` does
    /// not strictly contain `prefix`. Returns [`TreeError::DuplicatePrefix`] if the prefix is
    /// already present at the position where it would be attached.
    ///
    /// # Panics
    /// Panics if `at` is not a node of this tree.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = PrefixTree::new("0.0.0.0/0".parse::<Ipv4Prefix>()?);
    /// tree.insert("10.0.0.1/32".parse()?)?;
    /// tree.insert("10.0.0.2/32".parse()?)?;
    /// let net = tree.insert("10.0.0.0/24".parse()?)?.unwrap();
    /// assert_eq!(tree.get(net).unwrap().num_children(), 2);
    /// assert_eq!(tree.root().num_children(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert_at(&mut self, at: NodeId, prefix: P) -> Result<Option<NodeId>, TreeError<P>> {
        self.assert_valid(at);
        match self.landing(at.idx, &prefix) {
            Landing::Rejected => {
                trace!("{prefix:?} does not fit below {:?}", self.table[at.idx].prefix);
                Ok(None)
            }
            Landing::Duplicate => Err(TreeError::DuplicatePrefix(prefix)),
            Landing::Parent(parent) => {
                let idx = self.new_node(prefix);
                self.adopt(parent, idx);
                Ok(Some(self.id(idx)))
            }
        }
    }

    /// Remove the subtree rooted at `prefix` and return it as an independent tree. See
    /// [`Self::prune_at`].
    pub fn prune(&mut self, prefix: &P) -> Result<Option<PrefixTree<P>>, TreeError<P>> {
        self.prune_at(self.root_id(), prefix)
    }

    /// Remove the subtree rooted at the node with exactly `prefix`, searching from `at`. The
    /// removed subtree is returned as an independent tree, or `None` if `prefix` was not found.
    ///
    /// Returns [`TreeError::RootRemoval`] if `prefix` is the prefix of `at` itself.
    ///
    /// # Panics
    /// Panics if `at` is not a node of this tree.
    pub fn prune_at(
        &mut self,
        at: NodeId,
        prefix: &P,
    ) -> Result<Option<PrefixTree<P>>, TreeError<P>> {
        self.assert_valid(at);
        if self.table[at.idx].prefix.eq(prefix) {
            return Err(TreeError::RootRemoval(prefix.clone()));
        }
        match self.search(at.idx, prefix) {
            Search::Found(idx) => {
                let pruned = self.detach(idx).map(|d| d.subtree);
                if let Some(subtree) = pruned.as_ref() {
                    debug!("pruned {prefix:?} ({} nodes)", subtree.len());
                }
                Ok(pruned)
            }
            Search::Enclosed(_) | Search::Outside => Ok(None),
        }
    }

    /// Attach an entire tree below the root. See [`Self::graft_at`].
    pub fn graft(&mut self, subtree: PrefixTree<P>) -> Result<Option<NodeId>, TreeError<P>> {
        self.graft_at(self.root_id(), subtree)
    }

    /// Attach an entire tree into the subtree rooted at `at`, placing its root exactly like
    /// [`Self::insert_at`] would. Returns the new handle of the grafted root.
    ///
    /// The graft is all or nothing: if any prefix of `subtree` is already present in the part of
    /// the tree that would end up below or at the grafted root, [`TreeError::DuplicatePrefix`] is
    /// returned and the tree is left unchanged. `Ok(None)` means that `at` cannot hold the
    /// grafted root.
    ///
    /// # Panics
    /// Panics if `at` is not a node of this tree.
    pub fn graft_at(
        &mut self,
        at: NodeId,
        subtree: PrefixTree<P>,
    ) -> Result<Option<NodeId>, TreeError<P>> {
        self.assert_valid(at);
        match self.place(at.idx, subtree) {
            Placement::Placed(idx) => Ok(Some(self.id(idx))),
            Placement::Rejected(_) => Ok(None),
            Placement::Duplicate(prefix, _) => Err(TreeError::DuplicatePrefix(prefix)),
        }
    }

    /// Renumber the subtree at `old` onto `new`, searching from the root. See
    /// [`Self::renumber_at`].
    pub fn renumber(&mut self, old: &P, new: &P) -> Result<NodeId, TreeError<P>> {
        self.renumber_at(self.root_id(), old, new)
    }

    /// Move the subtree rooted at `old` to the network `new`, searching from `at`.
    ///
    /// Every prefix in the subtree keeps its host bits below the prefix length of `new` and its
    /// own prefix length, while the network bits are replaced by those of `new`. The renumbered
    /// subtree is then re-inserted from `at`, possibly adopting existing nodes. Returns the new
    /// handle of the renumbered subtree root.
    ///
    /// The following requests are rejected without modifying the tree:
    /// - [`TreeError::NotContained`] if `at` does not strictly contain `old` or `new`,
    /// - [`TreeError::DuplicatePrefix`] if `new` is already present,
    /// - [`TreeError::NotFound`] if `old` is not present,
    /// - [`TreeError::StricterMask`] if `new` is longer than `old`.
    ///
    /// If re-inserting the renumbered subtree collides with an existing prefix, the subtree is
    /// restored at its original position and [`TreeError::DuplicatePrefix`] is returned. The
    /// restored nodes keep their handles. After a successful renumber, handles of nodes in the
    /// moved subtree are stale.
    ///
    /// # Panics
    /// Panics if `at` is not a node of this tree.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = PrefixTree::new("0.0.0.0/0".parse::<Ipv4Prefix>()?);
    /// tree.insert("10.0.0.0/24".parse()?)?;
    /// tree.insert("10.0.0.5/32".parse()?)?;
    /// tree.renumber(&"10.0.0.0/24".parse()?, &"192.168.1.0/24".parse()?)?;
    /// assert!(tree.find(&"192.168.1.5/32".parse()?).is_some());
    /// assert!(tree.find(&"10.0.0.0/24".parse()?).is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn renumber_at(&mut self, at: NodeId, old: &P, new: &P) -> Result<NodeId, TreeError<P>> {
        self.assert_valid(at);
        let node = &self.table[at.idx].prefix;
        for prefix in [old, new] {
            if !node.strictly_contains(prefix) {
                return Err(TreeError::NotContained {
                    node: node.clone(),
                    prefix: prefix.clone(),
                });
            }
        }
        if let Search::Found(_) = self.search(at.idx, new) {
            return Err(TreeError::DuplicatePrefix(new.clone()));
        }
        let idx = match self.search(at.idx, old) {
            Search::Found(idx) => idx,
            Search::Enclosed(_) | Search::Outside => return Err(TreeError::NotFound(old.clone())),
        };
        if new.prefix_len() > old.prefix_len() {
            return Err(TreeError::StricterMask {
                from: old.prefix_len(),
                to: new.prefix_len(),
            });
        }

        let Some(Detached {
            parent,
            position,
            slots,
            mut subtree,
        }) = self.detach(idx)
        else {
            return Err(TreeError::NotFound(old.clone()));
        };
        let original: Vec<P> = subtree.table.iter().map(|n| n.prefix.clone()).collect();
        subtree.rewrite(|p| p.renumbered(new));
        debug!("renumbering {old:?} onto {new:?} ({} nodes)", subtree.len());

        let (err, subtree) = match self.place(at.idx, subtree) {
            Placement::Placed(idx) => return Ok(self.id(idx)),
            Placement::Duplicate(prefix, subtree) => (TreeError::DuplicatePrefix(prefix), subtree),
            Placement::Rejected(subtree) => (
                TreeError::NotContained {
                    node: self.table[at.idx].prefix.clone(),
                    prefix: new.clone(),
                },
                subtree,
            ),
        };
        debug!("renumbering {old:?} failed ({err}), restoring the subtree");
        let restored = self.restore(&subtree, &slots, &original);
        self.link(parent, restored, Some(position));
        Err(err)
    }

    /// Sort the children of every node by address. See [`Self::sort_at`].
    pub fn sort(&mut self) {
        self.sort_at(self.root_id())
    }

    /// Sort the children of every node in the subtree rooted at `at` by their prefix order (see
    /// [`Prefix::nesting_cmp`]). Since siblings are disjoint, this orders them by address.
    ///
    /// # Panics
    /// Panics if `at` is not a node of this tree.
    pub fn sort_at(&mut self, at: NodeId) {
        self.assert_valid(at);
        let mut stack = vec![at.idx];
        while let Some(idx) = stack.pop() {
            let mut children = std::mem::take(&mut self.table[idx].children);
            children.sort_by(|a, b| self.table[*a].prefix.nesting_cmp(&self.table[*b].prefix));
            stack.extend(children.iter().copied());
            self.table[idx].children = children;
        }
    }

    fn id(&self, idx: usize) -> NodeId {
        NodeRef::new(self, idx).id()
    }

    #[inline(always)]
    fn is_valid(&self, id: NodeId) -> bool {
        self.table
            .get(id.idx)
            .map_or(false, |n| n.live && n.generation == id.generation)
    }

    fn assert_valid(&self, at: NodeId) {
        assert!(self.is_valid(at), "{at:?} is not a node of this tree");
    }

    /// The first candidate child of `idx` that strictly contains `prefix`. There is at most one.
    fn enclosing_candidate(&self, idx: usize, prefix: &P) -> Option<usize> {
        self.table[idx]
            .candidates
            .iter()
            .copied()
            .find(|&c| self.table[c].prefix.strictly_contains(prefix))
    }

    pub(crate) fn search(&self, at: usize, prefix: &P) -> Search {
        let node = &self.table[at].prefix;
        if node.eq(prefix) {
            return Search::Found(at);
        }
        if !node.strictly_contains(prefix) {
            return Search::Outside;
        }
        let k = key(prefix);
        let mut cur = at;
        loop {
            if let Some(&hit) = self.table[cur].index.get(&k) {
                return Search::Found(hit);
            }
            match self.enclosing_candidate(cur, prefix) {
                Some(next) => cur = next,
                None => return Search::Enclosed(cur),
            }
        }
    }

    fn landing(&self, at: usize, prefix: &P) -> Landing {
        let node = &self.table[at].prefix;
        if node.is_host() || !node.strictly_contains(prefix) {
            return Landing::Rejected;
        }
        let mut cur = at;
        while let Some(next) = self.enclosing_candidate(cur, prefix) {
            trace!("{prefix:?}: descend into {:?}", self.table[next].prefix);
            cur = next;
        }
        if self.table[cur].index.contains_key(&key(prefix)) {
            Landing::Duplicate
        } else {
            Landing::Parent(cur)
        }
    }

    /// Attach the unlinked node `idx` (with whatever subtree it already has) at the most specific
    /// position below `cur`, moving every child of that position which it contains below it.
    fn adopt(&mut self, mut cur: usize, idx: usize) {
        let prefix = self.table[idx].prefix.clone();
        while let Some(next) = self.enclosing_candidate(cur, &prefix) {
            cur = next;
        }
        if !prefix.is_host() {
            let contained: Vec<usize> = self.table[cur]
                .children
                .iter()
                .copied()
                .filter(|&c| prefix.strictly_contains(&self.table[c].prefix))
                .collect();
            for child in contained {
                trace!("{prefix:?}: adopt {:?}", self.table[child].prefix);
                self.unlink(child);
                self.adopt(idx, child);
            }
        }
        trace!("{prefix:?}: attach below {:?}", self.table[cur].prefix);
        self.link(cur, idx, None);
    }

    /// Attach a detached subtree below `at`. Nothing is modified unless the result is
    /// [`Placement::Placed`].
    fn place(&mut self, at: usize, mut subtree: PrefixTree<P>) -> Placement<P> {
        let top = subtree.table[ROOT].prefix.clone();
        let parent = match self.landing(at, &top) {
            Landing::Rejected => return Placement::Rejected(subtree),
            Landing::Duplicate => return Placement::Duplicate(top, subtree),
            Landing::Parent(parent) => parent,
        };
        if subtree.len() > 1 {
            if let Some(prefix) = self.collision(parent, &top, &subtree) {
                return Placement::Duplicate(prefix, subtree);
            }
        }
        let (_, idx) = Self::move_subtree(&mut subtree, ROOT, self)[0];
        self.adopt(parent, idx);
        Placement::Placed(idx)
    }

    /// A prefix of `subtree` that is also present below a child of `parent` which `top` would
    /// adopt.
    fn collision(&self, parent: usize, top: &P, subtree: &PrefixTree<P>) -> Option<P> {
        let keys: HashSet<_> = subtree.dfi().map(|(n, _)| key(n.prefix())).collect();
        self.table[parent]
            .children
            .iter()
            .filter(|&&c| top.strictly_contains(&self.table[c].prefix))
            .flat_map(|&c| NodeRef::new(self, c).dfi())
            .map(|(n, _)| n.prefix())
            .find(|p| keys.contains(&key(*p)))
            .cloned()
    }

    /// Unlink the subtree at `idx` and move it into a new tree.
    fn detach(&mut self, idx: usize) -> Option<Detached<P>> {
        let (parent, position) = self.unlink(idx)?;
        let mut subtree = PrefixTree {
            table: Vec::new(),
            free: Vec::new(),
        };
        let moved = Self::move_subtree(self, idx, &mut subtree);
        let mut slots = vec![0; subtree.table.len()];
        for (from, to) in moved {
            slots[to] = from;
        }
        Some(Detached {
            parent,
            position,
            slots,
            subtree,
        })
    }

    /// Copy the subtree at `idx` of `src` into `dst` as an unlinked subtree, and release it in
    /// `src`. Children keep their order. Returns the pairs of source and destination indices,
    /// starting with the root.
    fn move_subtree(src: &mut Self, idx: usize, dst: &mut Self) -> Vec<(usize, usize)> {
        let root = dst.new_node(src.table[idx].prefix.clone());
        let mut moved = vec![(idx, root)];
        let mut stack = vec![(idx, root)];
        while let Some((from, to)) = stack.pop() {
            let children = std::mem::take(&mut src.table[from].children);
            for child in children {
                let copy = dst.new_node(src.table[child].prefix.clone());
                dst.link(to, copy, None);
                stack.push((child, copy));
                moved.push((child, copy));
            }
            src.release(from);
        }
        moved
    }

    /// Put a detached subtree back into the released `slots` it came from, with the prefixes
    /// `original`, so that the generations of those slots are unchanged. Returns the unlinked
    /// root.
    fn restore(&mut self, subtree: &PrefixTree<P>, slots: &[usize], original: &[P]) -> usize {
        let reclaimed: HashSet<usize> = slots.iter().copied().collect();
        self.free.retain(|idx| !reclaimed.contains(idx));
        for (i, &slot) in slots.iter().enumerate() {
            let generation = self.table[slot].generation;
            self.table[slot] = Node::new(original[i].clone());
            self.table[slot].generation = generation;
        }
        for (i, node) in subtree.table.iter().enumerate() {
            for &child in &node.children {
                self.link(slots[i], slots[child], None);
            }
        }
        slots[ROOT]
    }

    /// Replace every prefix of this tree, keeping the shape. The result must not change any prefix
    /// length.
    fn rewrite<F: FnMut(&P) -> P>(&mut self, mut f: F) {
        for node in self.table.iter_mut().filter(|n| n.live) {
            node.prefix = f(&node.prefix);
        }
        for i in 0..self.table.len() {
            let index = self.table[i]
                .children
                .iter()
                .map(|&c| (key(&self.table[c].prefix), c))
                .collect();
            self.table[i].index = index;
        }
    }

    fn link(&mut self, parent: usize, child: usize, position: Option<usize>) {
        let k = key(&self.table[child].prefix);
        let is_host = self.table[child].prefix.is_host();
        self.table[child].parent = Some(parent);
        let node = &mut self.table[parent];
        match position {
            Some(pos) => node.children.insert(pos.min(node.children.len()), child),
            None => node.children.push(child),
        }
        node.index.insert(k, child);
        if !is_host {
            node.candidates.push(child);
        }
    }

    /// Remove `child` from its parent. Returns the parent and the former position of `child`
    /// among its siblings, or `None` for the root.
    fn unlink(&mut self, child: usize) -> Option<(usize, usize)> {
        let parent = self.table[child].parent.take()?;
        let k = key(&self.table[child].prefix);
        let node = &mut self.table[parent];
        let position = node.children.iter().position(|&c| c == child)?;
        node.children.remove(position);
        node.index.remove(&k);
        node.candidates.retain(|&c| c != child);
        Some((parent, position))
    }

    fn new_node(&mut self, prefix: P) -> usize {
        if let Some(idx) = self.free.pop() {
            let generation = self.table[idx].generation.wrapping_add(1);
            self.table[idx] = Node::new(prefix);
            self.table[idx].generation = generation;
            idx
        } else {
            self.table.push(Node::new(prefix));
            self.table.len() - 1
        }
    }

    fn release(&mut self, idx: usize) {
        let node = &mut self.table[idx];
        node.live = false;
        node.parent = None;
        node.children.clear();
        node.index.clear();
        node.candidates.clear();
        self.free.push(idx);
    }
}

impl<P: Prefix> PartialEq for PrefixTree<P> {
    /// Two trees are equal if their pre-order traversals visit the same prefixes at the same
    /// depths.
    fn eq(&self, other: &Self) -> bool {
        self.dfi()
            .map(|(n, d)| (key(n.prefix()), d))
            .eq(other.dfi().map(|(n, d)| (key(n.prefix()), d)))
    }
}

impl<P: Prefix> Eq for PrefixTree<P> {}
