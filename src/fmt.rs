//! Formatting implementation for the PrefixTree

use std::fmt::{Debug, Display, Formatter, Result};

use crate::tree::{PrefixTree, ROOT};
use crate::Prefix;

impl<P: Prefix> Debug for PrefixTree<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Debug::fmt(&DebugNode(self, ROOT), f)
    }
}

struct DebugNode<'a, P: Prefix>(&'a PrefixTree<P>, usize);

impl<P: Prefix> Debug for DebugNode<'_, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let tree = self.0;
        let node = &tree.table[self.1];
        if node.children.is_empty() {
            Debug::fmt(&node.prefix, f)
        } else {
            f.debug_map()
                .entry(&node.prefix, &DebugChildren(tree, &node.children))
                .finish()
        }
    }
}

struct DebugChildren<'a, P: Prefix>(&'a PrefixTree<P>, &'a [usize]);

impl<P: Prefix> Debug for DebugChildren<'_, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_list()
            .entries(self.1.iter().map(|&idx| DebugNode(self.0, idx)))
            .finish()
    }
}

/// One line per node in pre-order, indented by four spaces per level.
///
/// ```
/// # use cidr_tree::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = PrefixTree::new("10.0.0.0/8".parse::<Ipv4Prefix>()?);
/// tree.insert("10.1.0.0/16".parse()?)?;
/// tree.insert("10.1.1.0/24".parse()?)?;
/// tree.insert("10.2.0.0/16".parse()?)?;
/// assert_eq!(
///     tree.to_string(),
///     "10.0.0.0/8\n    10.1.0.0/16\n        10.1.1.0/24\n    10.2.0.0/16\n",
/// );
/// # Ok(())
/// # }
/// ```
impl<P: Prefix + Display> Display for PrefixTree<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (node, depth) in self.dfi() {
            writeln!(f, "{:indent$}{}", "", node.prefix(), indent = 4 * depth)?;
        }
        Ok(())
    }
}
