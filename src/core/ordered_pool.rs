//! Comparator-ordered, identity-deduplicated node collection.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

/// An entry that can live in an [`OrderedPool`].
pub trait PoolNode {
    /// Identity type; at most one node per identity is held.
    type Id: Clone + Eq + Hash + Ord;

    /// Identity of this node.
    fn id(&self) -> &Self::Id;
}

/// Ordering function supplied by the pool's owner.
pub type Comparator<N> = fn(&N, &N) -> Ordering;

/// Ordered pool of nodes.
///
/// Iteration always follows the comparator; nodes the comparator considers
/// equal are ordered by identity so the overall order is total and
/// reproducible. Syncing a node whose identity is already present replaces it
/// instead of adding a duplicate.
pub struct OrderedPool<N: PoolNode> {
    compare: Comparator<N>,
    /// Nodes sorted by `compare`, then identity.
    nodes: Vec<N>,
    ids: HashSet<N::Id>,
}

impl<N: PoolNode> OrderedPool<N> {
    /// Create an empty pool ordered by `compare`.
    pub fn new(compare: Comparator<N>) -> Self {
        Self {
            compare,
            nodes: Vec::new(),
            ids: HashSet::new(),
        }
    }

    fn total_cmp(compare: Comparator<N>, a: &N, b: &N) -> Ordering {
        compare(a, b).then_with(|| a.id().cmp(b.id()))
    }

    fn position(&self, id: &N::Id) -> Option<usize> {
        if !self.ids.contains(id) {
            return None;
        }
        self.nodes.iter().position(|n| n.id() == id)
    }

    /// Insert or reposition `node`.
    ///
    /// Returns `true` if membership or order changed. Re-syncing a node with
    /// an unchanged ordering key swaps it in place and returns `false`.
    pub fn sync(&mut self, node: N) -> bool {
        let compare = self.compare;
        if let Some(pos) = self.position(node.id()) {
            if Self::total_cmp(compare, &self.nodes[pos], &node) == Ordering::Equal {
                self.nodes[pos] = node;
                return false;
            }
            self.nodes.remove(pos);
        } else {
            self.ids.insert(node.id().clone());
        }
        let at = self
            .nodes
            .partition_point(|n| Self::total_cmp(compare, n, &node) == Ordering::Less);
        self.nodes.insert(at, node);
        true
    }

    /// Remove the node with `id`. Missing identities are a no-op.
    pub fn remove(&mut self, id: &N::Id) -> Option<N> {
        let pos = self.position(id)?;
        self.ids.remove(id);
        Some(self.nodes.remove(pos))
    }

    /// Lowest-ordered node, if any.
    pub fn front(&self) -> Option<&N> {
        self.nodes.first()
    }

    /// Remove and return the lowest-ordered node.
    pub fn pop_front(&mut self) -> Option<N> {
        if self.nodes.is_empty() {
            return None;
        }
        let node = self.nodes.remove(0);
        self.ids.remove(node.id());
        Some(node)
    }

    /// Whether a node with `id` is present.
    pub fn contains(&self, id: &N::Id) -> bool {
        self.ids.contains(id)
    }

    /// Number of distinct identities held.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the pool holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in pool order. Each call starts a fresh pass.
    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }
}

impl<'a, N: PoolNode> IntoIterator for &'a OrderedPool<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<N: PoolNode + std::fmt::Debug> std::fmt::Debug for OrderedPool<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}
