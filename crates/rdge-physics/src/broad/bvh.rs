// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tracing::trace;

use crate::constants::{DISPLACEMENT_MULTIPLIER, FATTEN_AMOUNT};
use crate::math::Vec2;
use crate::pool::{Handle, Pool};
use crate::types::aabb::Aabb;

/// Handle to a tree node. Handles returned by [`DynamicTree::create_proxy`]
/// always refer to leaves.
pub type ProxyId<T> = Handle<TreeNode<T>>;

/// Leaf payload or the pair of children of an internal node.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind<T> {
    /// Leaf carrying the caller's payload.
    Leaf(T),
    /// Internal node; both children are always present.
    Internal {
        /// Left child.
        left: ProxyId<T>,
        /// Right child.
        right: ProxyId<T>,
    },
}

/// A node of the [`DynamicTree`].
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    aabb: Aabb,
    parent: Option<ProxyId<T>>,
    height: u32,
    kind: NodeKind<T>,
}

impl<T: Copy> TreeNode<T> {
    /// Fat box of a leaf, or the union of the children's boxes.
    pub const fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Leaves have height zero.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Parent node, `None` for the root.
    pub const fn parent(&self) -> Option<ProxyId<T>> {
        self.parent
    }

    /// Node contents.
    pub const fn kind(&self) -> &NodeKind<T> {
        &self.kind
    }

    /// Returns `true` for leaves.
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Leaf payload.
    pub const fn payload(&self) -> Option<T> {
        match self.kind {
            NodeKind::Leaf(payload) => Some(payload),
            NodeKind::Internal { .. } => None,
        }
    }

    const fn children(&self) -> Option<(ProxyId<T>, ProxyId<T>)> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, right } => Some((left, right)),
        }
    }
}

/// Dynamic bounding volume hierarchy over fattened AABBs.
///
/// Leaves store boxes inflated by [`FATTEN_AMOUNT`] so small motions do not
/// touch the tree. Insertion walks down by a perimeter cost heuristic and the
/// path back to the root is rebalanced with AVL-style rotations, keeping
/// `|height(left) - height(right)| <= 1` at every internal node.
///
/// Nodes live in a [`Pool`]; the tree owns both leaves and internal nodes and
/// recycles their slots on removal.
#[derive(Debug)]
pub struct DynamicTree<T> {
    nodes: Pool<TreeNode<T>>,
    root: Option<ProxyId<T>>,
    proxies: usize,
}

impl<T> Default for DynamicTree<T> {
    fn default() -> Self {
        Self { nodes: Pool::new(), root: None, proxies: 0 }
    }
}

impl<T: Copy> DynamicTree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a leaf for `aabb`, fattened by [`FATTEN_AMOUNT`].
    pub fn create_proxy(&mut self, aabb: Aabb, payload: T) -> ProxyId<T> {
        let leaf = self.nodes.allocate(TreeNode {
            aabb: aabb.inflate(FATTEN_AMOUNT),
            parent: None,
            height: 0,
            kind: NodeKind::Leaf(payload),
        });
        self.insert_leaf(leaf);
        self.proxies += 1;
        leaf
    }

    /// Removes a leaf and returns its payload; `None` if `proxy` is stale or
    /// not a leaf.
    pub fn destroy_proxy(&mut self, proxy: ProxyId<T>) -> Option<T> {
        if !self.nodes.get(proxy).is_some_and(TreeNode::is_leaf) {
            return None;
        }
        self.remove_leaf(proxy);
        self.proxies -= 1;
        self.nodes.free(proxy).and_then(|node| node.payload())
    }

    /// Updates a leaf for a new tight box.
    ///
    /// Returns `false` and leaves the tree untouched while the stored fat box
    /// still contains `aabb`. Otherwise the leaf is reinserted with a box
    /// inflated by [`FATTEN_AMOUNT`] and stretched along `displacement`
    /// (scaled by [`DISPLACEMENT_MULTIPLIER`]), and `true` is returned.
    ///
    /// # Panics
    /// Panics if `proxy` is stale.
    pub fn move_proxy(&mut self, proxy: ProxyId<T>, aabb: Aabb, displacement: Vec2) -> bool {
        debug_assert!(self.nodes[proxy].is_leaf(), "move_proxy on an internal node");
        if self.nodes[proxy].aabb.contains(&aabb) {
            return false;
        }
        self.remove_leaf(proxy);
        let fat = aabb
            .inflate(FATTEN_AMOUNT)
            .expand_by_displacement(displacement * DISPLACEMENT_MULTIPLIER);
        self.nodes[proxy].aabb = fat;
        self.insert_leaf(proxy);
        trace!(?proxy, height = self.height(), "proxy reinserted");
        true
    }

    /// Height of the root; zero for an empty tree or a single leaf.
    pub fn height(&self) -> u32 {
        self.root.map_or(0, |root| self.nodes[root].height)
    }

    /// Number of leaves.
    pub const fn len(&self) -> usize {
        self.proxies
    }

    /// Returns `true` when the tree holds no leaves.
    pub const fn is_empty(&self) -> bool {
        self.proxies == 0
    }

    /// Root node, if any.
    pub const fn root(&self) -> Option<ProxyId<T>> {
        self.root
    }

    /// Looks up any node.
    pub fn node(&self, id: ProxyId<T>) -> Option<&TreeNode<T>> {
        self.nodes.get(id)
    }

    /// Fat box stored for `proxy`.
    pub fn fat_aabb(&self, proxy: ProxyId<T>) -> Option<Aabb> {
        self.nodes.get(proxy).map(TreeNode::aabb)
    }

    /// Payload stored for `proxy`.
    pub fn payload(&self, proxy: ProxyId<T>) -> Option<T> {
        self.nodes.get(proxy).and_then(TreeNode::payload)
    }

    /// Returns `true` when the fat boxes of both proxies overlap.
    pub fn overlaps(&self, a: ProxyId<T>, b: ProxyId<T>) -> bool {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => a.aabb.overlaps(&b.aabb),
            _ => false,
        }
    }

    /// Visits every leaf whose fat box overlaps `aabb`. The callback returns
    /// `false` to stop the traversal early.
    pub fn query(&self, aabb: &Aabb, mut callback: impl FnMut(ProxyId<T>) -> bool) {
        let mut stack: Vec<ProxyId<T>> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(_) => {
                    if !callback(id) {
                        return;
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }

    /// Collects the leaves overlapping `aabb`.
    pub fn query_vec(&self, aabb: &Aabb) -> Vec<ProxyId<T>> {
        let mut out = Vec::new();
        self.query(aabb, |id| {
            out.push(id);
            true
        });
        out
    }

    /// Finds every leaf overlapping one of `proxies`, returning payload pairs
    /// canonicalized as `(min, max)`, sorted ascending, without duplicates.
    /// Stale entries in `proxies` are skipped.
    pub fn query_pairs(&self, proxies: &[ProxyId<T>]) -> Vec<(T, T)>
    where
        T: Ord,
    {
        let mut out = Vec::new();
        for &proxy in proxies {
            let Some(node) = self.nodes.get(proxy) else { continue };
            let Some(payload) = node.payload() else { continue };
            self.query(&node.aabb, |other| {
                if other != proxy {
                    if let Some(other_payload) = self.payload(other) {
                        out.push(if payload <= other_payload {
                            (payload, other_payload)
                        } else {
                            (other_payload, payload)
                        });
                    }
                }
                true
            });
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Iterates over `(proxy, payload)` for every leaf in slot order.
    pub fn proxies(&self) -> impl Iterator<Item = (ProxyId<T>, T)> + '_ {
        self.nodes.iter().filter_map(|(id, node)| node.payload().map(|p| (id, p)))
    }

    /// Largest `|height(left) - height(right)|` over all internal nodes.
    pub fn max_imbalance(&self) -> u32 {
        self.nodes
            .iter()
            .filter_map(|(_, node)| node.children())
            .map(|(l, r)| self.nodes[l].height.abs_diff(self.nodes[r].height))
            .max()
            .unwrap_or(0)
    }

    /// Verifies parent links, cached heights, box enclosure, and the leaf
    /// count. Intended for tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.root else {
            return self.proxies == 0 && self.nodes.is_empty();
        };
        if self.nodes[root].parent.is_some() {
            return false;
        }
        let mut leaves = 0usize;
        let mut reached = 0usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            reached += 1;
            let node = &self.nodes[id];
            let Some((left, right)) = node.children() else {
                leaves += 1;
                if node.height != 0 {
                    return false;
                }
                continue;
            };
            let (l, r) = (&self.nodes[left], &self.nodes[right]);
            if l.parent != Some(id) || r.parent != Some(id) {
                return false;
            }
            if node.height != 1 + l.height.max(r.height) {
                return false;
            }
            if !node.aabb.contains(&l.aabb) || !node.aabb.contains(&r.aabb) {
                return false;
            }
            stack.push(left);
            stack.push(right);
        }
        leaves == self.proxies && reached == self.nodes.len()
    }

    fn insert_leaf(&mut self, leaf: ProxyId<T>) {
        let Some(root) = self.root else {
            self.nodes[leaf].parent = None;
            self.root = Some(leaf);
            return;
        };

        let leaf_box = self.nodes[leaf].aabb;
        let mut index = root;
        while let Some((left, right)) = self.nodes[index].children() {
            let node_box = self.nodes[index].aabb;
            let area = node_box.perimeter();
            let combined = node_box.union(&leaf_box).perimeter();

            // Cost of pairing the leaf with this node, and the minimum cost
            // pushed down to any child when descending instead.
            let cost = 2.0 * combined;
            let inheritance = 2.0 * (combined - area);
            let cost_left = self.descend_cost(left, &leaf_box, inheritance);
            let cost_right = self.descend_cost(right, &leaf_box, inheritance);

            if cost < cost_left && cost < cost_right {
                break;
            }
            index = if cost_left < cost_right { left } else { right };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.nodes.allocate(TreeNode {
            aabb: leaf_box.union(&self.nodes[sibling].aabb),
            parent: old_parent,
            height: self.nodes[sibling].height + 1,
            kind: NodeKind::Internal { left: sibling, right: leaf },
        });
        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);
        match old_parent {
            Some(parent) => self.replace_child(parent, sibling, new_parent),
            None => self.root = Some(new_parent),
        }
        self.refit_upwards(Some(new_parent));
    }

    fn descend_cost(&self, child: ProxyId<T>, leaf_box: &Aabb, inheritance: f32) -> f32 {
        let node = &self.nodes[child];
        let merged = leaf_box.union(&node.aabb).perimeter();
        if node.is_leaf() {
            merged + inheritance
        } else {
            merged - node.aabb.perimeter() + inheritance
        }
    }

    fn remove_leaf(&mut self, leaf: ProxyId<T>) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }
        let Some(parent) = self.nodes[leaf].parent else {
            return;
        };
        let grandparent = self.nodes[parent].parent;
        let sibling = match self.nodes[parent].children() {
            Some((left, right)) if left == leaf => right,
            Some((left, _)) => left,
            None => return,
        };

        self.nodes.free(parent);
        self.nodes[sibling].parent = grandparent;
        self.nodes[leaf].parent = None;
        match grandparent {
            Some(grandparent) => {
                self.replace_child(grandparent, parent, sibling);
                self.refit_upwards(Some(grandparent));
            }
            None => self.root = Some(sibling),
        }
    }

    /// Walks from `start` to the root, rebalancing and refitting each node.
    fn refit_upwards(&mut self, start: Option<ProxyId<T>>) {
        let mut cursor = start;
        while let Some(id) = cursor {
            let id = self.balance(id);
            self.refit(id);
            cursor = self.nodes[id].parent;
        }
    }

    fn refit(&mut self, id: ProxyId<T>) {
        if let Some((left, right)) = self.nodes[id].children() {
            let (l, r) = (&self.nodes[left], &self.nodes[right]);
            let height = 1 + l.height.max(r.height);
            let aabb = l.aabb.union(&r.aabb);
            let node = &mut self.nodes[id];
            node.height = height;
            node.aabb = aabb;
        }
    }

    fn replace_child(&mut self, parent: ProxyId<T>, old: ProxyId<T>, new: ProxyId<T>) {
        if let NodeKind::Internal { left, right } = &mut self.nodes[parent].kind {
            if *left == old {
                *left = new;
            } else {
                debug_assert!(*right == old, "replace_child: not a child");
                *right = new;
            }
        }
    }

    /// Rotates `a` if its subtrees differ in height by more than one and
    /// returns the node now occupying `a`'s position.
    fn balance(&mut self, a: ProxyId<T>) -> ProxyId<T> {
        let Some((b, c)) = self.nodes[a].children() else {
            return a;
        };
        if self.nodes[a].height < 2 {
            return a;
        }
        let hb = i64::from(self.nodes[b].height);
        let hc = i64::from(self.nodes[c].height);
        match hc - hb {
            bal if bal > 1 => self.rotate_up(a, c, true),
            bal if bal < -1 => self.rotate_up(a, b, false),
            _ => a,
        }
    }

    /// Promotes `child` into `a`'s slot. The taller grandchild stays with the
    /// promoted node; the shorter one replaces `child` under `a`.
    fn rotate_up(&mut self, a: ProxyId<T>, child: ProxyId<T>, child_is_right: bool) -> ProxyId<T> {
        let Some((f, g)) = self.nodes[child].children() else {
            return a;
        };

        let a_parent = self.nodes[a].parent;
        self.nodes[child].parent = a_parent;
        self.nodes[a].parent = Some(child);
        match a_parent {
            Some(parent) => self.replace_child(parent, a, child),
            None => self.root = Some(child),
        }

        let (keep, give) =
            if self.nodes[f].height > self.nodes[g].height { (f, g) } else { (g, f) };
        self.nodes[child].kind = NodeKind::Internal { left: a, right: keep };
        if let NodeKind::Internal { left, right } = &mut self.nodes[a].kind {
            if child_is_right {
                *right = give;
            } else {
                *left = give;
            }
        }
        self.nodes[give].parent = Some(a);

        self.refit(a);
        self.refit(child);
        child
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;

    fn square(x: f32, y: f32, half: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec2::new(x, y), half, half)
    }

    #[test]
    fn empty_and_single_leaf_have_height_zero() {
        let mut tree = DynamicTree::new();
        assert_eq!(tree.height(), 0);
        let p = tree.create_proxy(square(0.0, 0.0, 1.0), 7u32);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.payload(p), Some(7));
        assert!(tree.is_consistent());
    }

    #[test]
    fn leaves_are_fattened() {
        let mut tree = DynamicTree::new();
        let p = tree.create_proxy(square(0.0, 0.0, 1.0), 0u32);
        let fat = tree.fat_aabb(p).unwrap();
        assert!((fat.min().x() + 1.0 + FATTEN_AMOUNT).abs() < 1e-6);
        assert!((fat.max().y() - 1.0 - FATTEN_AMOUNT).abs() < 1e-6);
    }

    #[test]
    fn sequential_inserts_stay_balanced() {
        let mut tree = DynamicTree::new();
        for i in 0..64u32 {
            #[allow(clippy::cast_precision_loss)]
            tree.create_proxy(square(i as f32 * 3.0, 0.0, 1.0), i);
            assert!(tree.max_imbalance() <= 1);
        }
        assert!(tree.is_consistent());
        // 64 leaves need at least height 6.
        assert!(tree.height() >= 6 && tree.height() <= 8);
    }

    #[test]
    fn destroy_returns_payload_once() {
        let mut tree = DynamicTree::new();
        let a = tree.create_proxy(square(0.0, 0.0, 1.0), 1u32);
        let b = tree.create_proxy(square(5.0, 0.0, 1.0), 2u32);
        assert_eq!(tree.destroy_proxy(a), Some(1));
        assert_eq!(tree.destroy_proxy(a), None);
        assert_eq!(tree.root(), Some(b));
        assert_eq!(tree.len(), 1);
        assert!(tree.is_consistent());
    }

    #[test]
    fn small_move_is_absorbed_by_fat_box() {
        let mut tree = DynamicTree::new();
        let p = tree.create_proxy(square(0.0, 0.0, 1.0), 0u32);
        assert!(!tree.move_proxy(p, square(0.05, 0.0, 1.0), Vec2::new(0.05, 0.0)));
        assert!(tree.move_proxy(p, square(1.0, 0.0, 1.0), Vec2::new(1.0, 0.0)));
        let fat = tree.fat_aabb(p).unwrap();
        // Displacement stretches the box forward only.
        assert!((fat.max().x() - (2.0 + FATTEN_AMOUNT + 2.0)).abs() < 1e-5);
        assert!((fat.min().x() - (0.0 - FATTEN_AMOUNT)).abs() < 1e-5);
    }

    #[test]
    fn query_pairs_is_canonical_and_sorted() {
        let mut tree = DynamicTree::new();
        let a = tree.create_proxy(square(0.0, 0.0, 1.0), 3u32);
        let b = tree.create_proxy(square(1.5, 0.0, 1.0), 1u32);
        let c = tree.create_proxy(square(20.0, 0.0, 1.0), 2u32);
        let pairs = tree.query_pairs(&[a, b, c]);
        assert_eq!(pairs, vec![(1, 3)]);
        assert!(tree.overlaps(a, b));
        assert!(!tree.overlaps(a, c));
    }
}
