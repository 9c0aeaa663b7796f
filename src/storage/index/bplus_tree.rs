// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! B+Tree ordered index
//!
//! An order-`m` B+Tree over any `Ord` key. Internal nodes carry only
//! separator keys; all values live in leaf buckets, which form a
//! doubly-linked chain in ascending key order. Range queries descend once to
//! the first qualifying leaf (or start at the cached chain head) and then
//! walk the chain, so a scan returning `k` entries costs `O(log n + k)`.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by index,
//! which keeps the sibling back-links free of ownership cycles.
//!
//! ## Split rules
//! - A leaf holding `capacity` entries splits at `len / 2`; the right half
//!   (midpoint included) moves to a new leaf spliced in after the old one and
//!   the midpoint key is promoted to the parent.
//! - An internal node holding `order` separators splits at `len / 2`; the
//!   midpoint separator moves up, the midpoint child stays on the left.
//!
//! There is no deletion, so nodes never merge.

use std::ops::Bound;

/// Smallest accepted order / leaf capacity
pub const MIN_ORDER: usize = 3;

/// Default maximum separators per internal node
pub const DEFAULT_ORDER: usize = 32;

/// Default maximum entries per leaf bucket
pub const DEFAULT_CAPACITY: usize = 32;

type NodeId = usize;

#[derive(Debug, Clone)]
struct InternalNode<K> {
    /// Separator keys (sorted); child `i` holds keys `< keys[i]`
    keys: Vec<K>,
    /// Child node ids, always `keys.len() + 1` of them
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct LeafNode<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl<K, V> LeafNode<K, V> {
    fn empty() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            prev: None,
            next: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

/// Index of the child whose range contains `key`; an exact separator match
/// routes to the right
#[inline]
fn child_slot<K: Ord>(separators: &[K], key: &K) -> usize {
    separators.partition_point(|s| s <= key)
}

/// Split `total` items into `ceil(total / max)` groups of near-equal size
fn group_sizes(total: usize, max: usize) -> Vec<usize> {
    let groups = total.div_ceil(max);
    let base = total / groups;
    let extra = total % groups;
    (0..groups)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// A B+Tree mapping keys to values
#[derive(Debug, Clone)]
pub struct BPlusTree<K, V> {
    nodes: Vec<Node<K, V>>,
    root: NodeId,
    /// First leaf of the chain
    head: NodeId,
    order: usize,
    capacity: usize,
    len: usize,
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Create an empty tree. `order` and `capacity` below [`MIN_ORDER`] are
    /// raised to it.
    pub fn new(order: usize, capacity: usize) -> Self {
        Self {
            nodes: vec![Node::Leaf(LeafNode::empty())],
            root: 0,
            head: 0,
            order: order.max(MIN_ORDER),
            capacity: capacity.max(MIN_ORDER),
            len: 0,
        }
    }

    /// Maximum separators per internal node before it splits
    pub fn order(&self) -> usize {
        self.order
    }

    /// Maximum entries per leaf before it splits
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, counting the leaf level
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            id = node.children[0];
            height += 1;
        }
        height
    }

    /// Remove every entry, keeping order and capacity
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::Leaf(LeafNode::empty()));
        self.root = 0;
        self.head = 0;
        self.len = 0;
    }

    fn leaf(&self, id: NodeId) -> &LeafNode<K, V> {
        match &self.nodes[id] {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => unreachable!("node {} is not a leaf", id),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K, V> {
        match &mut self.nodes[id] {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => unreachable!("node {} is not a leaf", id),
        }
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut InternalNode<K> {
        match &mut self.nodes[id] {
            Node::Internal(node) => node,
            Node::Leaf(_) => unreachable!("node {} is not an internal node", id),
        }
    }

    /// Descend to the leaf whose range contains `key`
    fn find_leaf(&self, key: &K) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            id = node.children[child_slot(&node.keys, key)];
        }
        id
    }

    // =========================================================================
    // Point operations
    // =========================================================================

    /// Look up the value stored under `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        let leaf = self.leaf(self.find_leaf(key));
        leaf.keys.binary_search(key).ok().map(|i| &leaf.values[i])
    }

    /// Mutable access to the value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find_leaf(key);
        let leaf = self.leaf_mut(id);
        match leaf.keys.binary_search(key) {
            Ok(i) => Some(&mut leaf.values[i]),
            Err(_) => None,
        }
    }

    /// Returns true if `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. Returns the previous value when `key` was present.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        // Internal nodes visited on the way down, with the child slot taken
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            let slot = child_slot(&node.keys, &key);
            path.push((id, slot));
            id = node.children[slot];
        }

        let capacity = self.capacity;
        let leaf = self.leaf_mut(id);
        match leaf.keys.binary_search(&key) {
            Ok(i) => return Some(std::mem::replace(&mut leaf.values[i], value)),
            Err(i) => {
                leaf.keys.insert(i, key);
                leaf.values.insert(i, value);
            }
        }
        let overflow = leaf.keys.len() >= capacity;
        self.len += 1;

        if overflow {
            self.split_leaf(id, path);
        }
        None
    }

    fn split_leaf(&mut self, id: NodeId, path: Vec<(NodeId, usize)>) {
        let new_id = self.nodes.len();
        let leaf = self.leaf_mut(id);
        let mid = leaf.keys.len() / 2;
        let keys = leaf.keys.split_off(mid);
        let values = leaf.values.split_off(mid);
        let old_next = leaf.next.replace(new_id);
        let separator = keys[0].clone();

        if let Some(next) = old_next {
            self.leaf_mut(next).prev = Some(new_id);
        }
        self.nodes.push(Node::Leaf(LeafNode {
            keys,
            values,
            prev: Some(id),
            next: old_next,
        }));
        self.insert_into_parent(path, id, separator, new_id);
    }

    /// Hook `right` into the parent of `left` under `separator`, splitting
    /// upwards as needed
    fn insert_into_parent(
        &mut self,
        mut path: Vec<(NodeId, usize)>,
        left: NodeId,
        separator: K,
        right: NodeId,
    ) {
        match path.pop() {
            None => {
                let new_root = self.nodes.len();
                self.nodes.push(Node::Internal(InternalNode {
                    keys: vec![separator],
                    children: vec![left, right],
                }));
                self.root = new_root;
            }
            Some((parent, slot)) => {
                let order = self.order;
                let node = self.internal_mut(parent);
                node.keys.insert(slot, separator);
                node.children.insert(slot + 1, right);
                if node.keys.len() >= order {
                    self.split_internal(parent, path);
                }
            }
        }
    }

    fn split_internal(&mut self, id: NodeId, path: Vec<(NodeId, usize)>) {
        let new_id = self.nodes.len();
        let node = self.internal_mut(id);
        let mid = node.keys.len() / 2;
        let mut right_keys = node.keys.split_off(mid);
        let promoted = right_keys.remove(0);
        let right_children = node.children.split_off(mid + 1);

        self.nodes.push(Node::Internal(InternalNode {
            keys: right_keys,
            children: right_children,
        }));
        self.insert_into_parent(path, id, promoted, new_id);
    }

    // =========================================================================
    // Bulk load
    // =========================================================================

    /// Replace the contents with two parallel, ascending, duplicate-free
    /// sequences. The result answers every query exactly as a tree built by
    /// `put`ting the pairs in order would.
    ///
    /// Input that is not strictly ascending is loaded through `put` instead.
    pub fn construct(&mut self, keys: Vec<K>, values: Vec<V>) {
        debug_assert_eq!(keys.len(), values.len());
        self.clear();

        if !keys.windows(2).all(|w| w[0] < w[1]) {
            for (key, value) in keys.into_iter().zip(values) {
                self.put(key, value);
            }
            return;
        }

        let total = keys.len().min(values.len());
        if total == 0 {
            return;
        }

        // Leaves, packed below the split threshold and chained left to right
        self.nodes.clear();
        let mut keys = keys.into_iter();
        let mut values = values.into_iter();
        let mut level: Vec<(NodeId, K)> = Vec::new();
        for size in group_sizes(total, self.capacity - 1) {
            let id = self.nodes.len();
            let leaf_keys: Vec<K> = keys.by_ref().take(size).collect();
            let leaf_values: Vec<V> = values.by_ref().take(size).collect();
            let prev = level.last().map(|(prev, _)| *prev);
            if let Some(prev) = prev {
                self.leaf_mut(prev).next = Some(id);
            }
            level.push((id, leaf_keys[0].clone()));
            self.nodes.push(Node::Leaf(LeafNode {
                keys: leaf_keys,
                values: leaf_values,
                prev,
                next: None,
            }));
        }
        self.head = level[0].0;
        self.len = total;

        // Internal levels until a single root remains
        while level.len() > 1 {
            let mut children = level.into_iter();
            let mut parents = Vec::new();
            for size in group_sizes(children.len(), self.order) {
                let group: Vec<(NodeId, K)> = children.by_ref().take(size).collect();
                let min_key = group[0].1.clone();
                let mut ids = Vec::with_capacity(group.len());
                let mut separators = Vec::with_capacity(group.len() - 1);
                for (i, (child, child_min)) in group.into_iter().enumerate() {
                    if i > 0 {
                        separators.push(child_min);
                    }
                    ids.push(child);
                }
                let id = self.nodes.len();
                self.nodes.push(Node::Internal(InternalNode {
                    keys: separators,
                    children: ids,
                }));
                parents.push((id, min_key));
            }
            level = parents;
        }
        self.root = level[0].0;
    }

    // =========================================================================
    // Ordered scans
    // =========================================================================

    /// Iterate over all entries in ascending key order
    pub fn iter(&self) -> Range<'_, K, V> {
        self.range_bounds(Bound::Unbounded, Bound::Unbounded)
    }

    /// Iterate over the entries between two bounds, in ascending key order
    pub fn range_bounds(&self, lower: Bound<&K>, upper: Bound<&K>) -> Range<'_, K, V> {
        let empty = match (&lower, &upper) {
            (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
            (Bound::Included(lo), Bound::Excluded(hi))
            | (Bound::Excluded(lo), Bound::Included(hi))
            | (Bound::Excluded(lo), Bound::Excluded(hi)) => lo >= hi,
            _ => false,
        };
        if empty || self.is_empty() {
            return Range::empty(self);
        }

        let (leaf, pos) = match lower {
            Bound::Unbounded => (self.head, 0),
            Bound::Included(key) => {
                let id = self.find_leaf(key);
                (id, self.leaf(id).keys.partition_point(|k| k < key))
            }
            Bound::Excluded(key) => {
                let id = self.find_leaf(key);
                (id, self.leaf(id).keys.partition_point(|k| k <= key))
            }
        };
        let upper = match upper {
            Bound::Unbounded => Bound::Unbounded,
            Bound::Included(key) => Bound::Included(key.clone()),
            Bound::Excluded(key) => Bound::Excluded(key.clone()),
        };
        Range::new(self, leaf, pos, upper)
    }

    /// All entries in ascending key order
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    /// All keys in ascending order
    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Entries with `from <= key < to`
    pub fn range(&self, from: &K, to: &K) -> Vec<(&K, &V)> {
        self.range_bounds(Bound::Included(from), Bound::Excluded(to))
            .collect()
    }

    /// Entries between `from` and `to` with explicit inclusivity on each end
    pub fn range_inclusive(
        &self,
        from: &K,
        from_inclusive: bool,
        to: &K,
        to_inclusive: bool,
    ) -> Vec<(&K, &V)> {
        let lower = if from_inclusive {
            Bound::Included(from)
        } else {
            Bound::Excluded(from)
        };
        let upper = if to_inclusive {
            Bound::Included(to)
        } else {
            Bound::Excluded(to)
        };
        self.range_bounds(lower, upper).collect()
    }

    /// Entries with `key < to`
    pub fn less_than(&self, to: &K) -> Vec<(&K, &V)> {
        self.range_bounds(Bound::Unbounded, Bound::Excluded(to))
            .collect()
    }

    /// Entries with `key <= to`
    pub fn less_equal(&self, to: &K) -> Vec<(&K, &V)> {
        self.range_bounds(Bound::Unbounded, Bound::Included(to))
            .collect()
    }

    /// Entries with `key > from`
    pub fn greater_than(&self, from: &K) -> Vec<(&K, &V)> {
        self.range_bounds(Bound::Excluded(from), Bound::Unbounded)
            .collect()
    }

    /// Entries with `key >= from`
    pub fn greater_equal(&self, from: &K) -> Vec<(&K, &V)> {
        self.range_bounds(Bound::Included(from), Bound::Unbounded)
            .collect()
    }

    /// Smallest key
    pub fn first_key(&self) -> Option<&K> {
        self.leaf(self.head).keys.first()
    }

    /// Largest key
    pub fn last_key(&self) -> Option<&K> {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            id = node.children[node.children.len() - 1];
        }
        self.leaf(id).keys.last()
    }
}

impl<K: Ord + Clone, V> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER, DEFAULT_CAPACITY)
    }
}

/// Ascending iterator over a key range, walking the leaf chain
pub struct Range<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    leaf: Option<NodeId>,
    pos: usize,
    /// End of the qualifying slice in the current leaf
    end: usize,
    /// The upper bound falls inside the current leaf
    last_leaf: bool,
    upper: Bound<K>,
}

impl<'a, K: Ord + Clone, V> Range<'a, K, V> {
    fn empty(tree: &'a BPlusTree<K, V>) -> Self {
        Self {
            tree,
            leaf: None,
            pos: 0,
            end: 0,
            last_leaf: true,
            upper: Bound::Unbounded,
        }
    }

    fn new(tree: &'a BPlusTree<K, V>, leaf: NodeId, pos: usize, upper: Bound<K>) -> Self {
        let mut range = Self {
            tree,
            leaf: Some(leaf),
            pos,
            end: 0,
            last_leaf: false,
            upper,
        };
        range.bound_leaf(leaf);
        range
    }

    /// Binary-search the end of the qualifying slice in `leaf`
    fn bound_leaf(&mut self, leaf: NodeId) {
        let tree = self.tree;
        let keys = &tree.leaf(leaf).keys;
        self.end = match &self.upper {
            Bound::Unbounded => keys.len(),
            Bound::Included(key) => keys.partition_point(|k| k <= key),
            Bound::Excluded(key) => keys.partition_point(|k| k < key),
        };
        self.last_leaf = self.end < keys.len();
    }
}

impl<'a, K: Ord + Clone, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let leaf = tree.leaf(self.leaf?);
            if self.pos < self.end {
                let i = self.pos;
                self.pos += 1;
                return Some((&leaf.keys[i], &leaf.values[i]));
            }
            if self.last_leaf {
                self.leaf = None;
                return None;
            }
            self.leaf = leaf.next;
            self.pos = 0;
            if let Some(next) = self.leaf {
                self.bound_leaf(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;

    /// Walk the whole structure and check every split invariant
    fn check_invariants<K: Ord + Clone + Debug, V>(tree: &BPlusTree<K, V>) {
        fn walk<K: Ord + Clone + Debug, V>(
            tree: &BPlusTree<K, V>,
            id: NodeId,
            low: Option<&K>,
            high: Option<&K>,
            depth: usize,
            leaf_depths: &mut Vec<usize>,
            leaves: &mut Vec<NodeId>,
        ) {
            match &tree.nodes[id] {
                Node::Internal(node) => {
                    assert_eq!(node.children.len(), node.keys.len() + 1);
                    assert!(!node.keys.is_empty());
                    assert!(node.keys.len() < tree.order);
                    assert!(node.keys.windows(2).all(|w| w[0] < w[1]));
                    for (i, child) in node.children.iter().enumerate() {
                        let lo = if i == 0 { low } else { Some(&node.keys[i - 1]) };
                        let hi = if i == node.keys.len() {
                            high
                        } else {
                            Some(&node.keys[i])
                        };
                        walk(tree, *child, lo, hi, depth + 1, leaf_depths, leaves);
                    }
                }
                Node::Leaf(leaf) => {
                    assert_eq!(leaf.keys.len(), leaf.values.len());
                    assert!(leaf.keys.len() < tree.capacity);
                    assert!(leaf.keys.windows(2).all(|w| w[0] < w[1]));
                    for key in &leaf.keys {
                        if let Some(lo) = low {
                            assert!(key >= lo, "{:?} below separator {:?}", key, lo);
                        }
                        if let Some(hi) = high {
                            assert!(key < hi, "{:?} not below separator {:?}", key, hi);
                        }
                    }
                    leaf_depths.push(depth);
                    leaves.push(id);
                }
            }
        }

        let mut depths = Vec::new();
        let mut leaves = Vec::new();
        walk(tree, tree.root, None, None, 1, &mut depths, &mut leaves);
        assert!(depths.iter().all(|d| *d == tree.height()));

        // The chain visits the leaves left to right, with matching back-links
        assert_eq!(leaves[0], tree.head);
        for (i, id) in leaves.iter().enumerate() {
            let leaf = tree.leaf(*id);
            assert_eq!(leaf.prev, if i == 0 { None } else { Some(leaves[i - 1]) });
            assert_eq!(leaf.next, leaves.get(i + 1).copied());
        }
        assert_eq!(tree.iter().count(), tree.len());
    }

    #[test]
    fn test_new_tree() {
        let tree: BPlusTree<i32, i32> = BPlusTree::default();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.get(&1).is_none());
        assert!(tree.entries().is_empty());
        assert_eq!(tree.first_key(), None);
    }

    #[test]
    fn test_order_is_clamped() {
        let tree: BPlusTree<i32, i32> = BPlusTree::new(0, 1);
        assert_eq!(tree.order(), MIN_ORDER);
        assert_eq!(tree.capacity(), MIN_ORDER);
    }

    #[test]
    fn test_put_and_get() {
        let mut tree = BPlusTree::new(3, 3);
        for k in [5, 3, 7, 1, 9] {
            assert!(tree.put(k, k * 10).is_none());
        }
        assert_eq!(tree.len(), 5);
        for k in [5, 3, 7, 1, 9] {
            assert_eq!(tree.get(&k), Some(&(k * 10)));
        }
        assert!(!tree.contains_key(&4));
        check_invariants(&tree);
    }

    #[test]
    fn test_put_replaces() {
        let mut tree = BPlusTree::new(3, 3);
        tree.put(1, "a");
        assert_eq!(tree.put(1, "b"), Some("a"));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(&"b"));
    }

    #[test]
    fn test_leaf_split_promotes_midpoint() {
        let mut tree = BPlusTree::new(3, 3);
        tree.put(1, ());
        tree.put(2, ());
        tree.put(3, ());
        // [1] [2 3] under separator 2
        assert_eq!(tree.height(), 2);
        match &tree.nodes[tree.root] {
            Node::Internal(node) => assert_eq!(node.keys, vec![2]),
            Node::Leaf(_) => panic!("root should be internal"),
        }
        assert_eq!(tree.leaf(tree.head).keys, vec![1]);
        check_invariants(&tree);
    }

    #[test]
    fn test_cascading_splits() {
        let mut tree = BPlusTree::new(3, 3);
        for k in 0..200 {
            tree.put(k, k);
            check_invariants(&tree);
        }
        assert!(tree.height() > 3);
        assert_eq!(tree.keys(), (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_reverse_and_interleaved_insertion() {
        let mut tree = BPlusTree::new(4, 5);
        for k in (0..300).rev() {
            tree.put(k, k);
        }
        for k in (1000..1300).step_by(7) {
            tree.put(k, k);
        }
        check_invariants(&tree);
        let keys = tree.keys();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tree.first_key(), Some(&0));
        assert_eq!(tree.last_key(), Some(&1294));
    }

    #[test]
    fn test_get_mut_appends() {
        let mut tree: BPlusTree<i32, Vec<i32>> = BPlusTree::new(3, 3);
        for (k, v) in [(1, 10), (2, 20), (1, 11)] {
            match tree.get_mut(&k) {
                Some(list) => list.push(v),
                None => {
                    tree.put(k, vec![v]);
                }
            }
        }
        assert_eq!(tree.get(&1), Some(&vec![10, 11]));
        assert_eq!(tree.get(&2), Some(&vec![20]));
    }

    #[test]
    fn test_range_variants() {
        let mut tree = BPlusTree::new(3, 4);
        for k in (0..100).step_by(10) {
            tree.put(k, k);
        }
        let keys = |v: Vec<(&i32, &i32)>| v.into_iter().map(|(k, _)| *k).collect::<Vec<_>>();

        assert_eq!(keys(tree.range(&20, &50)), vec![20, 30, 40]);
        assert_eq!(keys(tree.range(&25, &55)), vec![30, 40, 50]);
        assert_eq!(
            keys(tree.range_inclusive(&20, false, &50, true)),
            vec![30, 40, 50]
        );
        assert_eq!(
            keys(tree.range_inclusive(&20, true, &50, true)),
            vec![20, 30, 40, 50]
        );
        assert_eq!(keys(tree.range_inclusive(&20, false, &50, false)), vec![30, 40]);
        assert_eq!(keys(tree.less_than(&30)), vec![0, 10, 20]);
        assert_eq!(keys(tree.less_equal(&30)), vec![0, 10, 20, 30]);
        assert_eq!(keys(tree.greater_than(&70)), vec![80, 90]);
        assert_eq!(keys(tree.greater_equal(&70)), vec![70, 80, 90]);
        assert!(tree.range(&50, &50).is_empty());
        assert!(tree.range(&60, &20).is_empty());
        assert!(tree.greater_than(&90).is_empty());
        assert!(tree.less_than(&0).is_empty());
    }

    #[test]
    fn test_construct_matches_put() {
        for n in [0usize, 1, 2, 3, 7, 64, 257] {
            let keys: Vec<i32> = (0..n as i32).map(|k| k * 3).collect();
            let values: Vec<i32> = keys.iter().map(|k| k + 1).collect();

            let mut bulk = BPlusTree::new(3, 3);
            bulk.construct(keys.clone(), values.clone());
            if n > 0 {
                check_invariants(&bulk);
            }

            let mut seq = BPlusTree::new(3, 3);
            for (k, v) in keys.iter().zip(values.iter()) {
                seq.put(*k, *v);
            }

            assert_eq!(bulk.len(), seq.len());
            assert_eq!(bulk.entries(), seq.entries());
            assert_eq!(bulk.range(&10, &100), seq.range(&10, &100));
            for k in -1..(n as i32 * 3 + 1) {
                assert_eq!(bulk.get(&k), seq.get(&k));
            }
        }
    }

    #[test]
    fn test_construct_then_put() {
        let mut tree = BPlusTree::new(3, 3);
        tree.construct((0..50).map(|k| k * 2).collect(), vec![(); 50]);
        for k in 0..50 {
            tree.put(k * 2 + 1, ());
        }
        check_invariants(&tree);
        assert_eq!(tree.keys(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_construct_unsorted_falls_back_to_put() {
        let mut tree = BPlusTree::new(3, 3);
        tree.construct(vec![3, 1, 2, 1], vec!["c", "a", "b", "z"]);
        check_invariants(&tree);
        assert_eq!(tree.keys(), vec![1, 2, 3]);
        assert_eq!(tree.get(&1), Some(&"z"));
    }

    #[test]
    fn test_string_keys() {
        let mut tree = BPlusTree::new(3, 3);
        for word in ["pear", "apple", "fig", "banana", "cherry", "date"] {
            tree.put(word.to_string(), word.len());
        }
        check_invariants(&tree);
        assert_eq!(
            tree.keys(),
            vec!["apple", "banana", "cherry", "date", "fig", "pear"]
        );
        let from = "b".to_string();
        let to = "d".to_string();
        let found: Vec<_> = tree.range(&from, &to).into_iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(found, vec!["banana", "cherry"]);
    }

    #[test]
    fn test_group_sizes() {
        assert_eq!(group_sizes(5, 2), vec![2, 2, 1]);
        assert_eq!(group_sizes(4, 3), vec![2, 2]);
        assert_eq!(group_sizes(7, 3), vec![3, 2, 2]);
        assert_eq!(group_sizes(2, 3), vec![2]);
    }
}
