use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;
use std::mem;

use tracing::debug;

use crate::error::MapError;
use crate::node::{Link, Node, NodeId, Side};
use crate::rotation;

/// An ordered map implemented with an AVL tree.
///
/// Nodes live in an arena and refer to each other by index, so parent links
/// never form ownership cycles. Entries are never removed individually;
/// [`clear`](OrderedMap::clear) drops all of them at once.
///
/// Node handles are 32 bits wide, so a map holds at most `u32::MAX + 1`
/// entries; inserting beyond that panics.
///
/// ```
/// use avl_ordered_map::{MapError, OrderedMap};
/// let mut map = OrderedMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert_eq!(map.value(&3), Err(MapError::KeyNotFound));
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Link,
}

/// Where a key sits relative to the tree.
enum Position {
    /// The key is stored at this node.
    Occupied(NodeId),
    /// The key is absent; a new node would hang from this parent on this
    /// side, or become the root if there is no parent.
    Vacant(Option<(NodeId, Side)>),
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of elements in the map. Same as [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns the height of the tree, counted in edges from the root to the
    /// deepest leaf. Empty maps and single entries have height 0.
    pub fn height(&self) -> usize {
        match self.root {
            None => 0,
            Some(root) => self.subtree_heights()[root.index()],
        }
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        debug!(entries = self.nodes.len(), "clearing map");
        self.nodes = Vec::new();
        self.root = None;
    }

    /// Visits all entries in ascending key order.
    pub fn for_each_inorder<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a K, &'a V),
    {
        let nodes = &self.nodes;
        self.traverse(
            |_| {},
            move |id| {
                let node = &nodes[id.index()];
                f(&node.key, &node.value)
            },
            |_| {},
        );
    }

    // Height of every subtree, indexed by node.
    fn subtree_heights(&self) -> Vec<usize> {
        let mut heights = vec![0; self.nodes.len()];
        self.postorder(|id| {
            let node = &self.nodes[id.index()];
            let left_height = node.left.map_or(0, |left| heights[left.index()] + 1);
            let right_height = node.right.map_or(0, |right| heights[right.index()] + 1);
            heights[id.index()] = cmp::max(left_height, right_height);
        });
        heights
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodeId)>(&self, f: F) {
        self.traverse(f, |_| {}, |_| {});
    }

    fn postorder<F: FnMut(NodeId)>(&self, f: F) {
        self.traverse(|_| {}, |_| {}, f);
    }

    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodeId),
        In: FnMut(NodeId),
        Post: FnMut(NodeId),
    {
        if let Some(mut id) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                let node = &self.nodes[id.index()];
                match dir {
                    Direction::FromParent => {
                        preorder(id);
                        if let Some(left) = node.left {
                            id = left;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(id);
                        if let Some(right) = node.right {
                            id = right;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        postorder(id);
                        match node.parent {
                            Some(parent) => {
                                if self.nodes[parent.index()].left == Some(id) {
                                    dir = Direction::FromLeft;
                                }
                                id = parent;
                            }
                            None => break,
                        }
                    }
                }
            }
        }
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &self.nodes[id.index()].value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(&mut self.nodes[id.index()].value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| {
            let node = &self.nodes[id.index()];
            (&node.key, &node.value)
        })
    }

    /// Returns the value corresponding to the key, or
    /// [`MapError::KeyNotFound`] if the map has no such key.
    pub fn value<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    /// If the key is already present its value is overwritten and the old
    /// value returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.find_nearest(&key) {
            Position::Occupied(id) => Some(mem::replace(&mut self.nodes[id.index()].value, value)),
            Position::Vacant(slot) => {
                self.attach(slot, key, value);
                None
            }
        }
    }

    /// Inserts a key-value pair given as a tuple. See [`insert`](Self::insert).
    pub fn insert_pair(&mut self, (key, value): (K, V)) -> Option<V> {
        self.insert(key, value)
    }

    /// Returns a mutable reference to the value for `key`, inserting the
    /// value produced by `default` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let id = match self.find_nearest(&key) {
            Position::Occupied(id) => id,
            Position::Vacant(slot) => self.attach(slot, key, default()),
        };
        &mut self.nodes[id.index()].value
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    pub fn at(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check root link
        if let Some(root) = self.root {
            assert!(self.nodes[root.index()].parent.is_none());
        }

        // Check tree nodes
        let heights = self.subtree_heights();
        let mut num_nodes = 0;
        self.preorder(|id| {
            let node = &self.nodes[id.index()];
            let mut left_height = 0;
            let mut right_height = 0;

            // Check link for left child node
            if let Some(left) = node.left {
                let left_node = &self.nodes[left.index()];
                assert!(left_node.parent == Some(id));
                assert!(left_node.key < node.key);
                left_height = heights[left.index()] + 1;
            }

            // Check link for right child node
            if let Some(right) = node.right {
                let right_node = &self.nodes[right.index()];
                assert!(right_node.parent == Some(id));
                assert!(right_node.key > node.key);
                right_height = heights[right.index()] + 1;
            }

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            // Check stored balance factor
            assert_eq!(
                i64::from(node.balance),
                right_height as i64 - left_height as i64
            );

            num_nodes += 1;
        });

        // Check number of nodes
        assert_eq!(num_nodes, self.len());

        // Check key order
        let mut prev: Option<&K> = None;
        self.for_each_inorder(|key, _| {
            if let Some(prev) = prev {
                assert!(prev < key);
            }
            prev = Some(key);
        });
    }

    fn find<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id.index()];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        current
    }

    // Like `find`, but on a miss reports the last node on the search path.
    fn find_nearest(&self, key: &K) -> Position {
        let Some(mut id) = self.root else {
            return Position::Vacant(None);
        };
        loop {
            let node = &self.nodes[id.index()];
            let side = match key.cmp(&node.key) {
                Ordering::Equal => return Position::Occupied(id),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            match node.child(side) {
                Some(child) => id = child,
                None => return Position::Vacant(Some((id, side))),
            }
        }
    }

    fn attach(&mut self, slot: Option<(NodeId, Side)>, key: K, value: V) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let parent = slot.map(|(parent, _)| parent);
        self.nodes.push(Node::new(parent, key, value));
        match slot {
            None => {
                debug_assert!(self.root.is_none());
                self.root = Some(id);
            }
            Some((parent, side)) => {
                self.nodes[parent.index()].set_child(side, Some(id));
                self.rebalance_after_insert(id);
            }
        }
        id
    }

    /// Walks up from a freshly attached leaf, updating balance factors.
    /// Stops at the first ancestor whose subtree height did not change, or
    /// after the single rotation that restores balance.
    fn rebalance_after_insert(&mut self, leaf: NodeId) {
        let mut child = leaf;
        while let Some(parent) = self.nodes[child.index()].parent {
            let side = if self.nodes[parent.index()].left == Some(child) {
                Side::Left
            } else {
                Side::Right
            };
            let lean: i8 = match side {
                Side::Left => -1,
                Side::Right => 1,
            };

            let balance = self.nodes[parent.index()].balance;
            if balance == lean {
                // Two levels heavier on the child's side now
                self.nodes[parent.index()].balance = 2 * lean;
                let child_balance = self.nodes[child.index()].balance;
                let rotation = match side {
                    Side::Right if child_balance < 0 => {
                        rotation::rotate_right_left(&mut self.nodes, parent)
                    }
                    Side::Right => rotation::rotate_left(&mut self.nodes, parent),
                    Side::Left if child_balance > 0 => {
                        rotation::rotate_left_right(&mut self.nodes, parent)
                    }
                    Side::Left => rotation::rotate_right(&mut self.nodes, parent),
                };
                if rotation.grandparent.is_none() {
                    self.root = Some(rotation.top);
                }
                debug_assert_eq!(self.nodes[rotation.top.index()].balance, 0);
                break;
            }

            let balance = balance + lean;
            self.nodes[parent.index()].balance = balance;
            if balance == 0 {
                break;
            }
            child = parent;
        }
    }
}

#[cfg(test)]
impl<K, V> OrderedMap<K, V> {
    pub(crate) fn root_node(&self) -> Option<&Node<K, V>> {
        self.root.map(|root| &self.nodes[root.index()])
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.index()]
    }

    pub(crate) fn nodes(&self) -> &[Node<K, V>] {
        &self.nodes
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.for_each_inorder(|key, value| {
            map.entry(key, value);
        });
        map.finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut lhs = Vec::with_capacity(self.len());
        self.for_each_inorder(|key, value| lhs.push((key, value)));
        let mut rhs = Vec::with_capacity(other.len());
        other.for_each_inorder(|key, value| rhs.push((key, value)));
        lhs == rhs
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
