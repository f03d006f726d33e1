/// Stable handle of a node inside the map's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    /// Panics if `index` does not fit a `u32` handle.
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("node arena exceeds u32 handles"))
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) type Link = Option<NodeId>;

/// Which child slot of a parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
    /// Height of right subtree minus height of left subtree.
    pub(crate) balance: i8,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(parent: Link, key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
            balance: 0,
        }
    }

    pub(crate) fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Link) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
