//! Subtree rotations over the node arena.
//!
//! A rotation touches four local roles: the pivot, the child promoted above
//! it, the promoted child's inner subtree (displaced to the pivot) and the
//! grandparent whose child slot now points at the promoted node. Nothing
//! outside these nodes is read or written, so the tree root is reported
//! back through [`Rotation`] rather than updated here.

use tracing::trace;

use crate::node::{Link, Node, NodeId};

/// Outcome of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rotation {
    /// Node now at the top of the rotated subtree.
    pub(crate) top: NodeId,
    /// Parent of `top`. `None` means `top` is the new tree root.
    pub(crate) grandparent: Link,
}

fn node<K, V>(nodes: &[Node<K, V>], id: NodeId) -> &Node<K, V> {
    &nodes[id.index()]
}

fn node_mut<K, V>(nodes: &mut [Node<K, V>], id: NodeId) -> &mut Node<K, V> {
    &mut nodes[id.index()]
}

fn replace_child<K, V>(nodes: &mut [Node<K, V>], grandparent: Link, old: NodeId, new: NodeId) {
    if let Some(grandparent) = grandparent {
        let grandparent = node_mut(nodes, grandparent);
        if grandparent.left == Some(old) {
            grandparent.left = Some(new);
        } else {
            debug_assert_eq!(grandparent.right, Some(old));
            grandparent.right = Some(new);
        }
    }
}

/// Promotes the right child of `pivot`.
///
/// Balance factors of the two rotated nodes are updated from their values
/// before the rotation, which may be off by two at the pivot.
/// A pivot without right child is left untouched.
pub(crate) fn rotate_left<K, V>(nodes: &mut [Node<K, V>], pivot: NodeId) -> Rotation {
    let grandparent = node(nodes, pivot).parent;
    let Some(promoted) = node(nodes, pivot).right else {
        return Rotation {
            top: pivot,
            grandparent,
        };
    };
    let displaced = node(nodes, promoted).left;

    node_mut(nodes, pivot).right = displaced;
    if let Some(displaced) = displaced {
        node_mut(nodes, displaced).parent = Some(pivot);
    }

    node_mut(nodes, promoted).parent = grandparent;
    replace_child(nodes, grandparent, pivot, promoted);

    node_mut(nodes, promoted).left = Some(pivot);
    node_mut(nodes, pivot).parent = Some(promoted);

    let pivot_balance = node(nodes, pivot).balance - 1 - node(nodes, promoted).balance.max(0);
    let promoted_balance = node(nodes, promoted).balance - 1 + pivot_balance.min(0);
    node_mut(nodes, pivot).balance = pivot_balance;
    node_mut(nodes, promoted).balance = promoted_balance;

    trace!(?pivot, ?promoted, "rotated left");
    Rotation {
        top: promoted,
        grandparent,
    }
}

/// Promotes the left child of `pivot`. Mirror image of [`rotate_left`].
pub(crate) fn rotate_right<K, V>(nodes: &mut [Node<K, V>], pivot: NodeId) -> Rotation {
    let grandparent = node(nodes, pivot).parent;
    let Some(promoted) = node(nodes, pivot).left else {
        return Rotation {
            top: pivot,
            grandparent,
        };
    };
    let displaced = node(nodes, promoted).right;

    node_mut(nodes, pivot).left = displaced;
    if let Some(displaced) = displaced {
        node_mut(nodes, displaced).parent = Some(pivot);
    }

    node_mut(nodes, promoted).parent = grandparent;
    replace_child(nodes, grandparent, pivot, promoted);

    node_mut(nodes, promoted).right = Some(pivot);
    node_mut(nodes, pivot).parent = Some(promoted);

    let pivot_balance = node(nodes, pivot).balance + 1 - node(nodes, promoted).balance.min(0);
    let promoted_balance = node(nodes, promoted).balance + 1 + pivot_balance.max(0);
    node_mut(nodes, pivot).balance = pivot_balance;
    node_mut(nodes, promoted).balance = promoted_balance;

    trace!(?pivot, ?promoted, "rotated right");
    Rotation {
        top: promoted,
        grandparent,
    }
}

/// Right rotation at the right child of `pivot`, then left rotation at `pivot`.
pub(crate) fn rotate_right_left<K, V>(nodes: &mut [Node<K, V>], pivot: NodeId) -> Rotation {
    if let Some(right) = node(nodes, pivot).right {
        rotate_right(nodes, right);
    }
    rotate_left(nodes, pivot)
}

/// Left rotation at the left child of `pivot`, then right rotation at `pivot`.
pub(crate) fn rotate_left_right<K, V>(nodes: &mut [Node<K, V>], pivot: NodeId) -> Rotation {
    if let Some(left) = node(nodes, pivot).left {
        rotate_left(nodes, left);
    }
    rotate_right(nodes, pivot)
}
