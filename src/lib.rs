//! An ordered key-value map implemented with an AVL tree.
//!
//! [`OrderedMap`] keeps its entries sorted by key in a height-balanced binary
//! search tree, so insertion and lookup take logarithmic time. Nodes are
//! stored in an arena and linked by index, parent links included.
//!
//! Entries can be added or overwritten but not removed one by one.

mod error;
mod map;
mod node;
mod rotation;

pub use error::MapError;
pub use map::OrderedMap;
