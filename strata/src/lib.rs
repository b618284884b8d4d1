#![warn(missing_docs)]
//! Strata B+Tree
//!
//! # Why is this called Strata?
//!
//! Because the tree can be persisted one level at a time, and a stack of
//! levels is a stack of strata.
//!
//! # Implementation Details
//!
//! Provides a simple in-memory B+Tree mapping 64-bit integer keys to
//! arbitrary values, with a user specified capacity (the maximum number of
//! keys a node may hold before it splits).
//!
//! (If you aren't sure what that means, you can read more about B+Trees here:
//! <https://en.wikipedia.org/wiki/B%2B_tree_>.)
//!
//! The B+Tree is composed of nodes. A node is either:
//!  - Leaf node, contains keys and values
//!  - Inner node, contains keys and child nodes
//!
//! Leaves are chained left to right, so a full ordered scan visits the
//! leftmost leaf and then follows the chain without revisiting inner nodes.
//!
//! The whole tree can be saved to (and loaded from) any [`storage::StorageProvider`].
//! Nodes are serialized as tagged MessagePack records. For backends which
//! prefer many small objects over one large one, the tree can instead be
//! persisted as one blob per tree level through a
//! [`storage::ShardedStorageProvider`].
//!
//! Mutation is synchronous and single-threaded; persistence suspends on
//! provider I/O. The tree provides no internal locking, so callers must
//! serialize access to a tree instance externally.

pub mod storage;
pub mod tree;
