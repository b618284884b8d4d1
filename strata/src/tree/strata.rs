//! B+Tree implementation
//!
//! This is the main data structure exposed by the library.
//!

use std::collections::HashMap;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::codec;
use super::node::LeafId;
use super::node::Node;
use super::node::NodeInner;
use super::node::NodeLeaf;
use super::node::Split;
use super::sparse::BuildIdentityHasher;
use crate::storage::ShardedStorageProvider;
use crate::storage::StorageProvider;

/// Capacity used by [`Strata::new`].
pub const DEFAULT_CAPACITY: usize = 100;

/// Values which we wish to store in a Strata tree.
pub trait StrataValue: Clone + Serialize + DeserializeOwned + std::fmt::Debug {}

// Blanket implementation which satisfies the compiler
impl<V> StrataValue for V
where
    V: Clone + Serialize + DeserializeOwned + std::fmt::Debug,
{
    // Nothing to implement, since V already supports the other traits.
    // It has the functions it needs already
}

/// Strata specific errors.
#[derive(Error, Debug)]
pub enum StrataError {
    /// Supplied capacity too small
    #[error("capacity: {0} must be >= 2")]
    CapacityTooSmall(usize),

    /// Persisted bytes did not decode as a tree
    #[error("invalid serialized data: {0}")]
    InvalidFormat(rmp_serde::decode::Error),
}

/// A B+Tree mapping 64-bit integer keys to values.
#[derive(Debug)]
pub struct Strata<V> {
    pub(crate) root: Option<Node<V>>,
    capacity: usize,
    /// Next unused leaf chain handle.
    sequence: LeafId,
}

impl<V> Default for Strata<V>
where
    V: StrataValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Strata<V>
where
    V: StrataValue,
{
    /// Create an empty tree with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self {
            root: None,
            capacity: DEFAULT_CAPACITY,
            sequence: 1,
        }
    }

    /// Create an empty tree with the specified capacity.
    ///
    /// The capacity bounds how many keys a node (leaf or inner) may hold
    /// before it splits.
    pub fn try_new(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(StrataError::CapacityTooSmall(capacity).into());
        }
        Ok(Self {
            root: None,
            capacity,
            sequence: 1,
        })
    }

    /// The configured node capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Does the tree hold zero entries?
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Tree height: 0 for an empty tree or a lone leaf root.
    pub fn height(&self) -> u32 {
        self.root.as_ref().map_or(0, Node::level)
    }

    /// Return count of entries.
    pub fn count(&self) -> usize {
        self.leaves().iter().map(|leaf| leaf.keys.len()).sum()
    }

    /// Does the tree contain this key?
    pub fn contains(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// Clear our tree.
    pub fn clear(&mut self) {
        self.root = None;
        self.sequence = 1;
    }

    /// Return the value stored for this key.
    pub fn get(&self, key: i64) -> Option<&V> {
        let mut node = self.root.as_ref()?;
        loop {
            match node {
                Node::Inner(inner) => {
                    node = inner.children.get(Self::route(inner, key))?;
                }
                Node::Leaf(leaf) => {
                    return leaf
                        .keys
                        .binary_search(&key)
                        .ok()
                        .map(|pos| &leaf.values[pos]);
                }
            }
        }
    }

    /// Insert a Key and Value.
    ///
    /// An existing key has its value overwritten in place. A fresh key may
    /// overflow nodes on the way back up; the root splitting is the only
    /// event that grows the tree height, and it grows it by exactly one.
    pub fn insert(&mut self, key: i64, value: V) {
        tracing::debug!(key, ?value, "inserting");
        let Some(root) = self.root.as_mut() else {
            let id = self.sequence;
            self.sequence += 1;
            self.root = Some(Node::Leaf(NodeLeaf::new(id, key, value)));
            return;
        };
        let Some(split) = Self::insert_into(root, key, value, self.capacity, &mut self.sequence)
        else {
            return;
        };
        // The split reached the root: put a new root above the two halves
        if let Some(old_root) = self.root.take() {
            self.root = Some(Node::Inner(NodeInner {
                level: old_root.level() + 1,
                keys: vec![split.separator],
                children: vec![old_root, split.node],
            }));
        }
    }

    /// Recursive descent for [`Strata::insert`]. Returns the split signal
    /// when this node overflowed and handed a new right sibling upward.
    fn insert_into(
        node: &mut Node<V>,
        key: i64,
        value: V,
        capacity: usize,
        sequence: &mut LeafId,
    ) -> Option<Split<V>> {
        match node {
            Node::Leaf(leaf) => {
                let pos = leaf.keys.partition_point(|&k| k < key);
                if leaf.keys.get(pos) == Some(&key) {
                    // Update path: no structural change, no count change
                    leaf.values[pos] = value;
                    return None;
                }
                leaf.keys.insert(pos, key);
                leaf.values.insert(pos, value);
                if leaf.keys.len() <= capacity {
                    return None;
                }
                let id = *sequence;
                *sequence += 1;
                Some(leaf.split(id))
            }
            Node::Inner(inner) => {
                let child_index = Self::route(inner, key);
                let split = Self::insert_into(
                    &mut inner.children[child_index],
                    key,
                    value,
                    capacity,
                    sequence,
                )?;
                inner.keys.insert(child_index, split.separator);
                inner.children.insert(child_index + 1, split.node);
                if inner.keys.len() <= capacity {
                    return None;
                }
                Some(inner.split())
            }
        }
    }

    /// Index of the child to descend into: lower bound over the separators,
    /// with an exact separator match routing one child to the right.
    fn route(inner: &NodeInner<V>, key: i64) -> usize {
        let pos = inner.keys.partition_point(|&k| k < key);
        if inner.keys.get(pos) == Some(&key) {
            pos + 1
        } else {
            pos
        }
    }

    /// Return every key in ascending order.
    ///
    /// Walks down the leftmost spine, then follows the leaf chain. If the
    /// structure is malformed (a childless inner node, a dangling chain
    /// handle) the walk stops early and returns the keys gathered so far.
    /// A freshly loaded tree has no chain beyond its leftmost leaf; see
    /// [`Strata::load`].
    pub fn keys(&self) -> Vec<i64> {
        self.chain()
            .iter()
            .flat_map(|leaf| leaf.keys.iter().copied())
            .collect()
    }

    /// Leaves in chain order: the leftmost leaf, then its `next` handles
    /// until the chain runs out. Malformed structures yield a prefix.
    pub(crate) fn chain(&self) -> Vec<&NodeLeaf<V>> {
        let Some(root) = self.root.as_ref() else {
            return Vec::new();
        };

        let registry: HashMap<LeafId, &NodeLeaf<V>, BuildIdentityHasher> =
            self.leaves().into_iter().map(|leaf| (leaf.id, leaf)).collect();

        let mut out = Vec::new();
        let mut node = root;
        let leaf = loop {
            match node {
                Node::Inner(inner) => match inner.children.first() {
                    Some(child) => node = child,
                    None => return out,
                },
                Node::Leaf(leaf) => break leaf,
            }
        };

        out.push(leaf);
        let mut next = leaf.next;
        // Bounding the walk by the leaf population means a corrupt chain
        // cannot cycle forever
        let mut remaining = registry.len();
        while let Some(id) = next {
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            match registry.get(&id) {
                Some(leaf) => {
                    out.push(leaf);
                    next = leaf.next;
                }
                None => break,
            }
        }
        out
    }

    /// Visit every `(key, value)` pair in ascending key order.
    pub fn entries(&self) -> impl Iterator<Item = (i64, &V)> + '_ {
        self.leaves()
            .into_iter()
            .flat_map(|leaf| leaf.keys.iter().copied().zip(leaf.values.iter()))
    }

    /// All leaves in document order, which is ascending key order.
    pub(crate) fn leaves(&self) -> Vec<&NodeLeaf<V>> {
        fn walk<'a, V>(node: &'a Node<V>, out: &mut Vec<&'a NodeLeaf<V>>) {
            match node {
                Node::Inner(inner) => {
                    for child in &inner.children {
                        walk(child, out);
                    }
                }
                Node::Leaf(leaf) => out.push(leaf),
            }
        }
        let mut out = Vec::new();
        if let Some(root) = self.root.as_ref() {
            walk(root, &mut out);
        }
        out
    }

    /// Log basic information about our B+Tree.
    pub fn info(&self) {
        tracing::info!(
            capacity = self.capacity,
            height = self.height(),
            entry_count = self.count(),
            "B+Tree"
        );
    }

    /// Persist the whole tree as a single blob.
    pub async fn save<S>(&self, storage: &S) -> Result<()>
    where
        S: StorageProvider,
    {
        let data = codec::encode(self.root.as_ref())?;
        tracing::info!(bytes = data.len(), "saving B+Tree");
        storage.save(&data).await
    }

    /// Replace this tree's contents with the most recently saved blob.
    ///
    /// On failure the current contents are untouched. The leaf chain is not
    /// persisted: point lookups on a loaded tree see every key, but ordered
    /// traversal stops at the end of its leftmost leaf.
    pub async fn load<S>(&mut self, storage: &S) -> Result<()>
    where
        S: StorageProvider,
    {
        let data = storage.load().await?;
        let root = codec::decode(&data)?;
        tracing::info!(bytes = data.len(), "loaded B+Tree");
        self.root = root;
        Ok(())
    }

    /// Persist the tree as one blob per tree level.
    ///
    /// Useful against backends that prefer many small objects over one
    /// large one. Each level blob embeds the full subtrees of its nodes, so
    /// levels below the root repeat data the root blob already carries;
    /// that layout is part of the wire format.
    pub async fn save_sharded<S>(&self, storage: &S) -> Result<()>
    where
        S: ShardedStorageProvider,
    {
        let levels = codec::encode_levels(self.root.as_ref())?;
        tracing::info!(levels = levels.len(), "saving B+Tree level shards");
        storage.save_levels(&levels).await
    }

    /// Replace this tree's contents with the most recently saved level
    /// shards. The chain caveat of [`Strata::load`] applies here too.
    pub async fn load_sharded<S>(&mut self, storage: &S) -> Result<()>
    where
        S: ShardedStorageProvider,
    {
        let blobs = storage.load_levels().await?;
        let root = codec::decode_levels(&blobs)?;
        tracing::info!(levels = blobs.len(), "loaded B+Tree level shards");
        self.root = root;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
