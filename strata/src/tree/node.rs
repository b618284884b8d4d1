//! B+Tree Node Types

use serde::{Deserialize, Serialize};

use super::strata::StrataValue;

/// Handle naming a leaf in the sibling chain.
///
/// Ids are allocated by the owning tree and only ever used to find a leaf
/// again during ordered traversal. They carry no ownership.
pub(crate) type LeafId = u64;

/// A node in the tree.
///
/// Leaves hold keys and their values; inner nodes hold separator keys and
/// exclusively owned children. The `kind` tag and field layout are wire
/// format, shared by the whole-tree and per-level codecs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum Node<V> {
    Inner(NodeInner<V>),
    Leaf(NodeLeaf<V>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct NodeInner<V> {
    pub(crate) level: u32,
    pub(crate) keys: Vec<i64>,
    pub(crate) children: Vec<Node<V>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct NodeLeaf<V> {
    pub(crate) keys: Vec<i64>,
    pub(crate) values: Vec<V>,
    // The chain is rebuilt as leaves split; it is never persisted, so a
    // decoded leaf always starts unlinked.
    #[serde(skip)]
    pub(crate) id: LeafId,
    #[serde(skip)]
    pub(crate) next: Option<LeafId>,
}

/// Outcome of an overflow split: the new right sibling and the key promoted
/// to the parent.
pub(crate) struct Split<V> {
    pub(crate) separator: i64,
    pub(crate) node: Node<V>,
}

impl<V> Node<V> {
    /// Height of the subtree rooted here. Leaves are level 0.
    pub(crate) fn level(&self) -> u32 {
        match self {
            Node::Inner(node) => node.level,
            Node::Leaf(_) => 0,
        }
    }
}

impl<V> NodeLeaf<V>
where
    V: StrataValue,
{
    pub(crate) fn new(id: LeafId, key: i64, value: V) -> Self {
        Self {
            keys: vec![key],
            values: vec![value],
            id,
            next: None,
        }
    }

    /// Move the upper half into a new right sibling and splice it into the
    /// leaf chain. The separator handed to the parent is a copy of the
    /// sibling's first key; it stays in the sibling.
    pub(crate) fn split(&mut self, id: LeafId) -> Split<V> {
        let mid = (self.keys.len() + 1) / 2;

        tracing::debug!(keys = self.keys.len(), mid, "splitting leaf node");
        let sibling = NodeLeaf {
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
            id,
            next: self.next.take(),
        };
        self.next = Some(id);

        let separator = sibling.keys[0];
        Split {
            separator,
            node: Node::Leaf(sibling),
        }
    }
}

impl<V> NodeInner<V>
where
    V: StrataValue,
{
    /// Move everything after the midpoint into a new right sibling at the
    /// same level. Unlike a leaf split, the promoted separator is removed
    /// from both halves.
    pub(crate) fn split(&mut self) -> Split<V> {
        let mid = self.keys.len() / 2;
        let separator = self.keys[mid];

        tracing::debug!(keys = self.keys.len(), mid, "splitting inner node");
        let keys = self.keys.split_off(mid + 1);
        self.keys.truncate(mid);
        let children = self.children.split_off(mid + 1);

        Split {
            separator,
            node: Node::Inner(NodeInner {
                level: self.level,
                keys,
                children,
            }),
        }
    }
}
