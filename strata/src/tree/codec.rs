//! Tree codecs
//!
//! Two serializations of the same node records:
//!
//!  - whole tree: the root (and therefore every node below it) as one
//!    MessagePack blob
//!  - sharded: one blob per tree level, each holding the full list of nodes
//!    at that level
//!
//! Records are self-describing tagged maps (`kind` of `"leaf"` or
//! `"inner"`), so a decode of unrecognized data fails with
//! [`StrataError::InvalidFormat`] instead of producing a partial tree.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use anyhow::Result;

use super::node::Node;
use super::strata::StrataError;
use super::strata::StrataValue;

/// Serialize a tree. An empty tree encodes as nil.
pub(crate) fn encode<V>(root: Option<&Node<V>>) -> Result<Vec<u8>>
where
    V: StrataValue,
{
    // to_vec_named keeps struct fields as named map entries, which is what
    // makes the records self-describing
    Ok(rmp_serde::to_vec_named(&root)?)
}

/// Deserialize a tree previously produced by [`encode`].
pub(crate) fn decode<V>(data: &[u8]) -> Result<Option<Node<V>>>
where
    V: StrataValue,
{
    let root = rmp_serde::from_slice(data).map_err(StrataError::InvalidFormat)?;
    Ok(root)
}

/// Serialize a tree as one blob per level, keyed by level number.
///
/// Nodes are gathered breadth-first and grouped by level; each group is
/// encoded as a list of node records, every record carrying its complete
/// subtree. A subtree is therefore stored once per ancestor level. Only the
/// top blob is needed to rebuild the tree, but the per-level layout is wire
/// format and external consumers may address individual level objects.
pub(crate) fn encode_levels<V>(root: Option<&Node<V>>) -> Result<BTreeMap<u32, Vec<u8>>>
where
    V: StrataValue,
{
    let mut grouped: BTreeMap<u32, Vec<&Node<V>>> = BTreeMap::new();
    let mut queue: VecDeque<&Node<V>> = VecDeque::new();
    if let Some(root) = root {
        queue.push_back(root);
    }
    while let Some(node) = queue.pop_front() {
        grouped.entry(node.level()).or_default().push(node);
        if let Node::Inner(inner) = node {
            queue.extend(inner.children.iter());
        }
    }

    grouped
        .into_iter()
        .map(|(level, nodes)| Ok((level, rmp_serde::to_vec_named(&nodes)?)))
        .collect()
}

/// Deserialize a tree from its level blobs.
///
/// Every blob is decoded; the root is the node found at the maximum level.
/// Decoded nodes already carry their full subtrees, so the lower-level
/// blobs contribute nothing beyond validation and are dropped.
pub(crate) fn decode_levels<V>(blobs: &BTreeMap<u32, Vec<u8>>) -> Result<Option<Node<V>>>
where
    V: StrataValue,
{
    let mut root = None;
    // Ascending level order: the last list decoded holds the root
    for blob in blobs.values() {
        let nodes: Vec<Node<V>> = rmp_serde::from_slice(blob).map_err(StrataError::InvalidFormat)?;
        root = nodes.into_iter().next();
    }
    Ok(root)
}
