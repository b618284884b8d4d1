//! Read-only tree renderings
//!
//! Diagram text for humans. Both renderings return a `String`; writing them
//! to a file or terminal is the caller's business.

use super::node::Node;
use super::strata::Strata;
use super::strata::StrataValue;

impl<V> Strata<V>
where
    V: StrataValue,
{
    /// Render the tree as a Mermaid `graph TD` diagram.
    ///
    /// Consecutive leaves are joined by dotted `next` edges.
    pub fn to_mermaid(&self) -> String {
        let mut lines = vec!["graph TD".to_string()];
        match self.root.as_ref() {
            Some(root) => {
                let mut counter = 0;
                let mut leaf_ids = Vec::new();
                Self::mermaid_node(root, &mut lines, &mut counter, &mut leaf_ids);
                for pair in leaf_ids.windows(2) {
                    lines.push(format!("    {} -. \"next\" .-> {}", pair[0], pair[1]));
                }
            }
            None => lines.push("    empty[\"Empty Tree\"]".to_string()),
        }
        lines.join("\n")
    }

    fn mermaid_node(
        node: &Node<V>,
        lines: &mut Vec<String>,
        counter: &mut usize,
        leaf_ids: &mut Vec<String>,
    ) -> String {
        let my_id = format!("n{counter}");
        *counter += 1;

        match node {
            Node::Leaf(leaf) => {
                let keys = join(leaf.keys.iter(), " / ");
                let values = leaf
                    .values
                    .iter()
                    // Mermaid labels can't hold raw quotes
                    .map(|value| format!("{value:?}").replace('"', "&quot;"))
                    .collect::<Vec<_>>()
                    .join(" / ");
                lines.push(format!("    {my_id}(\"Leaf\\n{keys}\\n{values}\")"));
                leaf_ids.push(my_id.clone());
            }
            Node::Inner(inner) => {
                let keys = join(inner.keys.iter(), ", ");
                lines.push(format!("    {my_id}[\"Inner lvl {}\\n{keys}\"]", inner.level));
                for (index, child) in inner.children.iter().enumerate() {
                    let child_id = Self::mermaid_node(child, lines, counter, leaf_ids);
                    if index == 0 {
                        lines.push(format!("    {my_id} --> {child_id}"));
                    } else {
                        lines.push(format!(
                            "    {my_id} -- \"{}\" --> {child_id}",
                            inner.keys[index - 1]
                        ));
                    }
                }
            }
        }
        my_id
    }

    /// Render the tree as box-drawing text, followed by the leaf chain.
    pub fn to_ascii(&self) -> String {
        let Some(root) = self.root.as_ref() else {
            return "Empty tree".to_string();
        };

        let mut lines = Vec::new();
        Self::ascii_node(root, "", true, &mut lines);

        lines.push(String::new());
        lines.push("Leaf chain:".to_string());
        let chain = self
            .chain()
            .iter()
            .map(|leaf| {
                let keys = join(leaf.keys.iter(), ", ");
                let values = leaf
                    .values
                    .iter()
                    .map(|value| format!("{value:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{keys}: {values}]")
            })
            .collect::<Vec<_>>();
        lines.push(format!("{} --> null", chain.join(" --> ")));

        lines.join("\n")
    }

    fn ascii_node(node: &Node<V>, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
        let marker = if is_last { "└── " } else { "├── " };

        match node {
            Node::Leaf(leaf) => {
                let keys = join(leaf.keys.iter(), ", ");
                let values = leaf
                    .values
                    .iter()
                    .map(|value| format!("{value:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!("{prefix}{marker}Leaf: keys=[{keys}], values=[{values}]"));
            }
            Node::Inner(inner) => {
                let keys = join(inner.keys.iter(), ", ");
                lines.push(format!(
                    "{prefix}{marker}Inner lvl {}: keys=[{keys}]",
                    inner.level
                ));
                let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
                let last = inner.children.len().saturating_sub(1);
                for (index, child) in inner.children.iter().enumerate() {
                    Self::ascii_node(child, &child_prefix, index == last, lines);
                }
            }
        }
    }
}

fn join<'a>(keys: impl Iterator<Item = &'a i64>, separator: &str) -> String {
    keys.map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use crate::tree::Strata;

    #[test]
    fn it_renders_an_empty_tree() {
        let tree: Strata<usize> = Strata::new();
        assert_eq!(tree.to_ascii(), "Empty tree");
        assert!(tree.to_mermaid().contains("Empty Tree"));
    }

    #[test]
    fn it_renders_leaves_and_chain_edges() {
        let mut tree = Strata::try_new(4).expect("creates tree");
        for key in [10, 20, 5, 6, 12] {
            tree.insert(key, key * 10);
        }

        let mermaid = tree.to_mermaid();
        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("Inner lvl 1"));
        assert!(mermaid.contains("-. \"next\" .->"));

        let ascii = tree.to_ascii();
        assert!(ascii.contains("Leaf chain:"));
        assert!(ascii.ends_with("--> null"));
    }
}
