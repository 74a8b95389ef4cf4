//! Line ids: dotted labels identifying every line of a variation tree.
//!
//! The root is `"1"`. An only child inherits its parent's id and at a fork
//! child *i* (1-based) gets `parent.i`, so the id of a leaf names its line.

use super::move_tree::{NodeId, ROOT_NODE_ID, TreeNode, VariationTree};

impl VariationTree {
    /// Recomputes the line id of every node.
    pub fn build_lines(&mut self) {
        if let Some(root) = self.get_mut(ROOT_NODE_ID) {
            root.line_id = "1".to_string();
        }
        self.build_line_from(ROOT_NODE_ID);
    }

    /// Assigns line ids after `id` has been attached. Siblings of a new fork
    /// change their ids too, so the parent's subtree is relabelled.
    pub fn set_line_id_for_new_node(&mut self, id: NodeId) {
        if let Some(parent_id) = self.get(id).and_then(|n| n.parent_id) {
            self.build_line_from(parent_id);
        }
    }

    fn build_line_from(&mut self, start: NodeId) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let line_id = node.line_id.clone();
            let children = node.children.clone();
            let forked = children.len() > 1;
            for (i, &child) in children.iter().enumerate() {
                if let Some(child_node) = self.get_mut(child) {
                    child_node.line_id = if forked {
                        format!("{}.{}", line_id, i + 1)
                    } else {
                        line_id.clone()
                    };
                }
                stack.push(child);
            }
        }
    }

    /// The id of the line reached by following first children from `id`
    /// down to the leaf. `None` for an unknown node.
    pub fn get_default_line_id_for_node(&self, id: NodeId) -> Option<String> {
        let mut node = self.get(id)?;
        while let Some(child) = node.main_line_child().and_then(|c| self.get(c)) {
            node = child;
        }
        Some(node.line_id.clone())
    }

    /// Nodes of the line `line_id` in tree order: every node whose id is a
    /// prefix of `line_id`, then below it the nodes whose id extends it with
    /// `.1` segments only.
    pub fn select_line(&self, line_id: &str) -> Vec<NodeId> {
        let target: Vec<&str> = line_id.split('.').collect();
        self.nodes()
            .filter(|n| {
                let segments: Vec<&str> = n.line_id.split('.').collect();
                if target.starts_with(&segments) {
                    return true;
                }
                segments.starts_with(&target) && segments[target.len()..].iter().all(|s| *s == "1")
            })
            .map(|n| n.id)
            .collect()
    }

    /// First move of the main line: the root child labelled `1` or `1.1`.
    pub fn first_node_in_main_line(&self) -> Option<&TreeNode> {
        self.root()
            .children()
            .iter()
            .filter_map(|&c| self.get(c))
            .find(|c| c.line_id == "1" || c.line_id == "1.1")
    }
}
