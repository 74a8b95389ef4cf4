//! Variation tree data structure for studies, games and exercises.
//!
//! Nodes live in a flat arena owned by the tree. Children are owned forward
//! edges (node ids), `parent_id` is a non-owning back reference used only
//! for walking towards the root.

use std::collections::HashMap;

use serde::Serialize;
use shakmaty::Chess;
use tracing::debug;

use super::annotations::Annotations;
use super::chess::{
    AppliedMove, PieceColor, apply_san, check_suffix, color_to_move, fen_of, move_number_of,
    position_from_fen,
};
use super::header::GameHeader;
use crate::error::{TreeError, TreeResult};

/// Unique identifier for a node in the variation tree
pub type NodeId = usize;

/// Id of the root node of every tree
pub const ROOT_NODE_ID: NodeId = 0;

/// Maximum number of bookmarks created by [`VariationTree::generate_bookmarks`]
pub const MAX_GENERATED_BOOKMARKS: usize = 9;

/// What a tree represents inside a chapter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ContentType {
    Study,
    Intro,
    ModelGame,
    Exercise,
}

impl ContentType {
    /// Value of the `ContentType` header
    pub fn header_value(self) -> &'static str {
        match self {
            ContentType::Study => "Study Tree",
            ContentType::Intro => "Intro",
            ContentType::ModelGame => "Model Game",
            ContentType::Exercise => "Exercise",
        }
    }

    pub fn from_header_value(value: &str) -> Option<Self> {
        match value.trim() {
            "Study Tree" => Some(ContentType::Study),
            "Intro" => Some(ContentType::Intro),
            "Model Game" => Some(ContentType::ModelGame),
            "Exercise" => Some(ContentType::Exercise),
            _ => None,
        }
    }
}

/// A node in the variation tree: the position after one ply
#[derive(Clone, Debug)]
pub struct TreeNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Parent node ID (None for root)
    pub(crate) parent_id: Option<NodeId>,
    /// The chess position at this node
    pub position: Chess,
    /// The SAN notation of the move that led to this position (None for root)
    pub san: Option<String>,
    /// The engine notation of the same move
    pub uci: Option<String>,
    /// Child node IDs - first child is the main line continuation, rest are variations
    pub(crate) children: Vec<NodeId>,
    pub(crate) line_id: String,
    pub annotations: Annotations,
    pub(crate) is_bookmark: bool,
}

impl TreeNode {
    /// Create a root node holding the given starting position
    pub fn root(position: Chess) -> Self {
        Self {
            id: ROOT_NODE_ID,
            parent_id: None,
            position,
            san: None,
            uci: None,
            children: Vec::new(),
            line_id: String::new(),
            annotations: Annotations::default(),
            is_bookmark: false,
        }
    }

    /// Create a new node from a move
    pub fn new(id: NodeId, parent_id: NodeId, applied: AppliedMove) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            position: applied.position,
            san: Some(applied.san),
            uci: Some(applied.uci),
            children: Vec::new(),
            line_id: String::new(),
            annotations: Annotations::default(),
            is_bookmark: false,
        }
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn line_id(&self) -> &str {
        &self.line_id
    }

    pub fn is_bookmark(&self) -> bool {
        self.is_bookmark
    }

    /// Check if this is the root node
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this node has any children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if this node has variations (more than one child)
    pub fn has_variations(&self) -> bool {
        self.children.len() > 1
    }

    /// Get the main line continuation (first child), if any
    pub fn main_line_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    /// Get variation children (all children except the first)
    pub fn variation_children(&self) -> &[NodeId] {
        if self.children.len() > 1 {
            &self.children[1..]
        } else {
            &[]
        }
    }

    /// Number of the move that led to this node
    pub fn move_number(&self) -> u32 {
        move_number_of(&self.position)
    }

    pub fn color_to_move(&self) -> PieceColor {
        color_to_move(&self.position)
    }

    /// Side that made the move leading to this node
    pub fn moved_color(&self) -> PieceColor {
        self.color_to_move().opposite()
    }

    /// Move text for move lists: SAN, check suffix and optionally NAG glyphs
    pub fn ply_text(&self, with_nags: bool) -> String {
        let mut text = self.san.clone().unwrap_or_default();
        text.push_str(check_suffix(&self.position));
        if with_nags {
            text.push_str(&self.annotations.nag_glyphs());
        }
        text
    }
}

/// A tree of plies with variations
#[derive(Clone, Debug)]
pub struct VariationTree {
    /// All nodes in insertion order; parents always precede their children
    nodes: Vec<TreeNode>,
    /// Node id to slot in `nodes`
    index: HashMap<NodeId, usize>,
    content_type: ContentType,
    pub header: GameHeader,
    /// The currently viewed node
    current_id: NodeId,
}

impl VariationTree {
    /// Create a new tree with just the root (starting position)
    pub fn new(content_type: ContentType) -> Self {
        Self::from_position(content_type, Chess::default())
    }

    /// Create a tree whose root holds `position`
    pub fn from_position(content_type: ContentType, position: Chess) -> Self {
        let mut root = TreeNode::root(position);
        root.line_id = "1".to_string();
        Self {
            nodes: vec![root],
            index: HashMap::from([(ROOT_NODE_ID, 0)]),
            content_type,
            header: GameHeader::new(),
            current_id: ROOT_NODE_ID,
        }
    }

    /// Create a tree starting from a FEN position
    pub fn from_fen(content_type: ContentType, fen: &str) -> TreeResult<Self> {
        Ok(Self::from_position(content_type, position_from_fen(fen)?))
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Get a mutable reference to a node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        match self.index.get(&id) {
            Some(&slot) => Some(&mut self.nodes[slot]),
            None => None,
        }
    }

    /// Same as [`get`](Self::get)
    pub fn get_node_from_node_id(&self, id: NodeId) -> Option<&TreeNode> {
        self.get(id)
    }

    /// Node at a position in insertion order
    pub fn get_node_at_index(&self, idx: usize) -> Option<&TreeNode> {
        self.nodes.get(idx)
    }

    /// Get the root node
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Get the total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (only root)
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// A fresh id: the largest id in use plus one
    pub fn get_new_node_id(&self) -> NodeId {
        self.nodes.iter().map(|n| n.id).max().unwrap_or(ROOT_NODE_ID) + 1
    }

    /// Builds (but does not insert) a child of `parent_id` for a move
    pub fn create_child(&self, parent_id: NodeId, applied: AppliedMove) -> TreeResult<TreeNode> {
        if self.get(parent_id).is_none() {
            return Err(TreeError::UnknownNode(parent_id));
        }
        Ok(TreeNode::new(self.get_new_node_id(), parent_id, applied))
    }

    /// Adds a node whose `parent_id` already refers to a node in this tree,
    /// appending it to the parent's children.
    pub fn add_node_to_parent(&mut self, mut node: TreeNode) -> TreeResult<NodeId> {
        let parent_id = node.parent_id.ok_or_else(|| {
            TreeError::invalid_state(format!("node {} has no parent", node.id))
        })?;
        let Some(&parent_slot) = self.index.get(&parent_id) else {
            return Err(TreeError::invalid_state(format!(
                "parent {} of node {} is not in the tree",
                parent_id, node.id
            )));
        };
        if self.index.contains_key(&node.id) {
            return Err(TreeError::DuplicateNodeId(node.id));
        }

        let id = node.id;
        node.children.clear();
        self.nodes[parent_slot].children.push(id);
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        self.set_line_id_for_new_node(id);
        Ok(id)
    }

    /// Plays `san` from `parent_id`. Returns the existing child if the move
    /// is already in the tree, otherwise the id of the new node.
    pub fn add_move(&mut self, parent_id: NodeId, san: &str) -> TreeResult<NodeId> {
        let parent = self.get(parent_id).ok_or(TreeError::UnknownNode(parent_id))?;
        let applied = apply_san(&parent.position, san)?;
        self.add_applied_move(parent_id, applied)
    }

    /// Adds an already applied move under `parent_id`, reusing an identical
    /// sibling so that every distinct move has one edge.
    pub fn add_applied_move(&mut self, parent_id: NodeId, applied: AppliedMove) -> TreeResult<NodeId> {
        if let Some(existing) = self.get_identical_sibling(parent_id, &applied.uci) {
            return Ok(existing);
        }
        let node = self.create_child(parent_id, applied)?;
        self.add_node_to_parent(node)
    }

    /// Finds a child of `parent_id` reached by the same engine move
    pub fn get_identical_sibling(&self, parent_id: NodeId, uci: &str) -> Option<NodeId> {
        let parent = self.get(parent_id)?;
        parent
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).and_then(|c| c.uci.as_deref()) == Some(uci))
    }

    /// Finds a child of `parent_id` holding the same position (by FEN)
    pub fn find_existing_node(&self, parent_id: NodeId, position: &Chess) -> Option<NodeId> {
        let parent = self.get(parent_id)?;
        let fen = fen_of(position);
        parent
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).map(|c| fen_of(&c.position)) == Some(fen.clone()))
    }

    /// True if the node's parent has more than one child
    pub fn node_has_siblings(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(|n| n.parent_id)
            .and_then(|p| self.get(p))
            .is_some_and(|p| p.children.len() > 1)
    }

    /// Ids of the subtree rooted at `id` in pre-order, `id` first
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.get(id).is_none() {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Removes every descendant of `id`. Returns the removed ids so the
    /// caller can purge indexes that refer to them.
    pub fn remove_tail_after(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        if self.get(id).is_none() {
            return Err(TreeError::UnknownNode(id));
        }
        let mut removed = self.subtree_ids(id);
        removed.remove(0);
        if let Some(node) = self.get_mut(id) {
            node.children.clear();
        }
        self.discard(&removed);
        if removed.contains(&self.current_id) {
            self.current_id = id;
        }
        debug!(node = id, removed = removed.len(), "removed tail");
        Ok(removed)
    }

    /// Removes `id` and its whole subtree, detaching it from its parent.
    pub fn delete_subtree(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let node = self.get(id).ok_or(TreeError::UnknownNode(id))?;
        let Some(parent_id) = node.parent_id else {
            return Err(TreeError::invalid_state("the root node cannot be deleted"));
        };
        let removed = self.subtree_ids(id);
        if let Some(parent) = self.get_mut(parent_id) {
            parent.children.retain(|&c| c != id);
        }
        self.discard(&removed);
        if removed.contains(&self.current_id) {
            self.current_id = parent_id;
        }
        self.build_lines();
        Ok(removed)
    }

    fn discard(&mut self, ids: &[NodeId]) {
        if ids.is_empty() {
            return;
        }
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, n)| (n.id, slot))
            .collect();
    }

    /// Makes the branch containing `id` the first child at the closest fork
    /// where it is not the first child. Returns false if already main line.
    pub fn promote_line(&mut self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent_id) = self.get(current).and_then(|n| n.parent_id) {
            let Some(parent) = self.get_mut(parent_id) else {
                break;
            };
            if let Some(pos) = parent.children.iter().position(|&c| c == current) {
                if pos > 0 {
                    let promoted = parent.children.remove(pos);
                    parent.children.insert(0, promoted);
                    self.build_lines();
                    return true;
                }
            }
            current = parent_id;
        }
        false
    }

    /// Calculate the half-move number (ply) for a node; root is ply 0
    pub fn ply(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut current_id = id;
        while let Some(parent_id) = self.get(current_id).and_then(|n| n.parent_id) {
            count += 1;
            current_id = parent_id;
        }
        count
    }

    /// Get the main line as a sequence of node IDs (from root to end)
    pub fn main_line(&self) -> Vec<NodeId> {
        let mut line = vec![ROOT_NODE_ID];
        let mut current = self.root();
        while let Some(child) = current.main_line_child().and_then(|c| self.get(c)) {
            line.push(child.id);
            current = child;
        }
        line
    }

    /// Get the path from root to the given node
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            path.push(node.id);
            current = node.parent_id.and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }

    /// Check if a node is on the main line
    pub fn is_on_main_line(&self, id: NodeId) -> bool {
        self.main_line().contains(&id)
    }

    // Navigation

    /// Get the currently viewed node
    pub fn current(&self) -> &TreeNode {
        self.get(self.current_id).unwrap_or_else(|| self.root())
    }

    /// Get the current node ID
    pub fn current_id(&self) -> NodeId {
        self.current_id
    }

    /// Navigate to a specific node
    pub fn go_to(&mut self, id: NodeId) -> bool {
        if self.index.contains_key(&id) {
            self.current_id = id;
            true
        } else {
            false
        }
    }

    /// Navigate to the root
    pub fn go_to_root(&mut self) {
        self.current_id = ROOT_NODE_ID;
    }

    /// Navigate to parent (go back one move)
    pub fn go_back(&mut self) -> bool {
        if let Some(parent_id) = self.current().parent_id {
            self.current_id = parent_id;
            true
        } else {
            false
        }
    }

    /// Navigate to main line child (go forward one move)
    pub fn go_forward(&mut self) -> bool {
        if let Some(child_id) = self.current().main_line_child() {
            self.current_id = child_id;
            true
        } else {
            false
        }
    }

    /// Navigate to the end of the main line from current position
    pub fn go_to_end(&mut self) {
        while self.go_forward() {}
    }

    /// Check if we're at the root
    pub fn is_at_root(&self) -> bool {
        self.current_id == ROOT_NODE_ID
    }

    /// Check if we're at a leaf node (no children)
    pub fn is_at_leaf(&self) -> bool {
        self.current().children.is_empty()
    }

    // Bookmarks and annotations

    /// Sets the bookmark flag. Returns true if the flag changed.
    /// Callers holding a bookmark registry must go through the session so
    /// that the registry follows.
    pub fn set_bookmark(&mut self, id: NodeId, on: bool) -> bool {
        match self.get_mut(id) {
            Some(node) if node.is_bookmark != on => {
                node.is_bookmark = on;
                true
            }
            _ => false,
        }
    }

    /// Ids of bookmarked nodes in tree order
    pub fn bookmarked_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_bookmark)
            .map(|n| n.id)
            .collect()
    }

    pub fn has_bookmarks(&self) -> bool {
        self.nodes.iter().any(|n| n.is_bookmark)
    }

    /// Bookmarks a few training positions when the tree has none.
    /// Children of the first forks where the opponent of `training_side` is
    /// to move are picked; failing that, the last node with the training side
    /// to move (or the root). Returns the newly bookmarked ids.
    pub fn generate_bookmarks(&mut self, training_side: PieceColor) -> Vec<NodeId> {
        let mut marked = Vec::new();
        if self.has_bookmarks() {
            return marked;
        }

        if let Some(fork) = self.find_next_fork(ROOT_NODE_ID) {
            let fork_node = self.get(fork).cloned();
            if let Some(fork_node) = fork_node {
                if fork_node.color_to_move() != training_side {
                    self.bookmark_children(fork, &mut marked);
                } else if let Some(parent) = fork_node.parent_id.filter(|&p| p != ROOT_NODE_ID) {
                    self.bookmark_children(parent, &mut marked);
                }

                for child in fork_node.children {
                    if let Some(next_fork) = self.find_next_fork(child) {
                        let target = match self.get(next_fork) {
                            Some(n) if n.color_to_move() != training_side => Some(next_fork),
                            Some(n) => n.parent_id,
                            None => None,
                        };
                        if let Some(target) = target {
                            self.bookmark_children(target, &mut marked);
                        }
                    }
                }
            }
        }

        if marked.is_empty() {
            let fallback = self
                .nodes
                .iter()
                .rev()
                .find(|n| n.color_to_move() == training_side || n.id == ROOT_NODE_ID)
                .map(|n| n.id);
            if let Some(id) = fallback {
                self.set_bookmark(id, true);
                marked.push(id);
            }
        }
        marked
    }

    fn bookmark_children(&mut self, fork: NodeId, marked: &mut Vec<NodeId>) {
        let children = self.get(fork).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            if marked.len() >= MAX_GENERATED_BOOKMARKS {
                break;
            }
            if self.set_bookmark(child, true) {
                marked.push(child);
            }
        }
    }

    fn find_next_fork(&self, from: NodeId) -> Option<NodeId> {
        let mut node = self.get(from)?;
        while !node.children.is_empty() {
            if node.children.len() > 1 {
                return Some(node.id);
            }
            node = self.get(node.children[0])?;
        }
        None
    }

    pub fn has_moves_with_evaluations(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| n.annotations.engine_evaluation.as_deref().is_some_and(|e| !e.trim().is_empty()))
    }

    pub fn clear_engine_evaluations(&mut self) {
        for node in &mut self.nodes {
            node.annotations.engine_evaluation = None;
        }
    }
}

impl Default for VariationTree {
    fn default() -> Self {
        Self::new(ContentType::Study)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(moves: &[&str]) -> (VariationTree, Vec<NodeId>) {
        let mut tree = VariationTree::new(ContentType::Study);
        let mut parent = ROOT_NODE_ID;
        let mut ids = Vec::new();
        for san in moves {
            parent = tree.add_move(parent, san).unwrap();
            ids.push(parent);
        }
        (tree, ids)
    }

    #[test]
    fn test_new_tree() {
        let tree = VariationTree::new(ContentType::Study);
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert!(tree.is_at_root());
        assert!(tree.is_at_leaf());
        assert_eq!(tree.root().line_id(), "1");
    }

    #[test]
    fn test_add_move() {
        let (tree, ids) = tree_with(&["e4", "e5"]);
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(tree.get(1).unwrap().san.as_deref(), Some("e4"));
        assert_eq!(tree.get(2).unwrap().parent_id(), Some(1));
        assert_eq!(tree.get_new_node_id(), 3);
    }

    #[test]
    fn test_existing_move_is_reused() {
        let (mut tree, _) = tree_with(&["e4"]);
        let id = tree.add_move(ROOT_NODE_ID, "e4").unwrap();
        assert_eq!(id, 1);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get_identical_sibling(ROOT_NODE_ID, "e2e4"), Some(1));
        assert_eq!(tree.get_identical_sibling(ROOT_NODE_ID, "d2d4"), None);
    }

    #[test]
    fn test_add_node_with_missing_parent_fails() {
        let (mut tree, _) = tree_with(&["e4"]);
        let applied = apply_san(&Chess::default(), "d4").unwrap();
        let orphan = TreeNode::new(10, 42, applied);
        assert!(matches!(
            tree.add_node_to_parent(orphan),
            Err(TreeError::InvalidTreeState { .. })
        ));
    }

    #[test]
    fn test_add_node_with_duplicate_id_fails() {
        let (mut tree, _) = tree_with(&["e4"]);
        let applied = apply_san(&Chess::default(), "d4").unwrap();
        let dup = TreeNode::new(1, ROOT_NODE_ID, applied);
        assert_eq!(tree.add_node_to_parent(dup), Err(TreeError::DuplicateNodeId(1)));
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let (tree, _) = tree_with(&["e4"]);
        assert!(tree.get_node_from_node_id(99).is_none());
        assert!(tree.get_node_at_index(99).is_none());
        assert_eq!(tree.get_node_at_index(1).map(|n| n.id), Some(1));
    }

    #[test]
    fn test_navigation() {
        let (mut tree, _) = tree_with(&["e4", "e5"]);
        tree.go_to(2);
        assert!(tree.go_back());
        assert_eq!(tree.current_id(), 1);
        assert!(tree.go_back());
        assert_eq!(tree.current_id(), 0);
        assert!(!tree.go_back()); // Can't go back from root
        assert!(tree.go_forward());
        assert_eq!(tree.current_id(), 1);
        tree.go_to_end();
        assert_eq!(tree.current_id(), 2);
        assert!(!tree.go_to(77));
    }

    #[test]
    fn test_variations() {
        let (mut tree, _) = tree_with(&["e4"]);
        tree.add_move(ROOT_NODE_ID, "d4").unwrap();

        assert!(tree.root().has_variations());
        assert_eq!(tree.root().main_line_child(), Some(1)); // e4 is main line
        assert_eq!(tree.root().variation_children(), &[2]); // d4 is variation
        assert!(tree.node_has_siblings(2));
    }

    #[test]
    fn test_remove_tail_after() {
        let (mut tree, ids) = tree_with(&["e4", "e5", "Nf3", "Nc6"]);
        tree.add_move(ids[1], "Bc4").unwrap();
        tree.go_to(ids[3]);

        let removed = tree.remove_tail_after(ids[1]).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(tree.len(), 3);
        assert!(tree.get(ids[1]).unwrap().children().is_empty());
        assert_eq!(tree.current_id(), ids[1]);
        assert!(tree.get(ids[2]).is_none());
        // ids are handed out again from the current maximum
        assert_eq!(tree.get_new_node_id(), 3);
    }

    #[test]
    fn test_delete_subtree() {
        let (mut tree, ids) = tree_with(&["e4", "e5"]);
        let d4 = tree.add_move(ROOT_NODE_ID, "d4").unwrap();
        let removed = tree.delete_subtree(ids[0]).unwrap();
        assert_eq!(removed, vec![ids[0], ids[1]]);
        assert_eq!(tree.root().children(), &[d4]);
        assert_eq!(tree.get(d4).unwrap().line_id(), "1");
        assert!(tree.delete_subtree(ROOT_NODE_ID).is_err());
    }

    #[test]
    fn test_promote_line() {
        let (mut tree, ids) = tree_with(&["e4"]);
        let d4 = tree.add_move(ROOT_NODE_ID, "d4").unwrap();
        let d5 = tree.add_move(d4, "d5").unwrap();
        assert!(tree.promote_line(d5));
        assert_eq!(tree.root().children(), &[d4, ids[0]]);
        assert_eq!(tree.get(d5).unwrap().line_id(), "1.1");
        assert!(!tree.promote_line(d5));
    }

    #[test]
    fn test_paths() {
        let (mut tree, ids) = tree_with(&["e4", "e5"]);
        let c5 = tree.add_move(ids[0], "c5").unwrap();
        assert_eq!(tree.main_line(), vec![0, ids[0], ids[1]]);
        assert_eq!(tree.path_to(c5), vec![0, ids[0], c5]);
        assert_eq!(tree.ply(c5), 2);
        assert!(!tree.is_on_main_line(c5));
    }

    #[test]
    fn test_find_existing_node() {
        let (tree, ids) = tree_with(&["Nf3"]);
        let pos = apply_san(&Chess::default(), "Nf3").unwrap().position;
        assert_eq!(tree.find_existing_node(ROOT_NODE_ID, &pos), Some(ids[0]));
    }

    #[test]
    fn test_generate_bookmarks() {
        // 1.e4 (1.d4) e5 (1...c5): the first fork is at the root with White
        // to move, so when training Black the fork's children are bookmarked.
        let (mut tree, ids) = tree_with(&["e4", "e5"]);
        tree.add_move(ROOT_NODE_ID, "d4").unwrap();
        tree.add_move(ids[0], "c5").unwrap();

        let marked = tree.generate_bookmarks(PieceColor::Black);
        assert!(marked.contains(&ids[0]));
        assert!(tree.get(ids[0]).unwrap().is_bookmark());
        // a second call does nothing once bookmarks exist
        assert!(tree.generate_bookmarks(PieceColor::Black).is_empty());
    }

    #[test]
    fn test_generate_bookmarks_fallback() {
        let (mut tree, ids) = tree_with(&["e4", "e5"]);
        let marked = tree.generate_bookmarks(PieceColor::White);
        assert_eq!(marked, vec![ids[1]]);
    }

    #[test]
    fn test_content_type_header_values() {
        for ct in [
            ContentType::Study,
            ContentType::Intro,
            ContentType::ModelGame,
            ContentType::Exercise,
        ] {
            assert_eq!(ContentType::from_header_value(ct.header_value()), Some(ct));
        }
        assert_eq!(ContentType::from_header_value("Something"), None);
    }
}
