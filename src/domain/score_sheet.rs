//! A single line of a tree flattened for navigation and move lists.
//!
//! `node_list` holds the starting position at index 0 followed by one entry
//! per ply. `move_list` pairs the plies into numbered full moves.

use serde::Serialize;
use tracing::debug;

use super::chess::PieceColor;
use super::move_tree::{NodeId, TreeNode, VariationTree};

/// One ply as shown in a move list
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlyEntry {
    pub node_id: NodeId,
    pub text: String,
    pub eval: Option<String>,
}

impl PlyEntry {
    fn from_node(node: &TreeNode) -> Self {
        Self {
            node_id: node.id,
            text: node.ply_text(true),
            eval: node.annotations.engine_evaluation.clone(),
        }
    }
}

/// A numbered full move. Either half may be missing: White's when the line
/// starts with a Black move, Black's at the end of a line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MovePair {
    pub number: u32,
    pub white: Option<PlyEntry>,
    pub black: Option<PlyEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct ScoreSheet {
    node_list: Vec<NodeId>,
    move_list: Vec<MovePair>,
}

impl ScoreSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the line to the path from the root of `tree` to `node_id`.
    /// Returns false if the node is not in the tree.
    pub fn set_line_to_node(&mut self, tree: &VariationTree, node_id: NodeId) -> bool {
        if tree.get(node_id).is_none() {
            debug!(node = node_id, "score sheet target not in tree");
            return false;
        }
        self.node_list = tree.path_to(node_id);
        self.rebuild_move_list(tree);
        true
    }

    /// Replaces the node list and rebuilds the move list.
    pub fn set_node_list(&mut self, tree: &VariationTree, line: Vec<NodeId>) {
        self.node_list = line;
        self.rebuild_move_list(tree);
    }

    /// Rebuilds the move list from the node list, e.g. after annotations
    /// or evaluations changed in the tree.
    pub fn rebuild_move_list(&mut self, tree: &VariationTree) {
        self.move_list.clear();
        let plies: Vec<&TreeNode> = self
            .node_list
            .iter()
            .skip(1)
            .filter_map(|&id| tree.get(id))
            .collect();
        for node in plies {
            self.add_ply(node);
        }
    }

    /// Appends a ply to the line and to the move list.
    pub fn add_ply_and_move(&mut self, tree: &VariationTree, node_id: NodeId) -> bool {
        let Some(node) = tree.get(node_id) else {
            debug!(node = node_id, "cannot add unknown node to score sheet");
            return false;
        };
        self.node_list.push(node_id);
        self.add_ply(node);
        true
    }

    fn add_ply(&mut self, node: &TreeNode) {
        let entry = PlyEntry::from_node(node);
        match node.moved_color() {
            PieceColor::Black => match self.move_list.last_mut() {
                Some(pair) if pair.black.is_none() => pair.black = Some(entry),
                _ => self.move_list.push(MovePair {
                    number: node.move_number(),
                    white: None,
                    black: Some(entry),
                }),
            },
            PieceColor::White => self.move_list.push(MovePair {
                number: node.move_number(),
                white: Some(entry),
                black: None,
            }),
        }
    }

    /// Removes the last ply. The starting position is never removed.
    pub fn remove_last_ply(&mut self) -> bool {
        if self.node_list.len() <= 1 {
            return false;
        }
        self.node_list.pop();
        if let Some(pair) = self.move_list.last_mut() {
            if pair.black.is_some() {
                pair.black = None;
                if pair.white.is_none() {
                    self.move_list.pop();
                }
            } else {
                self.move_list.pop();
            }
        }
        true
    }

    /// Removes every ply after `node_id`. Returns false if the node is not
    /// on the line, in which case the line is cut back to the root.
    pub fn rollback_to_node(&mut self, node_id: NodeId) -> bool {
        while let Some(&last) = self.node_list.last() {
            if last == node_id {
                return true;
            }
            if !self.remove_last_ply() {
                break;
            }
        }
        false
    }

    /// Removes trailing plies until the last node was produced by move
    /// `move_number` and has `color_to_move` on the move.
    pub fn rollback_to_ply(
        &mut self,
        tree: &VariationTree,
        move_number: u32,
        color_to_move: PieceColor,
    ) -> bool {
        while let Some(node) = self.last_node().and_then(|id| tree.get(id)) {
            if node.move_number() == move_number && node.color_to_move() == color_to_move {
                return true;
            }
            if !self.remove_last_ply() {
                break;
            }
        }
        false
    }

    /// Replaces the last ply with another node for the same side.
    pub fn replace_last_ply(&mut self, tree: &VariationTree, node_id: NodeId) -> bool {
        let Some(node) = tree.get(node_id) else {
            return false;
        };
        if self.node_list.len() <= 1 {
            return false;
        }
        if let Some(last) = self.node_list.last_mut() {
            *last = node_id;
        }
        if let Some(pair) = self.move_list.last_mut() {
            let entry = Some(PlyEntry::from_node(node));
            match node.moved_color() {
                PieceColor::Black => pair.black = entry,
                PieceColor::White => pair.white = entry,
            }
        }
        true
    }

    /// Node for the ply of full move `move_index` (0-based) played by `color`.
    pub fn get_node_for_move(&self, move_index: usize, color: PieceColor) -> Option<NodeId> {
        let offset = if color.is_white() { 1 } else { 2 };
        let found = move_index
            .checked_mul(2)
            .and_then(|i| i.checked_add(offset))
            .and_then(|idx| self.get_node_at_index(idx));
        if found.is_none() {
            debug!(move_index, ?color, "no node for move");
        }
        found
    }

    /// Inverse of [`get_node_for_move`](Self::get_node_for_move)
    pub fn move_for_index(idx: usize) -> Option<(usize, PieceColor)> {
        let ply = idx.checked_sub(1)?;
        let color = if ply % 2 == 0 {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        Some((ply / 2, color))
    }

    pub fn get_node_at_index(&self, idx: usize) -> Option<NodeId> {
        let found = self.node_list.get(idx).copied();
        if found.is_none() {
            debug!(idx, len = self.node_list.len(), "score sheet index out of range");
        }
        found
    }

    pub fn get_index_for_node(&self, node_id: NodeId) -> Option<usize> {
        self.node_list.iter().position(|&id| id == node_id)
    }

    /// The move pair holding the ply of `node_id` and the side that played
    /// it. The starting position has no move.
    pub fn get_move_from_node_id(&self, node_id: NodeId) -> Option<(&MovePair, PieceColor)> {
        if self.node_list.first() == Some(&node_id) {
            return None;
        }
        self.move_list.iter().find_map(|pair| {
            if pair.white.as_ref().is_some_and(|p| p.node_id == node_id) {
                Some((pair, PieceColor::White))
            } else if pair.black.as_ref().is_some_and(|p| p.node_id == node_id) {
                Some((pair, PieceColor::Black))
            } else {
                None
            }
        })
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.node_list.last().copied()
    }

    /// Line id of the last node, empty for an empty sheet
    pub fn line_id(&self, tree: &VariationTree) -> String {
        self.last_node()
            .and_then(|id| tree.get(id))
            .map(|n| n.line_id().to_string())
            .unwrap_or_default()
    }

    /// Number of entries in the node list, the starting position included
    pub fn ply_count(&self) -> usize {
        self.node_list.len()
    }

    pub fn node_list(&self) -> &[NodeId] {
        &self.node_list
    }

    pub fn move_list(&self) -> &[MovePair] {
        &self.move_list
    }

    pub fn clear(&mut self) {
        self.node_list.clear();
        self.move_list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::move_tree::{ContentType, ROOT_NODE_ID};

    fn line(moves: &[&str]) -> (VariationTree, Vec<NodeId>) {
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
    fn test_set_line_to_node() {
        let (tree, ids) = line(&["e4", "e5", "Nf3"]);
        let mut sheet = ScoreSheet::new();
        assert!(sheet.set_line_to_node(&tree, ids[2]));
        assert_eq!(sheet.node_list(), &[0, ids[0], ids[1], ids[2]]);
        let moves = sheet.move_list();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].number, 1);
        assert_eq!(moves[0].white.as_ref().unwrap().text, "e4");
        assert_eq!(moves[0].black.as_ref().unwrap().text, "e5");
        assert_eq!(moves[1].number, 2);
        assert!(moves[1].black.is_none());
        assert!(!sheet.set_line_to_node(&tree, 42));
    }

    #[test]
    fn test_line_starting_with_black() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let mut tree = VariationTree::from_fen(ContentType::Exercise, fen).unwrap();
        let c5 = tree.add_move(ROOT_NODE_ID, "c5").unwrap();
        let nf3 = tree.add_move(c5, "Nf3").unwrap();
        let mut sheet = ScoreSheet::new();
        sheet.set_line_to_node(&tree, ROOT_NODE_ID);
        sheet.add_ply_and_move(&tree, c5);
        sheet.add_ply_and_move(&tree, nf3);
        let moves = sheet.move_list();
        assert_eq!(moves.len(), 2);
        assert!(moves[0].white.is_none());
        assert_eq!(moves[0].black.as_ref().unwrap().node_id, c5);
        assert_eq!(moves[1].number, 2);
    }

    #[test]
    fn test_rollback_to_node() {
        let (tree, ids) = line(&["e4", "e5", "Nf3", "Nc6"]);
        let mut sheet = ScoreSheet::new();
        sheet.set_line_to_node(&tree, ids[3]);
        assert!(sheet.rollback_to_node(ids[0]));
        assert_eq!(sheet.node_list(), &[0, ids[0]]);
        assert_eq!(sheet.move_list().len(), 1);
        assert!(sheet.move_list()[0].black.is_none());
        // unknown node: everything but the root goes
        assert!(!sheet.rollback_to_node(99));
        assert_eq!(sheet.node_list(), &[0]);
        assert!(sheet.move_list().is_empty());
        assert!(!sheet.remove_last_ply());
    }

    #[test]
    fn test_rollback_to_ply() {
        let (tree, ids) = line(&["e4", "e5", "Nf3", "Nc6"]);
        let mut sheet = ScoreSheet::new();
        sheet.set_line_to_node(&tree, ids[3]);
        // position after 1...e5: move 1, White to move
        assert!(sheet.rollback_to_ply(&tree, 1, PieceColor::White));
        assert_eq!(sheet.last_node(), Some(ids[1]));
        assert_eq!(sheet.ply_count(), 3);
    }

    #[test]
    fn test_replace_last_ply() {
        let (mut tree, ids) = line(&["e4", "e5"]);
        let c5 = tree.add_move(ids[0], "c5").unwrap();
        let mut sheet = ScoreSheet::new();
        sheet.set_line_to_node(&tree, ids[1]);
        assert!(sheet.replace_last_ply(&tree, c5));
        assert_eq!(sheet.last_node(), Some(c5));
        assert_eq!(sheet.move_list()[0].black.as_ref().unwrap().text, "c5");
        assert_eq!(sheet.line_id(&tree), "1.2");
    }

    #[test]
    fn test_get_node_for_move_inverse() {
        let (tree, ids) = line(&["d4", "d5", "c4", "e6", "Nc3"]);
        let mut sheet = ScoreSheet::new();
        sheet.set_line_to_node(&tree, ids[4]);
        for idx in 1..sheet.ply_count() {
            let (move_index, color) = ScoreSheet::move_for_index(idx).unwrap();
            assert_eq!(sheet.get_node_for_move(move_index, color), sheet.get_node_at_index(idx));
        }
        assert_eq!(sheet.get_node_for_move(1, PieceColor::Black), Some(ids[3]));
        assert_eq!(sheet.get_node_for_move(2, PieceColor::Black), None);
        assert_eq!(ScoreSheet::move_for_index(0), None);
    }

    #[test]
    fn test_get_node_for_huge_move_index() {
        let (tree, ids) = line(&["e4"]);
        let mut sheet = ScoreSheet::new();
        sheet.set_line_to_node(&tree, ids[0]);
        assert_eq!(sheet.get_node_for_move(usize::MAX, PieceColor::Black), None);
        assert_eq!(sheet.get_node_for_move(usize::MAX / 2, PieceColor::White), None);
        assert_eq!(sheet.get_node_for_move(0, PieceColor::White), Some(ids[0]));
    }

    #[test]
    fn test_get_move_from_node_id() {
        let (tree, ids) = line(&["e4", "e5"]);
        let mut sheet = ScoreSheet::new();
        sheet.set_line_to_node(&tree, ids[1]);
        let (pair, color) = sheet.get_move_from_node_id(ids[1]).unwrap();
        assert_eq!(pair.number, 1);
        assert_eq!(color, PieceColor::Black);
        assert!(sheet.get_move_from_node_id(ROOT_NODE_ID).is_none());
        assert_eq!(sheet.get_index_for_node(ids[0]), Some(1));
    }
}
