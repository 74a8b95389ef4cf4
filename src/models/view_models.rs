//! Display data for move lists, bookmarks and workbook summaries.
//!
//! These are plain serializable DTOs built from the trees; the command line
//! prints them as text or JSON.

use serde::Serialize;

use shakmaty::Chess;

use crate::domain::chess::{Piece, PieceKind, board_rows};
use crate::domain::{ContentType, NodeId, PieceColor, TreeNode, VariationTree};
use crate::pgn::writer::single_move_text;

use super::bookmarks::Bookmark;
use super::workbook::{ArticleLocation, Chapter, Workbook};

/// One move of a line
#[derive(Clone, Debug, Serialize)]
pub struct MoveView {
    pub node_id: NodeId,
    pub move_number: u32,
    pub is_black: bool,
    /// SAN with check suffix and NAG glyphs
    pub text: String,
    pub line_id: String,
    /// Whether the parent has other continuations
    pub has_sibling_variations: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_bookmark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<String>,
}

impl MoveView {
    fn from_node(tree: &VariationTree, node: &TreeNode) -> Self {
        use shakmaty::Position;

        let has_sibling_variations = node
            .parent_id()
            .and_then(|p| tree.get(p))
            .is_some_and(|parent| parent.children().len() > 1);
        Self {
            node_id: node.id,
            move_number: node.move_number(),
            is_black: node.moved_color() == PieceColor::Black,
            text: node.ply_text(true),
            line_id: node.line_id().to_string(),
            has_sibling_variations,
            is_check: node.position.is_check(),
            is_checkmate: node.position.is_checkmate(),
            is_bookmark: node.is_bookmark(),
            evaluation: node.annotations.engine_evaluation.clone(),
        }
    }
}

/// A variation: its first move followed by the first-child continuation
#[derive(Clone, Debug, Serialize)]
pub struct VariationView {
    pub moves: Vec<MoveView>,
}

/// The main line of `tree`, without the root
pub fn main_line_view(tree: &VariationTree) -> Vec<MoveView> {
    tree.main_line()
        .into_iter()
        .filter_map(|id| tree.get(id))
        .filter(|node| !node.is_root())
        .map(|node| MoveView::from_node(tree, node))
        .collect()
}

/// The alternatives to `node_id`: every other child of its parent, each as
/// a line
pub fn sibling_variations(tree: &VariationTree, node_id: NodeId) -> Vec<VariationView> {
    let Some(parent) = tree
        .get(node_id)
        .and_then(|n| n.parent_id())
        .and_then(|p| tree.get(p))
    else {
        return Vec::new();
    };
    parent
        .children()
        .iter()
        .filter(|&&id| id != node_id)
        .map(|&id| VariationView {
            moves: collect_variation_line(tree, id),
        })
        .collect()
}

fn collect_variation_line(tree: &VariationTree, start_id: NodeId) -> Vec<MoveView> {
    let mut moves = Vec::new();
    let mut current = tree.get(start_id);
    while let Some(node) = current {
        moves.push(MoveView::from_node(tree, node));
        current = node.main_line_child().and_then(|c| tree.get(c));
    }
    moves
}

/// Board diagram, rank 8 first: upper case for White, `.` for empty squares
pub fn board_text(position: &Chess) -> String {
    board_rows(position)
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let squares: Vec<String> = cells
                .iter()
                .map(|cell| cell.map_or('.', piece_char).to_string())
                .collect();
            format!("{} {}\n", 8 - row, squares.join(" "))
        })
        .chain(std::iter::once("  a b c d e f g h\n".to_string()))
        .collect()
}

fn piece_char(piece: Piece) -> char {
    let c = match piece.kind {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };
    if piece.color.is_white() { c.to_ascii_uppercase() } else { c }
}

/// Article label such as `Study`, `Model Game 2` or `Exercise 1`
pub fn location_label(location: ArticleLocation) -> String {
    match (location.content_type, location.article_index) {
        (ContentType::Study, _) => "Study".to_string(),
        (ContentType::Intro, _) => "Intro".to_string(),
        (ContentType::ModelGame, Some(i)) => format!("Model Game {}", i + 1),
        (ContentType::Exercise, Some(i)) => format!("Exercise {}", i + 1),
        (ContentType::ModelGame, None) => "Model Game".to_string(),
        (ContentType::Exercise, None) => "Exercise".to_string(),
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BookmarkView {
    /// Position in the full sorted list
    pub index: usize,
    pub article: String,
    pub node_id: NodeId,
    /// e.g. `2... Nc6`
    pub move_text: String,
    pub line_id: String,
}

impl BookmarkView {
    pub fn new(chapter: &Chapter, index: usize, bookmark: &Bookmark) -> Self {
        let node = chapter
            .article(bookmark.location)
            .and_then(|a| a.tree.get(bookmark.node_id));
        Self {
            index,
            article: location_label(bookmark.location),
            node_id: bookmark.node_id,
            move_text: node.map(single_move_text).unwrap_or_default(),
            line_id: node.map(|n| n.line_id().to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChapterSummary {
    /// 1-based, as shown to users
    pub number: usize,
    pub title: String,
    pub study_plies: usize,
    pub has_intro: bool,
    pub model_games: usize,
    pub exercises: usize,
    pub bookmarks: usize,
}

impl ChapterSummary {
    pub fn new(number: usize, chapter: &Chapter) -> Self {
        let (model_games, exercises) = chapter.article_counts();
        let bookmarks = std::iter::once(&chapter.study)
            .chain(&chapter.model_games)
            .chain(&chapter.exercises)
            .map(|a| a.tree.bookmarked_nodes().len())
            .sum();
        Self {
            number,
            title: chapter.title.clone(),
            study_plies: chapter.study.tree.len() - 1,
            has_intro: chapter.has_intro(),
            model_games,
            exercises,
            bookmarks,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WorkbookSummary {
    pub title: String,
    pub author: String,
    pub version: String,
    pub training_side: PieceColor,
    pub chapters: Vec<ChapterSummary>,
}

impl WorkbookSummary {
    pub fn new(workbook: &Workbook) -> Self {
        Self {
            title: workbook.title.clone(),
            author: workbook.author.clone(),
            version: workbook.version.clone(),
            training_side: workbook.training_side,
            chapters: workbook
                .chapters
                .iter()
                .enumerate()
                .map(|(i, c)| ChapterSummary::new(i + 1, c))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ROOT_NODE_ID;

    fn sample() -> (VariationTree, NodeId, NodeId) {
        let mut tree = VariationTree::new(ContentType::Study);
        let e4 = tree.add_move(ROOT_NODE_ID, "e4").unwrap();
        let e5 = tree.add_move(e4, "e5").unwrap();
        let nf3 = tree.add_move(e5, "Nf3").unwrap();
        tree.add_move(nf3, "Nc6").unwrap();
        let bc4 = tree.add_move(e5, "Bc4").unwrap();
        tree.add_move(bc4, "Nc6").unwrap();
        (tree, nf3, bc4)
    }

    #[test]
    fn test_main_line_view() {
        let (tree, nf3, _) = sample();
        let view = main_line_view(&tree);
        assert_eq!(view.len(), 4);
        assert_eq!(view[0].text, "e4");
        assert!(!view[0].is_black);
        assert!(view[1].is_black);
        let nf3_view = view.iter().find(|m| m.node_id == nf3).unwrap();
        assert!(nf3_view.has_sibling_variations);
        assert_eq!(nf3_view.line_id, "1.1");
    }

    #[test]
    fn test_sibling_variations() {
        let (tree, nf3, bc4) = sample();
        let variations = sibling_variations(&tree, nf3);
        assert_eq!(variations.len(), 1);
        let moves: Vec<&str> = variations[0].moves.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(moves, vec!["Bc4", "Nc6"]);
        assert_eq!(variations[0].moves[0].node_id, bc4);
        assert!(sibling_variations(&tree, ROOT_NODE_ID).is_empty());
    }

    #[test]
    fn test_board_text() {
        let text = board_text(&Chess::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[4], "4 . . . . . . . .");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }

    #[test]
    fn test_labels_and_summary() {
        assert_eq!(location_label(ArticleLocation::model_game(1)), "Model Game 2");
        assert_eq!(location_label(ArticleLocation::study()), "Study");

        let mut wb = Workbook::new("Book");
        let mut chapter = Chapter::new("First");
        let (tree, nf3, _) = sample();
        chapter.study.tree = tree;
        chapter.study.tree.set_bookmark(nf3, true);
        wb.add_chapter(chapter);
        let summary = WorkbookSummary::new(&wb);
        assert_eq!(summary.chapters[0].study_plies, 6);
        assert_eq!(summary.chapters[0].bookmarks, 1);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"title\":\"Book\""));
    }
}
