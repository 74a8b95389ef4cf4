pub mod annotations;
pub mod chess;
pub mod header;
pub mod lines;
pub mod move_tree;
pub mod score_sheet;
pub mod uci;

pub use annotations::Annotations;
pub use chess::{AppliedMove, PieceColor};
pub use header::GameHeader;
pub use move_tree::{ContentType, NodeId, ROOT_NODE_ID, TreeNode, VariationTree};
pub use score_sheet::{MovePair, PlyEntry, ScoreSheet};
