pub mod commands;
pub mod headers;
pub mod multi_game;
pub mod parser;
pub mod workbook_file;
pub mod writer;

pub use multi_game::{GameText, split_games};
pub use parser::parse_game;
pub use workbook_file::{
    GameError, ImportReport, build_export_text, build_workbook_text, import_pgn, parse_workbook_text,
};
pub use writer::{DEFAULT_LINE_WIDTH, Profile, build_game_text, build_tree_text};
