pub mod bookmarks;
pub mod engine_game;
pub mod session;
pub mod view_models;
pub mod workbook;

pub use bookmarks::{Bookmark, BookmarkRegistry};
pub use engine_game::{EngineGame, GameState};
pub use session::Session;
pub use workbook::{Article, ArticleLocation, Chapter, Workbook};
