//! Chess workbooks: variation trees of studies, model games and exercises,
//! their text format, bookmarks and games against an engine.

pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod pgn;

pub use config::Config;
pub use error::{EngineGameError, ParseError, TreeError};
