//! Splits a file holding many games into per-game header and move text.

use crate::domain::{ContentType, GameHeader, VariationTree};
use crate::error::ParseResult;

use super::headers::parse_header_line;
use super::parser::{add_header, parse_body};

/// One game's text as found in a multi-game file
#[derive(Clone, Debug, Default)]
pub struct GameText {
    pub header: GameHeader,
    pub body: String,
    /// 1-based line number of the game's first line
    pub first_line: usize,
}

impl GameText {
    /// Content type from the header. Games without one that set up a
    /// position are treated as exercises.
    pub fn content_type(&self) -> Option<ContentType> {
        self.header.content_type().or_else(|| {
            self.header
                .fen()
                .filter(|fen| !fen.trim().is_empty())
                .map(|_| ContentType::Exercise)
        })
    }

    /// True if the game holds neither headers nor move text
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.trim().is_empty()
    }

    /// Parses the game, falling back to `default_type` when no content type
    /// can be derived.
    pub fn parse(&self, default_type: ContentType) -> ParseResult<VariationTree> {
        let content_type = self.content_type().unwrap_or(default_type);
        parse_body(self.header.clone(), &self.body, content_type)
    }
}

/// Splits `text` into games. A header line starts a new game when the
/// current one already has move text.
pub fn split_games(text: &str) -> Vec<GameText> {
    let mut games = Vec::new();
    let mut current = GameText {
        first_line: 1,
        ..GameText::default()
    };
    let mut started = false;

    for (idx, line) in text.lines().enumerate() {
        match parse_header_line(line) {
            Some((key, value)) => {
                if !current.body.trim().is_empty() {
                    push_game(&mut games, std::mem::take(&mut current));
                    started = false;
                }
                if !started {
                    current.first_line = idx + 1;
                    started = true;
                }
                add_header(&mut current.header, &key, value);
            }
            None => {
                if !started && !line.trim().is_empty() {
                    current.first_line = idx + 1;
                    started = true;
                }
                current.body.push_str(line);
                current.body.push('\n');
            }
        }
    }
    push_game(&mut games, current);
    games
}

fn push_game(games: &mut Vec<GameText>, game: GameText) {
    if !game.is_empty() {
        games.push(game);
    }
}
