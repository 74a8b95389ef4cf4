//! Ordered PGN header (tag pair) storage attached to every tree.

use super::ContentType;

pub const KEY_WORKBOOK_TITLE: &str = "ChessForgeWorkbook";
pub const KEY_WORKBOOK_VERSION: &str = "WorkbookVersion";
pub const KEY_TRAINING_SIDE: &str = "TrainingSide";
pub const KEY_STUDY_BOARD_ORIENTATION: &str = "StudyBoardOrientation";
pub const KEY_GAME_BOARD_ORIENTATION: &str = "GameBoardOrientation";
pub const KEY_EXERCISE_BOARD_ORIENTATION: &str = "ExerciseBoardOrientation";
pub const KEY_EVENT: &str = "Event";
pub const KEY_SITE: &str = "Site";
pub const KEY_ROUND: &str = "Round";
pub const KEY_ECO: &str = "ECO";
pub const KEY_LICHESS_ID: &str = "LichessId";
pub const KEY_CHESSCOM_ID: &str = "ChessComId";
pub const KEY_FEN: &str = "FEN";
pub const KEY_GUID: &str = "Guid";
pub const KEY_CHAPTER_TITLE: &str = "ChapterTitle";
pub const KEY_CONTENT_TYPE: &str = "ContentType";
pub const KEY_RESULT: &str = "Result";
pub const KEY_DATE: &str = "Date";
pub const KEY_WHITE: &str = "White";
pub const KEY_BLACK: &str = "Black";
pub const KEY_WHITE_ELO: &str = "WhiteElo";
pub const KEY_BLACK_ELO: &str = "BlackElo";
pub const KEY_ANNOTATOR: &str = "Annotator";
pub const KEY_PREAMBLE: &str = "Preamble";

pub const VALUE_WHITE: &str = "White";
pub const VALUE_BLACK: &str = "Black";
pub const VALUE_NO_COLOR: &str = "None";

/// Result token used when the game has no result
pub const NO_RESULT: &str = "*";

/// Header tag pairs in file order. Keys may repeat (`Preamble`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameHeader {
    entries: Vec<(String, String)>,
}

impl GameHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value under `key`, or an empty string
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Replaces the first value under `key`, or appends a new pair.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Appends a pair even if the key already exists.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.to_string(), value.into()));
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Free text lines stored as repeated `Preamble` tags
    pub fn preamble(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == KEY_PREAMBLE)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn set_preamble<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.remove(KEY_PREAMBLE);
        for line in lines {
            self.push(KEY_PREAMBLE, line.as_ref());
        }
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.get(KEY_CONTENT_TYPE)
            .and_then(ContentType::from_header_value)
    }

    /// Game result, `*` when absent
    pub fn result(&self) -> &str {
        match self.get(KEY_RESULT) {
            Some(r) if !r.trim().is_empty() => r,
            _ => NO_RESULT,
        }
    }

    pub fn fen(&self) -> Option<&str> {
        self.get(KEY_FEN).filter(|f| !f.trim().is_empty())
    }

    pub fn guid(&self) -> Option<&str> {
        self.get(KEY_GUID).filter(|g| !g.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_first() {
        let mut h = GameHeader::new();
        h.set(KEY_WHITE, "Carlsen");
        h.set(KEY_WHITE, "Caruana");
        assert_eq!(h.get(KEY_WHITE), Some("Caruana"));
        assert_eq!(h.entries().len(), 1);
    }

    #[test]
    fn test_preamble_lines() {
        let mut h = GameHeader::new();
        h.set(KEY_EVENT, "Open");
        h.set_preamble(&["first", "second"]);
        assert_eq!(h.preamble(), vec!["first", "second"]);
        h.set_preamble::<&str>(&[]);
        assert!(h.preamble().is_empty());
        assert_eq!(h.get(KEY_EVENT), Some("Open"));
    }

    #[test]
    fn test_result_defaults_to_star() {
        let mut h = GameHeader::new();
        assert_eq!(h.result(), "*");
        h.set(KEY_RESULT, "1-0");
        assert_eq!(h.result(), "1-0");
    }

    #[test]
    fn test_content_type() {
        let mut h = GameHeader::new();
        assert_eq!(h.content_type(), None);
        h.set(KEY_CONTENT_TYPE, "Exercise");
        assert_eq!(h.content_type(), Some(ContentType::Exercise));
    }
}
