//! Bracketed commands carried inside comments, e.g. `[%chf-eev 0.35]`.

use crate::domain::TreeNode;

use super::writer::clean_comment;

pub const CMD_BOOKMARK: &str = "%chf-bkm";
pub const CMD_ENGINE_EVALUATION: &str = "%chf-eev";
pub const CMD_ARROWS: &str = "%cal";
pub const CMD_CIRCLES: &str = "%csl";
pub const CMD_ARTICLE_REFS: &str = "%chf-ref";
pub const CMD_QUIZ_POINTS: &str = "%chf-qpt";
pub const CMD_THUMBNAIL: &str = "%chf-thm";
pub const CMD_COMMENT_BEFORE_MOVE: &str = "%chf-cbm";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChfCommand {
    Bookmark,
    EngineEvaluation(String),
    Arrows(String),
    Circles(String),
    References(String),
    QuizPoints(i32),
    Thumbnail,
    CommentBeforeMove(String),
    /// Any other command, kept verbatim without the brackets
    Unknown(String),
}

impl ChfCommand {
    /// Parses the text between `[` and `]`, starting with `%`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (name, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let args = args.trim();
        let first_arg = args.split_whitespace().next();

        match (name, first_arg) {
            (CMD_BOOKMARK, _) => ChfCommand::Bookmark,
            (CMD_THUMBNAIL, _) => ChfCommand::Thumbnail,
            (CMD_ENGINE_EVALUATION, Some(v)) => ChfCommand::EngineEvaluation(v.to_string()),
            (CMD_ARROWS, Some(v)) => ChfCommand::Arrows(v.to_string()),
            (CMD_CIRCLES, Some(v)) => ChfCommand::Circles(v.to_string()),
            (CMD_ARTICLE_REFS, Some(v)) => ChfCommand::References(v.to_string()),
            (CMD_QUIZ_POINTS, Some(v)) => match v.parse() {
                Ok(points) => ChfCommand::QuizPoints(points),
                Err(_) => ChfCommand::Unknown(text.to_string()),
            },
            (CMD_COMMENT_BEFORE_MOVE, Some(_)) => ChfCommand::CommentBeforeMove(args.to_string()),
            _ => ChfCommand::Unknown(text.to_string()),
        }
    }

    /// Command text without the brackets
    pub fn to_text(&self) -> String {
        match self {
            ChfCommand::Bookmark => CMD_BOOKMARK.to_string(),
            ChfCommand::Thumbnail => CMD_THUMBNAIL.to_string(),
            ChfCommand::EngineEvaluation(v) => format!("{} {}", CMD_ENGINE_EVALUATION, v),
            ChfCommand::Arrows(v) => format!("{} {}", CMD_ARROWS, v),
            ChfCommand::Circles(v) => format!("{} {}", CMD_CIRCLES, v),
            ChfCommand::References(v) => format!("{} {}", CMD_ARTICLE_REFS, v),
            ChfCommand::QuizPoints(n) => format!("{} {}", CMD_QUIZ_POINTS, n),
            // brackets or braces would end the command or the comment early
            ChfCommand::CommentBeforeMove(text) => {
                format!("{} {}", CMD_COMMENT_BEFORE_MOVE, clean_comment(text))
            }
            ChfCommand::Unknown(text) => text.clone(),
        }
    }

    /// `[` + text + `]`
    pub fn to_bracketed(&self) -> String {
        format!("[{}]", self.to_text())
    }

    /// Stores the command on the node it was read for.
    pub fn apply(self, node: &mut TreeNode) {
        let ann = &mut node.annotations;
        match self {
            ChfCommand::Bookmark => node.is_bookmark = true,
            ChfCommand::Thumbnail => ann.is_thumbnail = true,
            ChfCommand::EngineEvaluation(v) => ann.engine_evaluation = Some(v),
            ChfCommand::Arrows(v) => ann.arrows = Some(v),
            ChfCommand::Circles(v) => ann.circles = Some(v),
            ChfCommand::References(v) => ann.references = Some(v),
            ChfCommand::QuizPoints(n) => ann.quiz_points = n,
            ChfCommand::CommentBeforeMove(text) => ann.comment_before_move = Some(text),
            ChfCommand::Unknown(text) => ann.unprocessed_commands.push(text),
        }
    }
}

/// Commands written for a node in a native save, in file order
pub fn native_commands(node: &TreeNode) -> Vec<ChfCommand> {
    let ann = &node.annotations;
    let mut cmds = Vec::new();
    if node.is_bookmark() {
        cmds.push(ChfCommand::Bookmark);
    }
    if ann.is_thumbnail {
        cmds.push(ChfCommand::Thumbnail);
    }
    if let Some(refs) = non_empty(&ann.references) {
        cmds.push(ChfCommand::References(refs.to_string()));
    }
    if let Some(eval) = non_empty(&ann.engine_evaluation) {
        cmds.push(ChfCommand::EngineEvaluation(eval.to_string()));
    }
    if ann.quiz_points != 0 {
        cmds.push(ChfCommand::QuizPoints(ann.quiz_points));
    }
    if let Some(text) = non_empty(&ann.comment_before_move) {
        cmds.push(ChfCommand::CommentBeforeMove(text.to_string()));
    }
    if let Some(arrows) = non_empty(&ann.arrows) {
        cmds.push(ChfCommand::Arrows(arrows.to_string()));
    }
    if let Some(circles) = non_empty(&ann.circles) {
        cmds.push(ChfCommand::Circles(circles.to_string()));
    }
    cmds.extend(
        ann.unprocessed_commands
            .iter()
            .map(|c| ChfCommand::Unknown(c.clone())),
    );
    cmds
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Splits comment content into its bracketed commands and the free text
/// around them.
pub fn extract_commands(content: &str) -> (Vec<ChfCommand>, String) {
    let mut commands = Vec::new();
    let mut text = String::new();
    let mut rest = content;
    while let Some(start) = rest.find("[%") {
        let Some(len) = rest[start..].find(']') else {
            break;
        };
        text.push_str(&rest[..start]);
        let raw: String = rest[start + 1..start + len]
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        commands.push(ChfCommand::parse(&raw));
        rest = &rest[start + len + 1..];
    }
    text.push_str(rest);
    (commands, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(ChfCommand::parse("%chf-bkm"), ChfCommand::Bookmark);
        assert_eq!(
            ChfCommand::parse("%chf-eev -1.25"),
            ChfCommand::EngineEvaluation("-1.25".to_string())
        );
        assert_eq!(
            ChfCommand::parse("%cal Ge2e4,Rd7d5"),
            ChfCommand::Arrows("Ge2e4,Rd7d5".to_string())
        );
        assert_eq!(ChfCommand::parse("%chf-qpt 3"), ChfCommand::QuizPoints(3));
        assert_eq!(
            ChfCommand::parse("%chf-cbm Now the key idea"),
            ChfCommand::CommentBeforeMove("Now the key idea".to_string())
        );
    }

    #[test]
    fn test_unknown_commands_are_opaque() {
        assert_eq!(
            ChfCommand::parse("%clk 0:03:00"),
            ChfCommand::Unknown("%clk 0:03:00".to_string())
        );
        assert_eq!(
            ChfCommand::parse("%chf-qpt many"),
            ChfCommand::Unknown("%chf-qpt many".to_string())
        );
        assert_eq!(ChfCommand::Unknown("%clk 0:03:00".to_string()).to_bracketed(), "[%clk 0:03:00]");
    }

    #[test]
    fn test_comment_before_move_brackets() {
        let cmd = ChfCommand::CommentBeforeMove("see [1]".to_string());
        assert_eq!(cmd.to_text(), "%chf-cbm see (1)");
    }

    #[test]
    fn test_comment_before_move_braces_and_newlines() {
        let cmd = ChfCommand::CommentBeforeMove("see {x}\nhere".to_string());
        assert_eq!(cmd.to_text(), "%chf-cbm see (x) here");
    }

    #[test]
    fn test_extract_commands() {
        let (cmds, text) = extract_commands("[%chf-bkm][%chf-eev 0.35]Good move");
        assert_eq!(
            cmds,
            vec![ChfCommand::Bookmark, ChfCommand::EngineEvaluation("0.35".to_string())]
        );
        assert_eq!(text, "Good move");

        let (cmds, text) = extract_commands("plain text");
        assert!(cmds.is_empty());
        assert_eq!(text, "plain text");

        let (cmds, text) = extract_commands("open [%cal Ge2e4 and no close");
        assert!(cmds.is_empty());
        assert_eq!(text, "open [%cal Ge2e4 and no close");
    }
}
