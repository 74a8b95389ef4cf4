//! Move text builder for a variation tree.
//!
//! Every function here is pure and returns an owned string. Two profiles are
//! supported: the native save, which keeps every annotation and private
//! command, and the export profile, which writes only what other PGN
//! readers understand.

use crate::domain::annotations::{format_nags, parse_nag_token};
use crate::domain::chess::check_suffix;
use crate::domain::{NodeId, PieceColor, ROOT_NODE_ID, TreeNode, VariationTree};

use super::commands::{ChfCommand, native_commands, non_empty};

/// Default maximum line length of move text
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// What gets written for each node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    /// Workbook save: every annotation and command
    Native,
    /// Plain PGN: evaluations, arrows, circles and comments only
    Export {
        keep_comments: bool,
        keep_evaluations: bool,
    },
}

/// Builds the move text of `tree`, starting with any annotation attached to
/// the root. The result is not wrapped.
pub fn build_tree_text(tree: &VariationTree, profile: Profile) -> String {
    let mut builder = TextBuilder {
        tree,
        profile,
        out: String::new(),
    };
    builder.out.push_str(&annotation_block(tree.root(), profile));
    builder.write_line(ROOT_NODE_ID, true);
    builder.out
}

/// Move text of `tree` wrapped to `line_width` columns
pub fn build_game_text(tree: &VariationTree, profile: Profile, line_width: usize) -> String {
    divide_line(&build_tree_text(tree, profile), line_width)
}

struct TextBuilder<'a> {
    tree: &'a VariationTree,
    profile: Profile,
    out: String,
}

impl TextBuilder<'_> {
    /// Writes the continuation of `id`: the first child inline, the other
    /// children as parenthesized variations, then the rest of the main line.
    fn write_line(&mut self, mut id: NodeId, mut include_number: bool) {
        let tree = self.tree;
        loop {
            let Some(node) = tree.get(id) else {
                return;
            };
            match node.children() {
                [] => return,
                [only] => {
                    self.write_node(*only, include_number);
                    id = *only;
                    include_number = false;
                }
                [first, rest @ ..] => {
                    self.write_node(*first, include_number);
                    for &variation in rest {
                        self.out.push_str(" (");
                        self.write_node(variation, true);
                        self.write_line(variation, false);
                        self.out.push_str(") ");
                    }
                    id = *first;
                    include_number = true;
                }
            }
        }
    }

    fn write_node(&mut self, id: NodeId, include_number: bool) {
        let Some(node) = self.tree.get(id) else {
            return;
        };

        if let Profile::Export {
            keep_comments: true,
            ..
        } = self.profile
        {
            if let Some(text) = non_empty(&node.annotations.comment_before_move) {
                self.out.push_str(" {");
                self.out.push_str(&clean_comment(text));
                self.out.push('}');
            }
        }

        self.out.push_str(&move_number_prefix(node, include_number));
        self.out.push(' ');
        self.out.push_str(node.san.as_deref().unwrap_or_default());
        self.out.push_str(check_suffix(&node.position));
        self.out.push_str(&format_nags(&node.annotations.nags));
        self.out.push_str(&annotation_block(node, self.profile));
    }
}

/// `N.` before a White move (preceded by a space unless it opens the text
/// or a variation), `N...` before a Black move that needs its number.
fn move_number_prefix(node: &TreeNode, include_number: bool) -> String {
    let number = node.move_number();
    match node.moved_color() {
        PieceColor::White if !include_number && number != 1 => format!(" {}.", number),
        PieceColor::White => format!("{}.", number),
        PieceColor::Black if include_number => format!("{}...", number),
        PieceColor::Black => String::new(),
    }
}

/// The ` {...} ` block written after a move, empty if there is nothing to
/// write under `profile`.
pub fn annotation_block(node: &TreeNode, profile: Profile) -> String {
    let ann = &node.annotations;
    let (commands, comment) = match profile {
        Profile::Native => (native_commands(node), non_empty(&ann.comment)),
        Profile::Export {
            keep_comments,
            keep_evaluations,
        } => {
            let mut cmds = Vec::new();
            if keep_evaluations {
                if let Some(eval) = non_empty(&ann.engine_evaluation) {
                    cmds.push(ChfCommand::EngineEvaluation(eval.to_string()));
                }
            }
            if keep_comments {
                if let Some(arrows) = non_empty(&ann.arrows) {
                    cmds.push(ChfCommand::Arrows(arrows.to_string()));
                }
                if let Some(circles) = non_empty(&ann.circles) {
                    cmds.push(ChfCommand::Circles(circles.to_string()));
                }
            }
            let comment = if keep_comments {
                non_empty(&ann.comment)
            } else {
                None
            };
            (cmds, comment)
        }
    };

    if commands.is_empty() && comment.is_none() {
        return String::new();
    }

    let mut block = String::from(" {");
    for cmd in &commands {
        block.push_str(&cmd.to_bracketed());
    }
    if let Some(comment) = comment {
        let comment = clean_comment(comment);
        // `{$n}` alone would read back as a NAG
        if commands.is_empty() && parse_nag_token(&comment).is_some() {
            block.push(' ');
        }
        block.push_str(&comment);
    }
    block.push_str("} ");
    block
}

/// Comment text safe to place between braces: brackets and braces become
/// parentheses and line breaks become spaces.
pub fn clean_comment(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '[' | '{' => '(',
            ']' | '}' => ')',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}

/// Short move text for messages: `7... Be7` or `8. Bg5`
pub fn single_move_text(node: &TreeNode) -> String {
    match node.san.as_deref() {
        None => "the starting position".to_string(),
        Some(san) => {
            let dots = if node.moved_color().is_white() { "." } else { "..." };
            format!("{}{} {}{}", node.move_number(), dots, san, check_suffix(&node.position))
        }
    }
}

/// Wraps `text` at spaces so that lines are at most `max_chars` long where
/// possible. Spaces inside `{...}` comments are never used as breaks, so a
/// long comment can make a line longer.
pub fn divide_line(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / max_chars.max(1) + 1);
    let mut line_len = 0usize;
    // byte offset in `out` of the last usable space and the line length before it
    let mut last_break: Option<(usize, usize)> = None;
    let mut in_comment = false;

    for c in text.chars() {
        match c {
            '{' => in_comment = true,
            '}' => in_comment = false,
            ' ' if !in_comment && line_len > 0 => last_break = Some((out.len(), line_len)),
            _ => {}
        }
        out.push(c);
        line_len += 1;

        if line_len > max_chars {
            if let Some((pos, before)) = last_break.take() {
                out.replace_range(pos..pos + 1, "\n");
                line_len -= before + 1;
            }
        }
    }
    out
}
