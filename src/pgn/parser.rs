//! Reads one game's text (headers and move text) into a variation tree.

use tracing::debug;

use crate::domain::annotations::{nag_from_glyph, parse_nag_token, split_move_glyph};
use crate::domain::chess::apply_san;
use crate::domain::{ContentType, GameHeader, NodeId, PieceColor, ROOT_NODE_ID, VariationTree};
use crate::error::{ParseError, ParseResult, TreeError};

use super::commands::extract_commands;
use super::headers::parse_header_line;
use super::writer::single_move_text;

/// Parses a complete game: header lines followed by move text.
/// `default_type` is used when the header has no `ContentType`.
pub fn parse_game(text: &str, default_type: ContentType) -> ParseResult<VariationTree> {
    let (header, body) = split_header_block(text);
    parse_body(header, body, default_type)
}

/// Splits leading header lines (blank lines between them are skipped) from
/// the rest of the text.
pub fn split_header_block(text: &str) -> (GameHeader, &str) {
    let mut header = GameHeader::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (line, next) = rest.split_once('\n').unwrap_or((rest, ""));
        if line.trim().is_empty() {
            rest = next;
            continue;
        }
        let Some((key, value)) = parse_header_line(line) else {
            break;
        };
        add_header(&mut header, &key, value);
        rest = next;
    }
    (header, rest)
}

/// `Preamble` may repeat, every other key keeps its last value.
pub(crate) fn add_header(header: &mut GameHeader, key: &str, value: String) {
    if key == crate::domain::header::KEY_PREAMBLE {
        header.push(key, value);
    } else {
        header.set(key, value);
    }
}

/// Builds the tree for move text `body` under an already parsed header.
pub fn parse_body(header: GameHeader, body: &str, default_type: ContentType) -> ParseResult<VariationTree> {
    let content_type = header.content_type().unwrap_or(default_type);
    let mut tree = match header.fen() {
        Some(fen) if !fen.trim().is_empty() => VariationTree::from_fen(content_type, fen.trim())?,
        _ => VariationTree::new(content_type),
    };
    tree.header = header;

    let mut parser = MoveTextParser {
        tokens: Tokenizer::new(body),
        tree: &mut tree,
        pre_branch: true,
        finished: false,
    };
    parser.parse_branch(ROOT_NODE_ID)?;

    tree.build_lines();
    tree.go_to_root();
    Ok(tree)
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    /// Content between `{` and `}`, or after `;` to the end of the line
    Comment(&'a str),
    OpenBranch,
    CloseBranch,
    Word(&'a str),
}

struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn next_token(&mut self) -> ParseResult<Option<Token<'a>>> {
        let text: &'a str = self.text;
        let rest = &text[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();

        let Some(c) = trimmed.chars().next() else {
            return Ok(None);
        };
        match c {
            '{' => {
                let end = trimmed.find('}').ok_or(ParseError::UnterminatedComment)?;
                self.pos += end + 1;
                Ok(Some(Token::Comment(&trimmed[1..end])))
            }
            ';' => {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += end;
                Ok(Some(Token::Comment(&trimmed[1..end])))
            }
            '(' => {
                self.pos += 1;
                Ok(Some(Token::OpenBranch))
            }
            ')' => {
                self.pos += 1;
                Ok(Some(Token::CloseBranch))
            }
            _ => {
                let mut end = trimmed
                    .find(|ch: char| ch.is_whitespace() || matches!(ch, '(' | ')' | '{' | '.'))
                    .unwrap_or(trimmed.len());
                end += trimmed[end..].len() - trimmed[end..].trim_start_matches('.').len();
                self.pos += end;
                Ok(Some(Token::Word(&trimmed[..end])))
            }
        }
    }
}

fn is_termination(word: &str) -> bool {
    ["*", "1-0", "0-1", "1/2"].iter().any(|t| word.starts_with(t))
}

struct MoveTextParser<'a, 't> {
    tokens: Tokenizer<'a>,
    tree: &'t mut VariationTree,
    /// True until the first `(`; a comment at the start of a variation
    /// belongs to its first move
    pre_branch: bool,
    /// Set once a termination token is read
    finished: bool,
}

impl MoveTextParser<'_, '_> {
    /// Reads moves until the matching `)` or the end of the game. Moves are
    /// added after `start`.
    fn parse_branch(&mut self, start: NodeId) -> ParseResult<()> {
        let mut parent = start;
        // position a `(` branches from: the parent of the last move
        let mut previous = start;
        let mut has_move = false;
        let mut pending_cbm: Option<String> = None;

        while let Some(token) = self.tokens.next_token()? {
            match token {
                Token::Comment(content) if !has_move && !self.pre_branch => {
                    pending_cbm = Some(content.trim().to_string()).filter(|c| !c.is_empty());
                }
                Token::Comment(content) => self.apply_comment(parent, content),
                Token::OpenBranch => {
                    self.pre_branch = false;
                    self.parse_branch(previous)?;
                }
                Token::CloseBranch => return Ok(()),
                Token::Word(word) if is_termination(word) => {
                    self.finished = true;
                }
                Token::Word(word) => match word.chars().next() {
                    Some('1'..='9') => {
                        parent = self.reposition(parent, word)?;
                    }
                    Some(c) if c.is_ascii_alphabetic() || c == '0' || c == '-' => {
                        let node = self.add_move(parent, word)?;
                        if let Some(text) = pending_cbm.take() {
                            if let Some(n) = self.tree.get_mut(node) {
                                n.annotations.comment_before_move = Some(text);
                            }
                        }
                        previous = parent;
                        parent = node;
                        has_move = true;
                    }
                    Some('$') => self.add_nag(parent, parse_nag_token(word)),
                    Some('!' | '?') => self.add_nag(parent, nag_from_glyph(word)),
                    _ => debug!(token = word, "skipping unexpected token"),
                },
            }
            if self.finished {
                return Ok(());
            }
        }
        Ok(())
    }

    fn add_move(&mut self, parent: NodeId, token: &str) -> ParseResult<NodeId> {
        let (san, glyph) = split_move_glyph(token);
        let parent_node = self
            .tree
            .get(parent)
            .ok_or(TreeError::UnknownNode(parent))?;
        let applied = apply_san(&parent_node.position, san).map_err(|_| ParseError::InvalidMove {
            token: token.to_string(),
            previous: single_move_text(parent_node),
        })?;
        let id = self.tree.add_applied_move(parent, applied)?;
        self.add_nag(id, glyph);
        Ok(id)
    }

    fn add_nag(&mut self, node: NodeId, nag: Option<u16>) {
        let (Some(nag), Some(node)) = (nag, self.tree.get_mut(node)) else {
            return;
        };
        if !node.annotations.nags.contains(&nag) {
            node.annotations.nags.push(nag);
        }
    }

    /// Applies commands found in a comment to `node` and keeps the free
    /// text as its comment. `{$n}` is read as a NAG; with any whitespace
    /// inside the braces it stays a comment.
    fn apply_comment(&mut self, node: NodeId, content: &str) {
        if let Some(nag) = parse_nag_token(content) {
            self.add_nag(node, Some(nag));
            return;
        }
        let (commands, text) = extract_commands(content);
        let Some(target) = self.tree.get_mut(node) else {
            return;
        };
        for cmd in commands {
            cmd.apply(target);
        }
        let text = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        target.annotations.comment = Some(match target.annotations.comment.take() {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, text),
            _ => text.to_string(),
        });
    }

    /// Moves the insertion point so the next move is the one the move number
    /// `token` (e.g. `12.` or `12...`) announces.
    fn reposition(&self, parent: NodeId, token: &str) -> ParseResult<NodeId> {
        let digits = token.split('.').next().unwrap_or_default();
        let number: u32 = digits
            .parse()
            .map_err(|_| ParseError::ExpectedMoveNumber(token.to_string()))?;
        let dots = match token.find('.') {
            Some(pos) => token.len() - pos,
            None => 1,
        };

        let tree = &*self.tree;
        let node = tree
            .get(parent)
            .ok_or(TreeError::UnknownNode(parent))?;
        let to_move = node.color_to_move();
        if (to_move == PieceColor::White && dots == 1) || (to_move == PieceColor::Black && dots >= 3) {
            return Ok(parent);
        }

        let missing = || ParseError::MissingMove(single_move_text(node));
        let distance = (i64::from(number) - i64::from(node.move_number())) * 2;
        match distance {
            2 => node.main_line_child().ok_or_else(missing),
            d if d < 2 => {
                let mut id = parent;
                for _ in 0..(1 - d) {
                    id = tree.get(id).and_then(|n| n.parent_id()).ok_or_else(missing)?;
                }
                Ok(id)
            }
            // a number too far ahead is taken as a typo
            _ => {
                debug!(token, "move number ahead of the line, ignored");
                Ok(parent)
            }
        }
    }
}
