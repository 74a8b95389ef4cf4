//! Error types for tree manipulation and text parsing.
//!
//! Lookup misses are not errors: those return `Option::None`.

use thiserror::Error;

use crate::domain::NodeId;

/// Structural and move-legality errors raised by the variation tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The operation would leave the tree in an inconsistent state
    #[error("invalid tree state: {message}")]
    InvalidTreeState { message: String },

    /// A node id is already used by another node in the tree
    #[error("duplicate node id {0}")]
    DuplicateNodeId(NodeId),

    /// The node is not part of this tree
    #[error("node {0} not found in tree")]
    UnknownNode(NodeId),

    /// Move text could not be applied to the position
    #[error("illegal move '{token}': {reason}")]
    IllegalMove { token: String, reason: String },

    /// FEN text could not be turned into a legal position
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
}

impl TreeError {
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        TreeError::InvalidTreeState {
            message: message.into(),
        }
    }
}

/// Errors raised while parsing a single game's text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A move token is not legal in the position it was played from
    #[error("invalid move '{token}' after {previous}")]
    InvalidMove { token: String, previous: String },

    /// A token that looked like a move number could not be read as one
    #[error("expected a move number, found '{0}'")]
    ExpectedMoveNumber(String),

    /// A move number refers to a ply that does not exist in the line
    #[error("missing move after {0}")]
    MissingMove(String),

    /// A `{` without the closing `}`
    #[error("unterminated comment")]
    UnterminatedComment,

    /// The text does not start with a workbook preface
    #[error("not a workbook: the first game has no ChessForgeWorkbook header")]
    NotAWorkbook,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors raised by a game played against the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineGameError {
    /// A move was offered while it is the other side's turn
    #[error("it is not the {0}'s turn")]
    WrongTurn(&'static str),

    /// The game has ended or was never started
    #[error("no game in progress")]
    NotInProgress,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;
