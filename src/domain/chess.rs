//! Pure chess domain types and utilities.
//!
//! Rules, legality and FEN handling come from shakmaty. This module adds the
//! notation and move numbering conventions used by the workbook format.

use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{
    CastlingMode, Chess, Color as SColor, EnPassantMode, File, Move, Position, Rank, Role, Square,
};

use crate::error::{TreeError, TreeResult};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn is_white(self) -> bool {
        self == PieceColor::White
    }
}

impl From<SColor> for PieceColor {
    fn from(color: SColor) -> Self {
        match color {
            SColor::White => PieceColor::White,
            SColor::Black => PieceColor::Black,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

/// Convert row/col (0-indexed, row 0 = rank 8) to shakmaty Square
pub fn to_square(row: usize, col: usize) -> Square {
    let file = File::new(col as u32);
    let rank = Rank::new(7 - row as u32); // row 0 = rank 8, row 7 = rank 1
    Square::from_coords(file, rank)
}

/// Convert shakmaty piece to our domain Piece
pub fn shakmaty_to_piece(piece: shakmaty::Piece) -> Piece {
    let kind = match piece.role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    };
    Piece {
        kind,
        color: piece.color.into(),
    }
}

/// The 8x8 board as rows of cells, rank 8 first.
pub fn board_rows(position: &Chess) -> Vec<Vec<Option<Piece>>> {
    (0..8)
        .map(|row| {
            (0..8)
                .map(|col| {
                    position
                        .board()
                        .piece_at(to_square(row, col))
                        .map(shakmaty_to_piece)
                })
                .collect()
        })
        .collect()
}

/// Result of applying one move to a position.
#[derive(Clone, Debug)]
pub struct AppliedMove {
    /// Position after the move
    pub position: Chess,
    /// Algebraic notation without check suffix
    pub san: String,
    /// Engine (UCI) notation
    pub uci: String,
    pub is_castle: bool,
}

/// Parse a FEN string into a legal position.
pub fn position_from_fen(fen: &str) -> TreeResult<Chess> {
    let invalid = |reason: String| TreeError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen = fen.trim().parse().map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(e.to_string()))
}

/// Encode a position as FEN.
pub fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Apply a move given in SAN. Check, mate and annotation glyph suffixes are
/// tolerated, as is `0-0` written with zeros.
pub fn apply_san(position: &Chess, text: &str) -> TreeResult<AppliedMove> {
    let cleaned = normalize_san(text);
    let san: San = cleaned
        .parse()
        .map_err(|_| illegal(text, "not a SAN move".to_string()))?;
    let m = san
        .to_move(position)
        .map_err(|e| illegal(text, e.to_string()))?;
    play(position, m)
}

/// Apply a move given in engine notation, e.g. `e2e4` or `e7e8q`.
pub fn apply_uci(position: &Chess, text: &str) -> TreeResult<AppliedMove> {
    let uci: UciMove = text
        .trim()
        .parse()
        .map_err(|_| illegal(text, "not a UCI move".to_string()))?;
    let m = uci
        .to_move(position)
        .map_err(|e| illegal(text, e.to_string()))?;
    play(position, m)
}

fn play(position: &Chess, m: Move) -> TreeResult<AppliedMove> {
    let san = San::from_move(position, m.clone()).to_string();
    let uci = m.to_uci(CastlingMode::Standard).to_string();
    let is_castle = m.is_castle();
    let new_position = position
        .clone()
        .play(m)
        .map_err(|_| illegal(&san, "move is not legal in this position".to_string()))?;
    Ok(AppliedMove {
        position: new_position,
        san,
        uci,
        is_castle,
    })
}

fn illegal(token: &str, reason: String) -> TreeError {
    TreeError::IllegalMove {
        token: token.to_string(),
        reason,
    }
}

/// Strip check/mate markers and annotation glyphs, fix zero-castling.
pub fn normalize_san(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches(['+', '#', '!', '?']);
    match trimmed {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        other => other.to_string(),
    }
}

/// Side to move in the position
pub fn color_to_move(position: &Chess) -> PieceColor {
    position.turn().into()
}

/// Number of the move that produced this position.
/// After White's move this is the current full-move number, after Black's
/// move the full-move counter has already advanced so it is one less.
pub fn move_number_of(position: &Chess) -> u32 {
    let full = position.fullmoves().get();
    match position.turn() {
        SColor::Black => full,
        SColor::White => full.saturating_sub(1),
    }
}

/// `#` for mate, `+` for check
pub fn check_suffix(position: &Chess) -> &'static str {
    if position.is_checkmate() {
        "#"
    } else if position.is_check() {
        "+"
    } else {
        ""
    }
}
