//! UCI (Universal Chess Interface) protocol types.
//!
//! Commands are rendered to text and engine output lines are parsed from
//! text. Spawning the engine and moving lines in and out of it is left to
//! the caller.

use super::chess::PieceColor;

/// UCI commands sent to an engine during a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// Check if engine is ready
    IsReady,
    /// Set a new game
    UciNewGame,
    /// Set position (startpos or FEN, with optional moves)
    Position { fen: Option<String>, moves: Vec<String> },
    /// Search for a fixed time in milliseconds
    GoMovetime(u64),
    /// Start analysis with depth limit
    GoDepth(u32),
    /// Stop analysis
    Stop,
}

impl UciCommand {
    /// Convert command to UCI protocol string
    pub fn to_uci_string(&self) -> String {
        match self {
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),
            UciCommand::Position { fen, moves } => {
                let mut cmd = String::from("position ");
                match fen {
                    Some(f) => {
                        cmd.push_str("fen ");
                        cmd.push_str(f);
                    }
                    None => cmd.push_str("startpos"),
                }
                if !moves.is_empty() {
                    cmd.push_str(" moves ");
                    cmd.push_str(&moves.join(" "));
                }
                cmd
            }
            UciCommand::GoMovetime(ms) => format!("go movetime {}", ms),
            UciCommand::GoDepth(d) => format!("go depth {}", d),
            UciCommand::Stop => "stop".to_string(),
        }
    }
}

/// A line of engine output that matters for a game
#[derive(Debug, Clone, PartialEq)]
pub enum EngineLine {
    /// "readyok"
    ReadyOk,
    /// "info ..." with the parsed analysis data
    Info(UciInfo),
    /// "bestmove <move> [ponder <move>]"; `None` when the engine has no move
    BestMove {
        best: Option<String>,
        ponder: Option<String>,
    },
    /// Anything else
    Other(String),
}

impl EngineLine {
    /// Parse a raw UCI output line
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line == "readyok" {
            EngineLine::ReadyOk
        } else if let Some(rest) = line.strip_prefix("info ") {
            EngineLine::Info(UciInfo::parse(rest))
        } else if let Some(rest) = line.strip_prefix("bestmove") {
            let mut tokens = rest.split_whitespace();
            let best = tokens
                .next()
                .filter(|m| *m != "(none)" && *m != "0000")
                .map(str::to_string);
            let ponder = match tokens.next() {
                Some("ponder") => tokens.next().map(str::to_string),
                _ => None,
            };
            EngineLine::BestMove { best, ponder }
        } else {
            EngineLine::Other(line.to_string())
        }
    }
}

/// Engine evaluation score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Centipawn score
    Centipawns(i32),
    /// Mate in N moves (positive = the side to move mates)
    Mate(i32),
}

impl Score {
    /// Flip a score reported for the side to move so that positive means
    /// White is better.
    pub fn white_relative(self, color_to_move: PieceColor) -> Self {
        if color_to_move.is_white() {
            return self;
        }
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::Mate(moves) => Score::Mate(-moves),
        }
    }

    /// Evaluation text as stored in `%chf-eev`: `0.35`, `-1.25`, `+#3`, `-#2`
    pub fn evaluation_text(&self) -> String {
        match self {
            Score::Centipawns(cp) => format!("{:.2}", *cp as f64 / 100.0),
            Score::Mate(moves) => {
                let sign = if *moves > 0 { "+" } else { "-" };
                format!("{}#{}", sign, moves.abs())
            }
        }
    }

    /// Get a numeric value for comparison (centipawns, or large value for mate)
    pub fn as_centipawns(&self) -> i32 {
        match self {
            Score::Centipawns(cp) => *cp,
            Score::Mate(moves) => {
                if *moves > 0 {
                    10000 - *moves // Mate in fewer moves is better
                } else {
                    -10000 - *moves // Being mated in fewer moves is worse
                }
            }
        }
    }
}

/// Parsed UCI info line containing analysis data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UciInfo {
    /// Search depth
    pub depth: Option<u32>,
    /// Selective search depth
    pub seldepth: Option<u32>,
    /// Multi-PV line number (1-indexed)
    pub multipv: Option<u32>,
    /// Evaluation score, from the point of view of the side to move
    pub score: Option<Score>,
    /// Nodes searched
    pub nodes: Option<u64>,
    /// Time spent in milliseconds
    pub time: Option<u64>,
    /// Principal variation (best line) as UCI moves
    pub pv: Vec<String>,
}

const INFO_KEYWORDS: &[&str] = &[
    "depth", "seldepth", "multipv", "score", "nodes", "nps", "time", "hashfull", "currmove",
    "currmovenumber", "string", "refutation", "currline", "tbhits", "cpuload",
];

impl UciInfo {
    /// Parse a UCI info string (the part after "info ")
    pub fn parse(info_str: &str) -> Self {
        let mut info = UciInfo::default();
        let mut tokens = info_str.split_whitespace().peekable();

        while let Some(token) = tokens.next() {
            match token {
                "depth" => info.depth = tokens.next().and_then(|t| t.parse().ok()),
                "seldepth" => info.seldepth = tokens.next().and_then(|t| t.parse().ok()),
                "multipv" => info.multipv = tokens.next().and_then(|t| t.parse().ok()),
                "nodes" => info.nodes = tokens.next().and_then(|t| t.parse().ok()),
                "time" => info.time = tokens.next().and_then(|t| t.parse().ok()),
                "score" => {
                    // score cp <x> or score mate <x>, optionally followed by a bound
                    let kind = tokens.next();
                    let value = tokens.next().and_then(|t| t.parse::<i32>().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Centipawns(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => info.score,
                    };
                }
                "pv" => {
                    while let Some(mv) = tokens.next_if(|t| !INFO_KEYWORDS.contains(t)) {
                        info.pv.push(mv.to_string());
                    }
                }
                // a free text message runs to the end of the line
                "string" => break,
                _ => {}
            }
        }

        info
    }

    /// Check if this info line has meaningful analysis data (depth + score + pv)
    pub fn has_analysis(&self) -> bool {
        self.depth.is_some() && self.score.is_some() && !self.pv.is_empty()
    }
}
