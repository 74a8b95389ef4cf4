//! A game played against a UCI engine.
//!
//! The game owns its own tree, seeded with the line leading to the start
//! node, and a score sheet for that line. It produces the commands to send
//! and consumes the engine's output lines; running the engine process is
//! up to the caller.
//!
//! States: `Idle` until started, then `UserThinking` and `EngineThinking`
//! alternate until the position is final (`GameOver`).

use std::collections::HashMap;

use shakmaty::{Chess, Position};
use tracing::{debug, info};

use crate::domain::chess::{apply_uci, fen_of};
use crate::domain::uci::{EngineLine, Score, UciCommand, UciInfo};
use crate::domain::{ContentType, NodeId, PieceColor, ROOT_NODE_ID, ScoreSheet, VariationTree};
use crate::error::{EngineGameError, TreeError};

/// Maximum number of engine output lines kept
const MAX_OUTPUT_LINES: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Idle,
    UserThinking,
    EngineThinking,
    GameOver,
}

pub struct EngineGame {
    tree: VariationTree,
    score_sheet: ScoreSheet,
    state: GameState,
    engine_color: PieceColor,
    /// Latest analysis per principal variation (1-based multipv)
    analysis_lines: HashMap<u32, UciInfo>,
    /// Score of the best line, positive when White is better
    last_score: Option<Score>,
    /// Recent raw output lines, oldest first
    output_lines: Vec<String>,
}

impl EngineGame {
    pub fn new() -> Self {
        Self {
            tree: VariationTree::new(ContentType::ModelGame),
            score_sheet: ScoreSheet::new(),
            state: GameState::Idle,
            engine_color: PieceColor::Black,
            analysis_lines: HashMap::new(),
            last_score: None,
            output_lines: Vec::new(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tree(&self) -> &VariationTree {
        &self.tree
    }

    pub fn score_sheet(&self) -> &ScoreSheet {
        &self.score_sheet
    }

    pub fn engine_color(&self) -> PieceColor {
        self.engine_color
    }

    pub fn last_score(&self) -> Option<Score> {
        self.last_score
    }

    pub fn output_lines(&self) -> &[String] {
        &self.output_lines
    }

    /// Analysis lines sorted by multipv number
    pub fn analysis_lines(&self) -> Vec<&UciInfo> {
        let mut lines: Vec<_> = self.analysis_lines.values().collect();
        lines.sort_by_key(|info| info.multipv.unwrap_or(1));
        lines
    }

    /// The node the game is currently at
    pub fn last_node(&self) -> NodeId {
        self.score_sheet.last_node().unwrap_or(ROOT_NODE_ID)
    }

    fn last_position(&self) -> Option<&Chess> {
        self.tree.get(self.last_node()).map(|n| &n.position)
    }

    /// Starts a game from `node_id` of `source`. The moves leading to it are
    /// copied into the game's own tree.
    pub fn start_from(
        &mut self,
        source: &VariationTree,
        node_id: NodeId,
        engine_color: PieceColor,
    ) -> Result<(), EngineGameError> {
        let stem = source.path_to(node_id);
        let Some((&root, plies)) = stem.split_first() else {
            return Err(TreeError::UnknownNode(node_id).into());
        };
        let root_position = source
            .get(root)
            .map(|n| n.position.clone())
            .ok_or(TreeError::UnknownNode(root))?;

        let mut tree = VariationTree::from_position(ContentType::ModelGame, root_position);
        let mut parent = ROOT_NODE_ID;
        for &id in plies {
            let Some(uci) = source.get(id).and_then(|n| n.uci.clone()) else {
                return Err(TreeError::invalid_state(format!("node {} has no move", id)).into());
            };
            let position = tree
                .get(parent)
                .map(|n| n.position.clone())
                .ok_or(TreeError::UnknownNode(parent))?;
            parent = tree.add_applied_move(parent, apply_uci(&position, &uci)?)?;
        }

        self.tree = tree;
        self.score_sheet.set_line_to_node(&self.tree, parent);
        self.engine_color = engine_color;
        self.analysis_lines.clear();
        self.last_score = None;
        self.output_lines.clear();
        info!(plies = plies.len(), engine = ?engine_color, "engine game started");
        self.update_state();
        Ok(())
    }

    /// Takes the game back to `node_id` of the game tree, dropping the moves
    /// played after it.
    pub fn restart_from(&mut self, node_id: NodeId) -> Result<(), EngineGameError> {
        if self.state == GameState::Idle {
            return Err(EngineGameError::NotInProgress);
        }
        self.tree.remove_tail_after(node_id)?;
        if !self.score_sheet.rollback_to_node(node_id) {
            self.score_sheet.set_line_to_node(&self.tree, node_id);
        }
        self.analysis_lines.clear();
        debug!(node = node_id, "engine game restarted");
        self.update_state();
        Ok(())
    }

    /// Plays the user's move given in SAN
    pub fn user_move(&mut self, san: &str) -> Result<NodeId, EngineGameError> {
        match self.state {
            GameState::UserThinking => {}
            GameState::EngineThinking => return Err(EngineGameError::WrongTurn("user")),
            GameState::Idle | GameState::GameOver => return Err(EngineGameError::NotInProgress),
        }
        let parent = self.last_node();
        let id = self.tree.add_move(parent, san)?;
        self.score_sheet.add_ply_and_move(&self.tree, id);
        self.update_state();
        Ok(id)
    }

    /// `position` command for the current line: the start position followed
    /// by every move played since.
    pub fn position_command(&self) -> UciCommand {
        let root = &self.tree.root().position;
        let fen = (fen_of(root) != fen_of(&Chess::default())).then(|| fen_of(root));
        let moves = self
            .score_sheet
            .node_list()
            .iter()
            .skip(1)
            .filter_map(|&id| self.tree.get(id).and_then(|n| n.uci.clone()))
            .collect();
        UciCommand::Position { fen, moves }
    }

    pub fn go_command(&self, movetime_ms: u64) -> UciCommand {
        UciCommand::GoMovetime(movetime_ms)
    }

    /// Handles one line of engine output. Returns the id of the node added
    /// when the line is the engine's move.
    pub fn process_engine_line(&mut self, line: &str) -> Result<Option<NodeId>, EngineGameError> {
        self.output_lines.push(line.trim().to_string());
        if self.output_lines.len() > MAX_OUTPUT_LINES {
            let excess = self.output_lines.len() - MAX_OUTPUT_LINES;
            self.output_lines.drain(0..excess);
        }

        match EngineLine::parse(line) {
            EngineLine::Info(info) if info.has_analysis() => {
                let pv = info.multipv.unwrap_or(1);
                if pv == 1 {
                    if let (Some(score), Some(pos)) = (info.score, self.last_position()) {
                        self.last_score = Some(score.white_relative(pos.turn().into()));
                    }
                }
                self.analysis_lines.insert(pv, info);
                Ok(None)
            }
            EngineLine::BestMove { best, .. } if self.state == GameState::EngineThinking => match best {
                Some(uci) => self.play_engine_move(&uci).map(Some),
                None => {
                    info!("engine has no move, game over");
                    self.state = GameState::GameOver;
                    Ok(None)
                }
            },
            EngineLine::BestMove { best, .. } => {
                debug!(?best, state = ?self.state, "ignoring best move");
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn play_engine_move(&mut self, uci: &str) -> Result<NodeId, EngineGameError> {
        let parent = self.last_node();
        let position = self
            .last_position()
            .cloned()
            .ok_or(TreeError::UnknownNode(parent))?;
        let applied = apply_uci(&position, uci)?;
        let id = self.tree.add_applied_move(parent, applied)?;
        if let (Some(score), Some(node)) = (self.last_score, self.tree.get_mut(id)) {
            node.annotations.engine_evaluation = Some(score.evaluation_text());
        }
        self.score_sheet.add_ply_and_move(&self.tree, id);
        self.analysis_lines.clear();
        self.update_state();
        Ok(id)
    }

    fn update_state(&mut self) {
        let next = match self.last_position() {
            Some(pos) if pos.is_game_over() => GameState::GameOver,
            Some(pos) if PieceColor::from(pos.turn()) == self.engine_color => GameState::EngineThinking,
            Some(_) => GameState::UserThinking,
            None => GameState::Idle,
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "engine game state");
            self.state = next;
        }
    }
}

impl Default for EngineGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn study() -> (VariationTree, NodeId) {
        let mut tree = VariationTree::new(ContentType::Study);
        let e4 = tree.add_move(ROOT_NODE_ID, "e4").unwrap();
        let e5 = tree.add_move(e4, "e5").unwrap();
        tree.add_move(e5, "Nf3").unwrap();
        (tree, e5)
    }

    #[test]
    fn test_start_copies_stem_only() {
        let (source, e5) = study();
        let mut game = EngineGame::new();
        assert_eq!(game.state(), GameState::Idle);
        game.start_from(&source, e5, PieceColor::Black).unwrap();
        assert_eq!(game.tree().len(), 3);
        assert_eq!(game.score_sheet().ply_count(), 2);
        assert_eq!(game.state(), GameState::UserThinking);
    }

    #[test]
    fn test_full_exchange() {
        let (source, e5) = study();
        let mut game = EngineGame::new();
        game.start_from(&source, e5, PieceColor::Black).unwrap();

        game.user_move("Nf3").unwrap();
        assert_eq!(game.state(), GameState::EngineThinking);
        assert!(matches!(game.user_move("d4"), Err(EngineGameError::WrongTurn(_))));
        assert_eq!(
            game.position_command().to_uci_string(),
            "position startpos moves e2e4 e7e5 g1f3"
        );
        assert_eq!(game.go_command(1000).to_uci_string(), "go movetime 1000");

        // Black to move: +30 for Black is -0.30 for White
        game.process_engine_line("info depth 12 score cp 30 pv b8c6 f1b5").unwrap();
        assert_eq!(game.last_score(), Some(Score::Centipawns(-30)));
        let played = game.process_engine_line("bestmove b8c6 ponder f1b5").unwrap().unwrap();
        let node = game.tree().get(played).unwrap();
        assert_eq!(node.san.as_deref(), Some("Nc6"));
        assert_eq!(node.annotations.engine_evaluation.as_deref(), Some("-0.30"));
        assert_eq!(game.state(), GameState::UserThinking);
        assert_eq!(game.score_sheet().ply_count(), 4);
    }

    #[test]
    fn test_restart_from_earlier_node() {
        let (source, e5) = study();
        let mut game = EngineGame::new();
        game.start_from(&source, e5, PieceColor::Black).unwrap();
        let nf3 = game.user_move("Nf3").unwrap();
        game.process_engine_line("bestmove b8c6").unwrap();

        game.restart_from(nf3).unwrap();
        assert_eq!(game.last_node(), nf3);
        assert_eq!(game.state(), GameState::EngineThinking);
        assert_eq!(game.tree().len(), 4);
    }

    #[test]
    fn test_mate_ends_game() {
        let mut source = VariationTree::new(ContentType::Study);
        let mut id = ROOT_NODE_ID;
        for san in ["f3", "e5", "g4"] {
            id = source.add_move(id, san).unwrap();
        }
        let mut game = EngineGame::new();
        game.start_from(&source, id, PieceColor::Black).unwrap();
        assert_eq!(game.state(), GameState::EngineThinking);
        game.process_engine_line("bestmove d8h4").unwrap();
        assert_eq!(game.state(), GameState::GameOver);
        assert!(matches!(game.user_move("a3"), Err(EngineGameError::NotInProgress)));
    }

    #[test]
    fn test_output_is_capped() {
        let mut game = EngineGame::new();
        for i in 0..150 {
            game.process_engine_line(&format!("info string line {}", i)).unwrap();
        }
        assert_eq!(game.output_lines().len(), 100);
        assert_eq!(game.output_lines()[0], "info string line 50");
    }
}
