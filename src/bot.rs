use crate::game::{Player, Position, Snapshot};
use crate::heuristic::{self, Candidate};
use tracing::debug;

/// Trait for automated opponents
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Choose a cell for `player` on the given board, or `None` if the bot
    /// has nowhere to play
    fn get_move(&mut self, snapshot: &Snapshot, player: Player) -> Option<Position>;

    /// Notified when a new session starts
    fn game_start(&mut self, _player: Player) {}
}

/// The fixed-heuristic opponent: blocks the opponent's longest runs first
pub struct HeuristicBot {
    name: String,
    last_choice: Option<Candidate>,
}

impl HeuristicBot {
    pub fn new(name: String) -> Self {
        HeuristicBot {
            name,
            last_choice: None,
        }
    }

    /// The cell and combined score of the most recent move
    pub fn last_choice(&self) -> Option<Candidate> {
        self.last_choice
    }
}

impl Default for HeuristicBot {
    fn default() -> Self {
        HeuristicBot::new("Heuristic Bot".to_string())
    }
}

impl Bot for HeuristicBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, player: Player) -> Option<Position> {
        self.last_choice = heuristic::choose_move(snapshot, player);
        if let Some(choice) = self.last_choice {
            debug!(
                bot = %self.name,
                position = %choice.position,
                score = choice.score,
                "heuristic choice"
            );
        }
        self.last_choice.map(|choice| choice.position)
    }

    fn game_start(&mut self, _player: Player) {
        self.last_choice = None;
    }
}
