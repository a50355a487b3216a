use crate::game::{GridSize, Player, Snapshot};
use crate::history::HistoryManager;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    HumanVsHuman,
    /// Player two is driven by the heuristic bot
    HumanVsAutomated,
}

impl GameMode {
    pub fn name(&self) -> &str {
        match self {
            GameMode::HumanVsHuman => "Human vs Human",
            GameMode::HumanVsAutomated => "Human vs Computer",
        }
    }
}

/// Startup parameters; read once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub grid_size: GridSize,
    /// Pause between accepting a move and judging it
    pub resolve_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            grid_size: GridSize::WIDE,
            resolve_delay_ms: 50,
        }
    }
}

impl SessionConfig {
    pub fn for_viewport(width_px: u32) -> Self {
        SessionConfig {
            grid_size: GridSize::from_viewport_width(width_px),
            ..Default::default()
        }
    }

    pub fn resolve_delay(&self) -> Duration {
        Duration::from_millis(self.resolve_delay_ms)
    }
}

/// Everything that belongs to one game. Replaced wholesale on restart.
#[derive(Debug, Clone)]
pub struct GameSession {
    grid_size: GridSize,
    pub(crate) current: Snapshot,
    pub(crate) mover: Player,
    pub(crate) winner: Option<Player>,
    pub(crate) mode: Option<GameMode>,
    pub(crate) history: HistoryManager,
}

impl GameSession {
    pub fn new(config: &SessionConfig) -> Self {
        let grid_size = config.grid_size;
        GameSession {
            grid_size,
            current: Snapshot::empty(grid_size),
            mover: Player::One,
            winner: None,
            mode: None,
            history: HistoryManager::with_capacity(grid_size.side() * grid_size.side()),
        }
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn mover(&self) -> Player {
        self.mover
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_ended(&self) -> bool {
        self.winner.is_some()
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// The automated opponent is always the second player
    pub fn is_automated(&self, player: Player) -> bool {
        self.mode == Some(GameMode::HumanVsAutomated) && player == Player::Two
    }
}
