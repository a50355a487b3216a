//! Turn sequencing.
//!
//! A move is accepted in two phases. `place_move` commits the stone, hands
//! the turn over and raises `Render`, leaving the controller `Resolving`.
//! `resolve` is the one continuation that judges the move: it ends the
//! game, hands control back to a human, or plays the automated opponent's
//! reply (which leaves the controller `Resolving` again). While a move is
//! being resolved every command except `restart` is rejected.

use crate::bot::{Bot, HeuristicBot};
use crate::game::{GameError, Player, PlayerIdentity, Position, Snapshot};
use crate::session::{GameMode, GameSession, SessionConfig};
use crate::win::check_winner;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

const EVENT_CAPACITY: usize = 256;

pub type SharedController = Arc<Mutex<TurnController>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fresh session, waiting for `choose_mode`
    ChoosingMode,
    Ready,
    /// A move was accepted and has not been judged yet
    Resolving,
    Ended,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::ChoosingMode => "choosing a game mode",
            Phase::Ready => "ready",
            Phase::Resolving => "a move is being resolved",
            Phase::Ended => "the game is over",
        }
    }
}

/// Outbound notifications for presentation collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Session state changed; re-read it
    Render,
    Ended { winner: PlayerIdentity },
    AutomatedMoveRequested { position: Position },
    /// A new session exists and a game mode must be chosen
    Restarted,
}

/// What a call to [`TurnController::resolve`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No move was pending
    Idle,
    Won(Player),
    /// The automated opponent replied; its move is pending now
    AutomatedMove(Position),
    AwaitingHuman,
    /// The automated opponent had nowhere to play
    NoMove,
}

pub struct TurnController {
    config: SessionConfig,
    session: GameSession,
    phase: Phase,
    bot: Box<dyn Bot>,
    events: broadcast::Sender<GameEvent>,
}

impl TurnController {
    /// A controller with the heuristic opponent, waiting for a game mode
    pub fn new(config: SessionConfig) -> Self {
        Self::with_bot(config, Box::new(HeuristicBot::default()))
    }

    pub fn with_bot(config: SessionConfig, bot: Box<dyn Bot>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        TurnController {
            config,
            session: GameSession::new(&config),
            phase: Phase::ChoosingMode,
            bot,
            events,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn current(&self) -> &Snapshot {
        self.session.current()
    }

    pub fn mover(&self) -> Player {
        self.session.mover()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_resolving(&self) -> bool {
        self.phase == Phase::Resolving
    }

    pub fn bot_name(&self) -> &str {
        self.bot.name()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: GameEvent) {
        // Sending only fails when nobody is subscribed
        let _ = self.events.send(event);
    }

    fn reject(&self, command: &'static str) -> GameError {
        debug!(command, phase = ?self.phase, "command rejected");
        GameError::InvalidTransition {
            command,
            phase: self.phase.name(),
        }
    }

    #[instrument(skip(self))]
    pub fn choose_mode(&mut self, mode: GameMode) -> Result<(), GameError> {
        if self.phase != Phase::ChoosingMode {
            return Err(self.reject("choose a game mode"));
        }

        self.session.mode = Some(mode);
        if mode == GameMode::HumanVsAutomated {
            self.bot.game_start(Player::Two);
        }
        self.phase = Phase::Ready;
        info!(mode = mode.name(), grid = %self.session.grid_size(), "game started");
        self.emit(GameEvent::Render);
        Ok(())
    }

    /// Accept a human move. On success the controller is `Resolving` until
    /// [`resolve`](Self::resolve) runs.
    #[instrument(skip(self))]
    pub fn place_move(&mut self, pos: Position) -> Result<(), GameError> {
        if self.phase != Phase::Ready {
            return Err(self.reject("place a stone"));
        }
        if self.session.is_automated(self.session.mover) {
            return Err(self.computer_to_move("place a stone"));
        }

        self.commit_move(pos)
    }

    /// Only reachable after the automated opponent found no move; from
    /// there a restart is the way forward
    fn computer_to_move(&self, command: &'static str) -> GameError {
        debug!(command, "human command while the computer is to play");
        GameError::InvalidTransition {
            command,
            phase: "the computer is to move",
        }
    }

    fn commit_move(&mut self, pos: Position) -> Result<(), GameError> {
        let player = self.session.mover;
        let next = self.session.current.place(pos, player)?;

        let previous = std::mem::replace(&mut self.session.current, next);
        self.session.history.record_move(previous);
        self.session.mover = player.opponent();
        self.phase = Phase::Resolving;

        info!(player = player.identity().name, position = %pos, "move accepted");
        debug!("\n{}", self.session.current.display_board());
        self.emit(GameEvent::Render);
        Ok(())
    }

    /// Judge the pending move
    #[instrument(skip(self))]
    pub fn resolve(&mut self) -> Resolution {
        if self.phase != Phase::Resolving {
            return Resolution::Idle;
        }

        if let Some(winner) = check_winner(&self.session.current) {
            self.session.winner = Some(winner);
            self.phase = Phase::Ended;
            info!(winner = winner.identity().name, "game over");
            self.emit(GameEvent::Ended {
                winner: winner.identity(),
            });
            return Resolution::Won(winner);
        }

        let mover = self.session.mover;
        if !self.session.is_automated(mover) {
            self.phase = Phase::Ready;
            return Resolution::AwaitingHuman;
        }

        let Some(pos) = self.bot.get_move(&self.session.current, mover) else {
            warn!(bot = self.bot.name(), "automated opponent found no move");
            self.phase = Phase::Ready;
            return Resolution::NoMove;
        };

        self.emit(GameEvent::AutomatedMoveRequested { position: pos });
        match self.commit_move(pos) {
            Ok(()) => Resolution::AutomatedMove(pos),
            Err(e) => {
                warn!(bot = self.bot.name(), error = %e, "automated move rejected");
                self.phase = Phase::Ready;
                Resolution::NoMove
            }
        }
    }

    /// Resolve back to back, without any delay, until nothing is pending
    pub fn resolve_all(&mut self) -> Resolution {
        loop {
            match self.resolve() {
                Resolution::AutomatedMove(_) => continue,
                other => return other,
            }
        }
    }

    /// Step back one move pair. Too little history is silently ignored.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Ready {
            return Err(self.reject("undo"));
        }
        if self.session.is_automated(self.session.mover) {
            return Err(self.computer_to_move("undo"));
        }

        match self.session.history.undo(&mut self.session.current) {
            Ok(()) => {
                self.emit(GameEvent::Render);
                Ok(())
            }
            Err(GameError::HistoryExhausted) => {
                debug!("nothing to undo");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Reapply an undone move pair
    #[instrument(skip(self))]
    pub fn redo(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Ready {
            return Err(self.reject("redo"));
        }
        if self.session.is_automated(self.session.mover) {
            return Err(self.computer_to_move("redo"));
        }

        self.session.history.redo(&mut self.session.current)?;
        self.emit(GameEvent::Render);
        Ok(())
    }

    /// Throw the session away and wait for a new game mode
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        self.session = GameSession::new(&self.config);
        self.phase = Phase::ChoosingMode;
        info!(grid = %self.session.grid_size(), "session restarted");
        self.emit(GameEvent::Restarted);
        self.emit(GameEvent::Render);
    }
}

pub fn lock_controller(controller: &Mutex<TurnController>) -> MutexGuard<'_, TurnController> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drive pending evaluations on the current task: sleep the configured
/// delay with the lock released, then resolve, until the controller is no
/// longer `Resolving`. Returns the last resolution.
pub async fn run_deferred(controller: &Mutex<TurnController>) -> Resolution {
    let mut outcome = Resolution::Idle;
    loop {
        let delay = {
            let guard = lock_controller(controller);
            if !guard.is_resolving() {
                return outcome;
            }
            guard.config().resolve_delay()
        };

        tokio::time::sleep(delay).await;
        outcome = lock_controller(controller).resolve();
    }
}
