//! Two-stack move history.
//!
//! The current snapshot always lives outside both stacks. Undo and redo
//! step two plies at a time so the same player is to move afterwards.
//! When only one entry is left on the stack being popped, that entry is
//! dropped and the current snapshot stays as it was; the dropped entry
//! cannot be brought back.
//!
//! Recording a move never clears `undone`, and neither stack is capped.
//! Both live as long as the session and are dropped by a restart.

use crate::game::{GameError, Snapshot};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    /// Older snapshots, most recent on top
    played: Vec<Snapshot>,
    /// Snapshots taken off by undo, restorable by redo
    undone: Vec<Snapshot>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        HistoryManager {
            played: Vec::with_capacity(capacity),
            undone: Vec::new(),
        }
    }

    /// Record the snapshot that is about to be replaced by a new move
    pub fn record_move(&mut self, previous: Snapshot) {
        self.played.push(previous);
    }

    /// Step back one move pair, swapping `current` in place.
    ///
    /// `Err(HistoryExhausted)` means `current` was left alone.
    pub fn undo(&mut self, current: &mut Snapshot) -> Result<(), GameError> {
        Self::step(&mut self.played, &mut self.undone, current, "undo")
    }

    /// Reverse of [`undo`](Self::undo)
    pub fn redo(&mut self, current: &mut Snapshot) -> Result<(), GameError> {
        Self::step(&mut self.undone, &mut self.played, current, "redo")
    }

    fn step(
        from: &mut Vec<Snapshot>,
        to: &mut Vec<Snapshot>,
        current: &mut Snapshot,
        command: &'static str,
    ) -> Result<(), GameError> {
        let Some(newer) = from.pop() else {
            return Err(GameError::HistoryExhausted);
        };
        let Some(older) = from.pop() else {
            debug!(command, last_move = ?newer.last_move(), "single history entry discarded");
            return Err(GameError::HistoryExhausted);
        };

        let replaced = std::mem::replace(current, older);
        to.push(replaced);
        to.push(newer);
        Ok(())
    }

    pub fn played(&self) -> &[Snapshot] {
        &self.played
    }

    pub fn undone(&self) -> &[Snapshot] {
        &self.undone
    }

    pub fn can_undo(&self) -> bool {
        self.played.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        self.undone.len() >= 2
    }
}
