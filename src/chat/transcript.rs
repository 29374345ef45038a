//! Ordered record of the turns exchanged in one chat session.

use super::turn::{Role, Turn};

/// Default number of recent turns sent along with each chat request.
pub const HISTORY_WINDOW: usize = 10;

/// Append-only list of turns for the current session.
///
/// The only removal allowed is [`rollback`](Self::rollback) of the user turn
/// that was just appended, after its send failed. Nothing is persisted; the
/// transcript is dropped with its session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return its index (the transcript length before the
    /// append). The index is the mark passed to [`rollback`](Self::rollback).
    pub fn append(&mut self, turn: Turn) -> usize {
        let mark = self.turns.len();
        self.turns.push(turn);
        mark
    }

    /// Remove the user turn appended at `mark`.
    ///
    /// Only succeeds when that turn is still the last entry and was spoken by
    /// the user; anything else leaves the transcript untouched and returns
    /// `None`.
    pub(crate) fn rollback(&mut self, mark: usize) -> Option<Turn> {
        if self.turns.len() != mark + 1 {
            return None;
        }
        match self.turns.last() {
            Some(turn) if turn.role() == Role::User => self.turns.pop(),
            _ => None,
        }
    }

    /// The last `n` turns in their original order, oldest dropped first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
