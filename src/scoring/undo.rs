use std::collections::VecDeque;

use super::{errors::ScoringError, models::Match};

pub const UNDO_CAPACITY: usize = 50;

/// Bounded stack of whole-match snapshots; the oldest falls off when full.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoLedger {
    snapshots: VecDeque<Match>,
    capacity: usize,
}

impl Default for UndoLedger {
    fn default() -> Self {
        Self::with_capacity(UNDO_CAPACITY)
    }
}

impl UndoLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: Match) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Result<Match, ScoringError> {
        self.snapshots.pop_back().ok_or(ScoringError::EmptyHistory)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
