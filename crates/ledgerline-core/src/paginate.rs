// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Ordering & Pagination
// ─────────────────────────────────────────────────────────────────────
//! Newest-first ordering of a facility's events and the cursor that
//! controls how much of that history is revealed.
//!
//! # Cursor invariants
//!
//! 1. `size <= total` at all times.
//! 2. `advance()` never shrinks `size`; at `size == total` it is a no-op.
//! 3. `rebase()` keeps what was already revealed, clamped to the new
//!    total. Only a shrinking snapshot can lower `size`.

use serde::{Deserialize, Serialize};

use ledgerline_types::{NormalizedEvent, TimelineConfig};

/// Sort newest first. Equal timestamps keep their input order.
pub fn sort_newest_first(events: &mut [NormalizedEvent]) {
    // `sort_by` is stable.
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Progressive-disclosure cursor over one facility's ordered events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCursor {
    size: usize,
    total: usize,
    initial: usize,
    step: usize,
}

impl WindowCursor {
    /// Fresh cursor at its initial size for a history of `total` events.
    pub fn new(initial: usize, step: usize, total: usize) -> Self {
        Self {
            size: initial.min(total),
            total,
            initial,
            step: step.max(1),
        }
    }

    pub fn from_config(config: &TimelineConfig, total: usize) -> Self {
        Self::new(config.initial_window, config.window_step, total)
    }

    /// Number of events currently revealed.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of events in the history.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.size
    }

    /// True once the whole history is revealed.
    pub fn is_exhausted(&self) -> bool {
        self.size == self.total
    }

    /// Reveal up to one more step. Returns whether anything was revealed.
    pub fn advance(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.size = self.size.saturating_add(self.step).min(self.total);
        true
    }

    /// Carry the cursor over to a refreshed history of `total` events.
    pub fn rebase(&mut self, total: usize) {
        self.size = self.size.max(self.initial.min(total)).min(total);
        self.total = total;
    }

    /// The revealed prefix of `items`.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.size.min(items.len())]
    }
}
