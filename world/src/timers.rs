//! One-shot lifespan timers.

use std::{collections::BTreeMap, time::Duration};

use piece_arena_core::{PieceId, Timestamp};

/// Lifespan timer that came due.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DueTimer {
    /// Piece whose lifespan ended.
    pub piece: PieceId,
    /// Registration number the piece carried when the timer was armed.
    pub registration: u64,
    /// Time at which the timer was due.
    pub due: Timestamp,
}

/// Queue of single-shot lifespan timers ordered by due time.
///
/// Timers cannot be cancelled. Entries due at the same instant fire in the
/// order they were scheduled.
#[derive(Debug, Default)]
pub struct LifespanTimers {
    entries: BTreeMap<(Timestamp, u64), (PieceId, u64)>,
    next_sequence: u64,
}

impl LifespanTimers {
    /// Creates an empty timer queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a timer that fires once, `delay` after `now`, returning its due
    /// time.
    pub fn schedule_once(
        &mut self,
        now: Timestamp,
        delay: Duration,
        piece: PieceId,
        registration: u64,
    ) -> Timestamp {
        let due = now.saturating_add(delay);
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        let _ = self.entries.insert((due, sequence), (piece, registration));
        due
    }

    /// Removes and returns every timer due at or before `now`.
    pub fn drain_due(&mut self, now: Timestamp) -> Vec<DueTimer> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let ((at, _), (piece, registration)) = entry.remove_entry();
            due.push(DueTimer {
                piece,
                registration,
                due: at,
            });
        }
        due
    }

    /// Earliest pending due time.
    #[must_use]
    pub fn next_due(&self) -> Option<Timestamp> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
