//! Ordered pairs plus the one piece of mutable navigation state.

use crate::types::{Evaluation, PairEntry};

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The index changed; dependents must refresh.
    Moved { from: usize, to: usize },
    /// Out of range or already there; nothing to do.
    Stayed,
}

impl Navigation {
    pub fn moved(self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }
}

/// Client-side review state for one visit to a task.
///
/// `current_index` always satisfies `current_index < entries.len()` when the
/// session is non-empty, and is 0 otherwise. Entries keep their load order.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    entries: Vec<PairEntry>,
    current_index: usize,
}

impl ReviewSession {
    pub fn new(entries: Vec<PairEntry>) -> Self {
        Self { entries, current_index: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn entries(&self) -> &[PairEntry] {
        &self.entries
    }

    /// The entry at the current index; `None` for an empty session.
    pub fn current(&self) -> Option<&PairEntry> {
        self.entries.get(self.current_index)
    }

    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }

    pub fn has_previous(&self) -> bool {
        self.current_index > 0
    }

    /// Advances by one. No-op on the last pair; never wraps.
    pub fn next(&mut self) -> Navigation {
        if !self.has_next() {
            return Navigation::Stayed;
        }
        self.move_to(self.current_index + 1)
    }

    /// Steps back by one. No-op on the first pair.
    pub fn previous(&mut self) -> Navigation {
        if !self.has_previous() {
            return Navigation::Stayed;
        }
        self.move_to(self.current_index - 1)
    }

    /// Jumps to `index`. Out-of-range indices and the current index are no-ops.
    pub fn go_to(&mut self, index: usize) -> Navigation {
        if index >= self.entries.len() || index == self.current_index {
            return Navigation::Stayed;
        }
        self.move_to(index)
    }

    /// Stores an evaluation made during this visit. Returns false when
    /// `index` is out of range.
    pub fn record(&mut self, index: usize, evaluation: Evaluation) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.evaluation = Some(evaluation);
                true
            }
            None => false,
        }
    }

    fn move_to(&mut self, to: usize) -> Navigation {
        let from = self.current_index;
        self.current_index = to;
        Navigation::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VideoPair;

    fn entries(n: usize) -> Vec<PairEntry> {
        (0..n)
            .map(|i| PairEntry {
                pair: VideoPair {
                    id: format!("p{i}"),
                    index_in_task: i,
                    video_a_path: format!("a/{i}.mp4"),
                    video_b_path: format!("b/{i}.mp4"),
                    video_a_name: format!("{i}.mp4"),
                    video_b_name: format!("{i}.mp4"),
                    left_folder: "A".into(),
                    right_folder: "B".into(),
                    is_swapped: false,
                },
                evaluation: None,
            })
            .collect()
    }

    #[test]
    fn starts_at_zero() {
        let session = ReviewSession::new(entries(3));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current().unwrap().pair.id, "p0");
    }

    #[test]
    fn empty_session_has_no_current_pair() {
        let mut session = ReviewSession::new(Vec::new());
        assert!(session.current().is_none());
        assert_eq!(session.next(), Navigation::Stayed);
        assert_eq!(session.previous(), Navigation::Stayed);
        assert_eq!(session.go_to(0), Navigation::Stayed);
    }

    #[test]
    fn next_stops_at_last() {
        let mut session = ReviewSession::new(entries(2));
        assert_eq!(session.next(), Navigation::Moved { from: 0, to: 1 });
        assert_eq!(session.next(), Navigation::Stayed);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn previous_stops_at_first() {
        let mut session = ReviewSession::new(entries(2));
        assert_eq!(session.previous(), Navigation::Stayed);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn go_to_checks_bounds() {
        let mut session = ReviewSession::new(entries(3));
        assert_eq!(session.go_to(3), Navigation::Stayed);
        assert_eq!(session.go_to(usize::MAX), Navigation::Stayed);
        assert_eq!(session.go_to(2), Navigation::Moved { from: 0, to: 2 });
        assert_eq!(session.go_to(2), Navigation::Stayed);
    }

    #[test]
    fn record_keeps_position() {
        let mut session = ReviewSession::new(entries(2));
        let evaluation = Evaluation {
            id: None,
            choice: crate::types::Choice::Tie,
            chosen_folder: None,
            timestamp: None,
        };
        assert!(session.record(1, evaluation.clone()));
        assert!(!session.record(2, evaluation));
        assert_eq!(session.current_index(), 0);
        assert!(session.entries()[1].evaluation.is_some());
    }

    #[test]
    fn index_never_leaves_bounds() {
        let mut session = ReviewSession::new(entries(4));
        // Deterministic pseudo-random walk over all three transitions.
        let mut seed: u32 = 0x9e37_79b9;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            match seed % 3 {
                0 => session.next(),
                1 => session.previous(),
                _ => session.go_to((seed % 7) as usize),
            };
            assert!(session.current_index() < session.len());
        }
    }
}
