//! In-memory who-played-whom relation.

use std::collections::HashSet;

use crate::models::{MatchRecord, PlayerId};

/// Set of unordered player pairs that have already met.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchHistory {
    pairs: HashSet<(PlayerId, PlayerId)>,
}

fn key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl MatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut history = Self::new();
        for record in records {
            history.insert(record.first, record.second);
        }
        history
    }

    pub fn insert(&mut self, a: PlayerId, b: PlayerId) {
        self.pairs.insert(key(a, b));
    }

    pub fn has_played(&self, a: PlayerId, b: PlayerId) -> bool {
        self.pairs.contains(&key(a, b))
    }

    /// Number of distinct pairs that have met.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(PlayerId, PlayerId)> for MatchHistory {
    fn from_iter<I: IntoIterator<Item = (PlayerId, PlayerId)>>(iter: I) -> Self {
        let mut history = Self::new();
        for (a, b) in iter {
            history.insert(a, b);
        }
        history
    }
}
