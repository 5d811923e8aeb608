//! Match records: the immutable result of one game between two players.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, MatchId, PlayerId};

/// Result of a match from the point of view of its first player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    FirstWins,
    SecondWins,
    Draw,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::FirstWins => write!(f, "first wins"),
            Outcome::SecondWins => write!(f, "second wins"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// A recorded match between two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Content-derived identifier
    pub id: MatchId,

    pub first: PlayerId,

    pub second: PlayerId,

    pub outcome: Outcome,

    /// Position in the match history; never reused until matches are reset
    #[serde(default)]
    pub sequence: usize,

    /// When the result was reported
    pub recorded_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Create a match record. `sequence` is the record's position in the
    /// match history and keeps IDs unique for repeated pairings.
    pub fn new(first: PlayerId, second: PlayerId, outcome: Outcome, sequence: usize) -> Self {
        let id = EntityId::generate(&[
            &first.to_string(),
            &second.to_string(),
            &sequence.to_string(),
        ]);

        Self {
            id,
            first,
            second,
            outcome,
            sequence,
            recorded_at: Utc::now(),
        }
    }

    /// The winning player, or `None` for a draw.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            Outcome::FirstWins => Some(self.first),
            Outcome::SecondWins => Some(self.second),
            Outcome::Draw => None,
        }
    }

    /// True if this match was between `a` and `b`, in either order.
    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}
