//! Backtracking search for a perfect matching that avoids rematches.
//!
//! Players are addressed by their index in a fixed array. Which players are
//! already seated is tracked in a bitmask, so undoing a tentative pair is two
//! bit clears.
//!
//! The search is exponential in the worst case. It stays fast for the
//! tournament sizes it is meant for (tens of players), and no player cap is
//! imposed; larger fields should run it under a deadline and abort through
//! [`MatchingSearch::with_abort`].

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// Symmetric "these two have already met" relation over player indices.
#[derive(Debug, Clone)]
pub struct ConflictMatrix {
    size: usize,
    cells: Vec<bool>,
}

impl ConflictMatrix {
    /// Build the matrix by asking `conflict` once per unordered pair.
    pub fn build<F>(size: usize, conflict: F) -> Self
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut cells = vec![false; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                if conflict(i, j) {
                    cells[i * size + j] = true;
                    cells[j * size + i] = true;
                }
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn conflicts(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.size + j]
    }
}

/// Fixed-size bitmask of seated players.
#[derive(Debug, Clone)]
struct SeatMask {
    words: Vec<u64>,
}

impl SeatMask {
    fn new(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(64)],
        }
    }

    fn contains(&self, i: usize) -> bool {
        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    fn insert(&mut self, i: usize) {
        self.words[i / 64] |= 1 << (i % 64);
    }

    fn remove(&mut self, i: usize) {
        self.words[i / 64] &= !(1 << (i % 64));
    }

    /// Lowest index below `size` that is not seated.
    fn first_free(&self, size: usize) -> Option<usize> {
        self.words.iter().enumerate().find_map(|(w, word)| {
            let idx = w * 64 + (!word).trailing_zeros() as usize;
            (word != &u64::MAX && idx < size).then_some(idx)
        })
    }
}

/// Result of a matching search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A complete matching, as index pairs in the order they were seated.
    Found(Vec<(usize, usize)>),
    /// Every candidate was tried; no rematch-free matching exists.
    Exhausted,
    /// The abort flag was raised before the search finished.
    Aborted,
}

enum Step {
    Complete,
    DeadEnd,
    Aborted,
}

/// Depth-first search with undo over a [`ConflictMatrix`].
///
/// The lowest unseated index is always seated next, against each later
/// unseated index in turn. The first complete matching found is returned,
/// so the same matrix always yields the same result.
pub struct MatchingSearch<'a> {
    conflicts: &'a ConflictMatrix,
    abort: Option<&'a AtomicBool>,
    nodes: u64,
}

impl<'a> MatchingSearch<'a> {
    pub fn new(conflicts: &'a ConflictMatrix) -> Self {
        Self {
            conflicts,
            abort: None,
            nodes: 0,
        }
    }

    /// Stop searching as soon as `flag` is set.
    pub fn with_abort(mut self, flag: Option<&'a AtomicBool>) -> Self {
        self.abort = flag;
        self
    }

    /// Number of seating decisions explored by the last run.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn run(&mut self) -> SearchOutcome {
        let size = self.conflicts.size();
        self.nodes = 0;

        // An odd field can never be fully seated.
        if size % 2 != 0 {
            return SearchOutcome::Exhausted;
        }

        let mut seated = SeatMask::new(size);
        let mut pairs = Vec::with_capacity(size / 2);

        let outcome = match self.extend(&mut seated, size, &mut pairs) {
            Step::Complete => SearchOutcome::Found(pairs),
            Step::DeadEnd => SearchOutcome::Exhausted,
            Step::Aborted => SearchOutcome::Aborted,
        };

        debug!("Matching search over {} players visited {} nodes", size, self.nodes);
        outcome
    }

    fn aborted(&self) -> bool {
        self.abort.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn extend(
        &mut self,
        seated: &mut SeatMask,
        remaining: usize,
        pairs: &mut Vec<(usize, usize)>,
    ) -> Step {
        if remaining == 0 {
            return Step::Complete;
        }
        if self.aborted() {
            return Step::Aborted;
        }
        self.nodes += 1;

        let size = self.conflicts.size();
        let Some(p) = seated.first_free(size) else {
            return Step::DeadEnd;
        };
        seated.insert(p);

        for q in (p + 1)..size {
            if seated.contains(q) || self.conflicts.conflicts(p, q) {
                continue;
            }

            seated.insert(q);
            pairs.push((p, q));

            match self.extend(seated, remaining - 2, pairs) {
                Step::Complete => return Step::Complete,
                Step::Aborted => return Step::Aborted,
                Step::DeadEnd => {
                    pairs.pop();
                    seated.remove(q);
                }
            }
        }

        seated.remove(p);
        Step::DeadEnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(size: usize, met: &[(usize, usize)]) -> ConflictMatrix {
        ConflictMatrix::build(size, |i, j| {
            met.iter()
                .any(|&(a, b)| (a, b) == (i, j) || (a, b) == (j, i))
        })
    }

    #[test]
    fn test_conflict_matrix_is_symmetric() {
        let m = matrix(3, &[(2, 0)]);
        assert!(m.conflicts(0, 2));
        assert!(m.conflicts(2, 0));
        assert!(!m.conflicts(0, 1));
    }

    #[test]
    fn test_seat_mask_first_free_across_words() {
        let mut mask = SeatMask::new(70);
        for i in 0..65 {
            mask.insert(i);
        }
        assert_eq!(mask.first_free(70), Some(65));
        mask.remove(3);
        assert_eq!(mask.first_free(70), Some(3));
    }

    #[test]
    fn test_seat_mask_full() {
        let mut mask = SeatMask::new(64);
        for i in 0..64 {
            mask.insert(i);
        }
        assert_eq!(mask.first_free(64), None);

        let mut partial = SeatMask::new(2);
        partial.insert(0);
        partial.insert(1);
        assert_eq!(partial.first_free(2), None);
    }

    #[test]
    fn test_no_conflicts_pairs_neighbours() {
        let m = matrix(4, &[]);
        assert_eq!(
            MatchingSearch::new(&m).run(),
            SearchOutcome::Found(vec![(0, 1), (2, 3)])
        );
    }

    #[test]
    fn test_skips_previous_opponent() {
        let m = matrix(4, &[(0, 1), (2, 3)]);
        assert_eq!(
            MatchingSearch::new(&m).run(),
            SearchOutcome::Found(vec![(0, 2), (1, 3)])
        );
    }

    #[test]
    fn test_backtracks_out_of_dead_end() {
        // Seating 0-1 leaves 2 and 3, who have met; the search must undo it.
        let m = matrix(4, &[(2, 3)]);
        assert_eq!(
            MatchingSearch::new(&m).run(),
            SearchOutcome::Found(vec![(0, 2), (1, 3)])
        );
    }

    #[test]
    fn test_deep_backtrack() {
        // 4 and 5 have met everyone except 0 and 1, forcing 0 and 1 away from
        // their first choices.
        let m = matrix(6, &[(4, 5), (2, 4), (3, 4), (2, 5), (3, 5)]);
        let SearchOutcome::Found(pairs) = MatchingSearch::new(&m).run() else {
            panic!("expected a matching");
        };
        assert_eq!(pairs, vec![(0, 4), (1, 5), (2, 3)]);
    }

    #[test]
    fn test_round_robin_exhausts() {
        let m = matrix(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let mut search = MatchingSearch::new(&m);
        assert_eq!(search.run(), SearchOutcome::Exhausted);
        assert!(search.nodes() > 0);
    }

    #[test]
    fn test_empty_field_is_trivially_matched() {
        let m = matrix(0, &[]);
        assert_eq!(MatchingSearch::new(&m).run(), SearchOutcome::Found(vec![]));
    }

    #[test]
    fn test_odd_field_exhausts() {
        let m = matrix(3, &[]);
        assert_eq!(MatchingSearch::new(&m).run(), SearchOutcome::Exhausted);
    }

    #[test]
    fn test_raised_abort_flag_stops_search() {
        let m = matrix(4, &[]);
        let flag = AtomicBool::new(true);
        let outcome = MatchingSearch::new(&m).with_abort(Some(&flag)).run();
        assert_eq!(outcome, SearchOutcome::Aborted);
    }

    #[test]
    fn test_search_is_deterministic() {
        let m = matrix(8, &[(0, 1), (2, 3), (4, 5), (6, 7), (0, 2), (1, 3)]);
        let first = MatchingSearch::new(&m).run();
        let second = MatchingSearch::new(&m).run();
        assert_eq!(first, second);
        assert!(matches!(first, SearchOutcome::Found(_)));
    }
}
