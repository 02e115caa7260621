use std::collections::HashSet;

use crate::config::VisitedSet;
use crate::grid::Grid;

use super::State;

/// Set of (position, direction) states seen so far in one run.
#[derive(Clone, Debug)]
pub enum Visited {
    Hashed(HashSet<State>),
    /// One direction mask per cell.
    Packed(Grid<u8>),
}

impl Visited {
    pub fn new(w: usize, h: usize, kind: VisitedSet, packed_limit: usize) -> Self {
        let packed = match kind {
            VisitedSet::Hashed => false,
            VisitedSet::Packed => true,
            VisitedSet::Auto => w * h <= packed_limit,
        };
        if packed {
            Self::Packed(Grid::new(w, h))
        } else {
            Self::Hashed(HashSet::new())
        }
    }

    /// Record `state`; false if it was already present.
    #[inline]
    pub fn insert(&mut self, state: State) -> bool {
        match self {
            Self::Hashed(set) => set.insert(state),
            Self::Packed(grid) => {
                let i = grid.idx(state.pos.x, state.pos.y);
                let bit = state.dir.bit();
                let fresh = grid.data[i] & bit == 0;
                grid.data[i] |= bit;
                fresh
            }
        }
    }

    #[cfg(test)]
    fn contains(&self, state: State) -> bool {
        match self {
            Self::Hashed(set) => set.contains(&state),
            Self::Packed(grid) => grid.at(state.pos) & state.dir.bit() != 0,
        }
    }
}

/// Accumulates a path segment by segment and reports the first repeated state.
#[derive(Clone, Debug)]
pub struct LoopDetector {
    path: Vec<State>,
    visited: Visited,
}

impl LoopDetector {
    /// Start a path at `start`, which is recorded immediately.
    pub fn new(start: State, mut visited: Visited) -> Self {
        visited.insert(start);
        Self {
            path: vec![start],
            visited,
        }
    }

    /// Append `states` in order. Returns true on the first state already
    /// visited; that state and everything after it are not appended.
    pub fn consume(&mut self, states: &[State]) -> bool {
        for &s in states {
            if !self.visited.insert(s) {
                return true;
            }
            self.path.push(s);
        }
        false
    }

    #[inline]
    pub fn last(&self) -> State {
        // Never empty: seeded with the start state.
        self.path[self.path.len() - 1]
    }

    pub fn into_path(self) -> Vec<State> {
        self.path
    }
}
