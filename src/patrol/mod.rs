pub mod detect;
pub mod search;
pub mod segment;

use std::collections::HashSet;

use serde::Serialize;

use crate::config::{Params, Stepping};
use crate::direction::Direction;
use crate::grid::Pos;
use crate::index::ObstacleIndex;

use detect::{LoopDetector, Visited};
use segment::{Obstacles, Segment, SegmentEnd, next_segment, stepped_segment};

/// Guard position and facing; the unit of loop detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct State {
    pub pos: Pos,
    pub dir: Direction,
}

impl State {
    pub const fn new(pos: Pos, dir: Direction) -> Self {
        Self { pos, dir }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The guard walked off the grid.
    Exited,
    /// The guard re-entered a recorded state and will never leave.
    Looped,
}

/// One simulated patrol.
#[derive(Clone, Debug)]
pub struct Run {
    /// Every recorded state in order, starting with the start state.
    pub path: Vec<State>,
    pub outcome: Outcome,
}

impl Run {
    #[inline]
    pub fn looped(&self) -> bool {
        self.outcome == Outcome::Looped
    }

    /// Distinct cells of the path in first-visit order.
    pub fn cells(&self) -> Vec<Pos> {
        let mut seen = HashSet::with_capacity(self.path.len());
        self.path
            .iter()
            .map(|s| s.pos)
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

/// Walk the guard from `start` until it leaves the grid or loops.
///
/// `extra` adds one hypothetical obstacle for this run only.
pub fn simulate(index: &ObstacleIndex, start: State, extra: Option<Pos>, params: &Params) -> Run {
    debug_assert!(extra != Some(start.pos), "extra obstacle under the guard");
    let obstacles = Obstacles::new(index, extra);
    let visited = Visited::new(index.width(), index.height(), params.visited, params.packed_limit);
    let mut detector = LoopDetector::new(start, visited);
    let mut segment = Segment::new();

    let outcome = loop {
        let at = detector.last();
        match params.stepping {
            Stepping::Segment => next_segment(at, &obstacles, &mut segment),
            Stepping::Cell => stepped_segment(at, &obstacles, &mut segment),
        }
        if detector.consume(&segment.states) {
            break Outcome::Looped;
        }
        if segment.end == SegmentEnd::Exited {
            break Outcome::Exited;
        }
    };

    let path = detector.into_path();
    debug_assert!(path.len() <= index.width() * index.height() * 4);
    Run { path, outcome }
}
