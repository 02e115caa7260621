use crate::direction::{Axis, Direction};
use crate::grid::{Pos, offset_xy};
use crate::index::ObstacleIndex;

use super::State;

/// The shared obstacle index plus at most one hypothetical obstacle.
///
/// The extra obstacle is consulted at query time, so the index itself is
/// never copied or mutated and any number of views can share it.
#[derive(Clone, Copy, Debug)]
pub struct Obstacles<'a> {
    index: &'a ObstacleIndex,
    extra: Option<Pos>,
}

impl<'a> Obstacles<'a> {
    pub fn new(index: &'a ObstacleIndex, extra: Option<Pos>) -> Self {
        debug_assert!(extra.is_none_or(|p| index.contains(p)));
        Self { index, extra }
    }

    #[inline]
    pub fn index(&self) -> &'a ObstacleIndex {
        self.index
    }

    pub fn is_obstacle(&self, pos: Pos) -> bool {
        self.extra == Some(pos) || self.index.is_obstacle(pos)
    }

    /// Coordinate (along the axis of travel) of the nearest obstacle strictly
    /// ahead of `pos` when facing `dir`.
    pub fn nearest_ahead(&self, pos: Pos, dir: Direction) -> Option<usize> {
        let lane = self.index.lane(pos, dir);
        let (here, on_lane) = match dir.axis() {
            Axis::Row => (pos.y, self.extra.filter(|e| e.x == pos.x).map(|e| e.y)),
            Axis::Column => (pos.x, self.extra.filter(|e| e.y == pos.y).map(|e| e.x)),
        };

        if dir.sign() > 0 {
            let i = lane.partition_point(|&c| c <= here);
            let base = lane.get(i).copied();
            let extra = on_lane.filter(|&c| c > here);
            match (base, extra) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        } else {
            let i = lane.partition_point(|&c| c < here);
            let base = i.checked_sub(1).map(|j| lane[j]);
            let extra = on_lane.filter(|&c| c < here);
            match (base, extra) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            }
        }
    }
}

/// How a segment finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentEnd {
    /// Blocked; the last state is the turn in place.
    Turned,
    /// Walked off the grid after the last state.
    Exited,
}

/// States traversed between two direction changes (or up to the edge).
/// Does not include the state the segment started from.
#[derive(Clone, Debug)]
pub struct Segment {
    pub states: Vec<State>,
    pub end: SegmentEnd,
}

impl Segment {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            end: SegmentEnd::Exited,
        }
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::new()
    }
}

/// Position `k` cells from `pos` in direction `dir`. Caller guarantees bounds.
#[inline]
fn advance(pos: Pos, dir: Direction, k: usize) -> Pos {
    match dir {
        Direction::North => Pos::new(pos.x, pos.y - k),
        Direction::South => Pos::new(pos.x, pos.y + k),
        Direction::West => Pos::new(pos.x - k, pos.y),
        Direction::East => Pos::new(pos.x + k, pos.y),
    }
}

/// Advance from `from` to the next turning point or off the grid in one lookup.
///
/// With an obstacle `d` cells ahead the segment holds the `d - 1` cells in
/// between followed by the turn in place on the last of them (on `from`
/// itself when `d == 1`). Without one it holds the straight run to the edge.
pub fn next_segment(from: State, obstacles: &Obstacles<'_>, segment: &mut Segment) {
    segment.states.clear();
    let State { pos, dir } = from;
    let index = obstacles.index();
    let here = match dir.axis() {
        Axis::Row => pos.y,
        Axis::Column => pos.x,
    };

    match obstacles.nearest_ahead(pos, dir) {
        Some(hit) => {
            let d = hit.abs_diff(here);
            debug_assert!(d >= 1);
            segment
                .states
                .extend((1..d).map(|k| State::new(advance(pos, dir, k), dir)));
            let stop = advance(pos, dir, d - 1);
            segment.states.push(State::new(stop, dir.turn_right()));
            segment.end = SegmentEnd::Turned;
        }
        None => {
            let remaining = match (dir.axis(), dir.sign() > 0) {
                (Axis::Row, true) => index.height() - 1 - here,
                (Axis::Column, true) => index.width() - 1 - here,
                (_, false) => here,
            };
            segment
                .states
                .extend((1..=remaining).map(|k| State::new(advance(pos, dir, k), dir)));
            segment.end = SegmentEnd::Exited;
        }
    }

    debug_assert!(
        segment.states.iter().all(|s| !obstacles.is_obstacle(s.pos)),
        "segment from {from:?} stepped onto an obstacle"
    );
}

/// Result of a single-cell step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Moved(State),
    Turned(State),
    Exited,
}

/// Reference stepper: move one cell forward, or turn right in place when blocked.
pub fn step(from: State, obstacles: &Obstacles<'_>) -> Step {
    let index = obstacles.index();
    let (dx, dy) = from.dir.delta();
    match offset_xy(from.pos.x, from.pos.y, dx, dy, index.width(), index.height()) {
        None => Step::Exited,
        Some((x, y)) => {
            let next = Pos::new(x, y);
            if obstacles.is_obstacle(next) {
                Step::Turned(State::new(from.pos, from.dir.turn_right()))
            } else {
                Step::Moved(State::new(next, from.dir))
            }
        }
    }
}

/// Build the same segment as [`next_segment`] by stepping cell by cell.
pub fn stepped_segment(from: State, obstacles: &Obstacles<'_>, segment: &mut Segment) {
    segment.states.clear();
    let mut at = from;
    loop {
        match step(at, obstacles) {
            Step::Moved(s) => {
                segment.states.push(s);
                at = s;
            }
            Step::Turned(s) => {
                segment.states.push(s);
                segment.end = SegmentEnd::Turned;
                return;
            }
            Step::Exited => {
                segment.end = SegmentEnd::Exited;
                return;
            }
        }
    }
}
