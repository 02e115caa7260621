use rayon::prelude::*;

use crate::config::Params;
use crate::grid::Pos;
use crate::index::ObstacleIndex;

use super::{Run, State, simulate};

/// Cells where an extra obstacle could change the patrol: every distinct
/// cell of the unobstructed path except the start cell.
pub fn candidates(baseline: &Run, start: State) -> Vec<Pos> {
    baseline
        .cells()
        .into_iter()
        .filter(|&p| p != start.pos)
        .collect()
}

/// Cells that trap the guard in a loop when they alone are added as an
/// obstacle, sorted by row then column.
///
/// Every candidate run is independent and reads the shared index only, so
/// with `params.parallel` the candidates are spread over the rayon pool.
pub fn loop_obstacles(index: &ObstacleIndex, start: State, baseline: &Run, params: &Params) -> Vec<Pos> {
    let cands = candidates(baseline, start);
    let traps = |cell: Pos| simulate(index, start, Some(cell), params).looped();

    let mut found: Vec<Pos> = if params.parallel {
        cands.par_iter().filter(|&&c| traps(c)).copied().collect()
    } else {
        cands.iter().filter(|&&c| traps(c)).copied().collect()
    };
    found.sort_unstable_by_key(|p| (p.y, p.x));

    log::debug!(
        "obstruction search: {} candidates, {} loop-inducing",
        cands.len(),
        found.len()
    );
    found
}
