pub mod config;
pub mod direction;
pub mod error;
pub mod generate;
pub mod grid;
pub mod index;
pub mod patrol;
pub mod render;
pub mod rng;

use std::time::Instant;

use config::Params;
use error::Result;
use grid::Pos;
use index::Layout;
use patrol::State;

pub use error::MalformedGrid;

pub struct Report {
    pub layout: Layout,
    /// Unobstructed patrol, start state first.
    pub path: Vec<State>,
    /// Distinct cells of `path`.
    pub visited: usize,
    /// Cells where one extra obstacle traps the guard, sorted by row then column.
    pub loop_cells: Vec<Pos>,
}

impl Report {
    #[inline]
    pub fn loop_obstacles(&self) -> usize {
        self.loop_cells.len()
    }
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Parse `text`, walk the guard and run the obstruction search.
pub fn solve(text: &str, params: &Params) -> Result<(Report, Vec<Timing>)> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Parse grid into the obstacle index
    let t = Instant::now();
    let layout = index::parse(text)?;
    timings.push(Timing {
        name: "parse",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Unobstructed patrol
    let t = Instant::now();
    let baseline = patrol::simulate(&layout.index, layout.start, None, params);
    let visited = baseline.cells().len();
    timings.push(Timing {
        name: "patrol",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. One extra obstacle on each cell of the patrol
    let t = Instant::now();
    let loop_cells = patrol::search::loop_obstacles(&layout.index, layout.start, &baseline, params);
    timings.push(Timing {
        name: "obstruction_search",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });

    let report = Report {
        layout,
        path: baseline.path,
        visited,
        loop_cells,
    };

    Ok((report, timings))
}

/// Number of distinct cells the guard covers before leaving the grid.
pub fn count_visited_cells(text: &str) -> Result<usize> {
    let layout = index::parse(text)?;
    let run = patrol::simulate(&layout.index, layout.start, None, &Params::default());
    Ok(run.cells().len())
}

/// Number of single-obstacle placements that trap the guard in a loop.
pub fn count_loop_inducing_obstacles(text: &str) -> Result<usize> {
    let layout = index::parse(text)?;
    let params = Params::default();
    let baseline = patrol::simulate(&layout.index, layout.start, None, &params);
    Ok(patrol::search::loop_obstacles(&layout.index, layout.start, &baseline, &params).len())
}
