use crate::direction::Direction;
use crate::rng::{Rng, splitmix64};

const SALT_GUARD: u64 = 0x6A09_E667_F3BC_C908;

/// Random w×h grid text with roughly `density` of its cells blocked and
/// exactly one guard on a free cell.
///
/// Deterministic in `seed`. Used for benchmarking and for checking the
/// segment walk against the cell-by-cell walk on many layouts.
pub fn random_grid(w: usize, h: usize, density: f32, seed: u64) -> String {
    assert!(w > 0 && h > 0, "grid must have at least one cell");
    let density = density.clamp(0.0, 1.0);
    let mut rng = Rng::new(seed);

    let mut cells: Vec<u8> = (0..w * h)
        .map(|_| if rng.next_f32() < density { b'#' } else { b'.' })
        .collect();

    // Guard: random cell and facing, cleared if it landed on an obstacle.
    let mut guard_rng = Rng::new(splitmix64(seed ^ SALT_GUARD));
    let at = guard_rng.range_usize(w * h);
    let dir = Direction::ALL[guard_rng.range_usize(4)];
    cells[at] = dir.marker() as u8;

    let mut out = String::with_capacity((w + 1) * h);
    for row in cells.chunks(w) {
        out.extend(row.iter().map(|&b| b as char));
        out.push('\n');
    }
    out
}
