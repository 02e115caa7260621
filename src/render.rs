use rayon::prelude::*;

use crate::direction::Axis;
use crate::grid::{Grid, Pos};
use crate::index::Layout;
use crate::patrol::State;

// Color palette
const FLOOR: [u8; 4] = [28, 30, 36, 255];
const OBSTACLE: [u8; 4] = [150, 150, 160, 255];
const TRAIL_VERTICAL: [u8; 4] = [70, 130, 200, 255];
const TRAIL_HORIZONTAL: [u8; 4] = [80, 180, 110, 255];
const TRAIL_CROSSING: [u8; 4] = [230, 220, 120, 255];
const START: [u8; 4] = [240, 90, 60, 255];
const LOOP_CELL: [u8; 4] = [200, 60, 200, 255];

/// Upper bound on pixels in one upscaled render (64 MiB of RGBA).
pub const MAX_PIXELS: usize = 1 << 24;

const MASK_VERTICAL: u8 = 1;
const MASK_HORIZONTAL: u8 = 2;
const MASK_LOOP: u8 = 4;

/// Per-cell flags: which axes the path travelled through the cell, and
/// whether the cell is a loop-inducing obstacle site.
fn trail_mask(layout: &Layout, path: &[State], loop_cells: &[Pos]) -> Grid<u8> {
    let mut mask = Grid::<u8>::new(layout.index.width(), layout.index.height());
    for s in path {
        let bit = match s.dir.axis() {
            Axis::Row => MASK_VERTICAL,
            Axis::Column => MASK_HORIZONTAL,
        };
        let i = mask.idx(s.pos.x, s.pos.y);
        mask.data[i] |= bit;
    }
    for p in loop_cells {
        let i = mask.idx(p.x, p.y);
        mask.data[i] |= MASK_LOOP;
    }
    mask
}

/// Render a patrol as RGBA, one pixel per cell.
pub fn render_patrol(layout: &Layout, path: &[State], loop_cells: &[Pos]) -> Vec<u8> {
    let w = layout.index.width();
    let h = layout.index.height();
    let mask = trail_mask(layout, path, loop_cells);
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let obstacles = layout.index.row(y);
        for x in 0..w {
            let m = mask.get(x, y);
            let color = if obstacles.binary_search(&x).is_ok() {
                OBSTACLE
            } else if m & MASK_LOOP != 0 {
                LOOP_CELL
            } else if Pos::new(x, y) == layout.start.pos {
                START
            } else {
                match m & (MASK_VERTICAL | MASK_HORIZONTAL) {
                    MASK_VERTICAL => TRAIL_VERTICAL,
                    MASK_HORIZONTAL => TRAIL_HORIZONTAL,
                    0 => FLOOR,
                    _ => TRAIL_CROSSING,
                }
            };
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });

    rgba
}

/// Largest scale up to `requested` that keeps a w×h render within
/// `MAX_PIXELS`. None when even one pixel per cell is over budget.
pub fn fit_scale(w: usize, h: usize, requested: usize) -> Option<usize> {
    let cells = w.checked_mul(h)?.max(1);
    if cells > MAX_PIXELS {
        return None;
    }
    Some(requested.clamp(1, (MAX_PIXELS / cells).isqrt()))
}

/// Nearest-neighbour enlargement so small grids are visible as images.
pub fn upscale(rgba: &[u8], w: usize, h: usize, factor: usize) -> Vec<u8> {
    let factor = factor.max(1);
    let ow = w * factor;
    let mut out = vec![0u8; ow * h * factor * 4];

    out.par_chunks_mut(ow * 4).enumerate().for_each(|(oy, row)| {
        let y = oy / factor;
        for ox in 0..ow {
            let src = (y * w + ox / factor) * 4;
            row[ox * 4..ox * 4 + 4].copy_from_slice(&rgba[src..src + 4]);
        }
    });

    out
}

/// Text picture of a patrol: `|` vertical travel, `-` horizontal, `+` both,
/// `O` loop-inducing cell, the guard marker on the start cell.
pub fn render_ascii(layout: &Layout, path: &[State], loop_cells: &[Pos]) -> String {
    let w = layout.index.width();
    let h = layout.index.height();
    let mask = trail_mask(layout, path, loop_cells);
    let mut out = String::with_capacity((w + 1) * h);

    for y in 0..h {
        for x in 0..w {
            let m = mask.get(x, y);
            let ch = if layout.index.is_obstacle(Pos::new(x, y)) {
                '#'
            } else if m & MASK_LOOP != 0 {
                'O'
            } else if Pos::new(x, y) == layout.start.pos {
                layout.start.dir.marker()
            } else {
                match m & (MASK_VERTICAL | MASK_HORIZONTAL) {
                    MASK_VERTICAL => '|',
                    MASK_HORIZONTAL => '-',
                    0 => '.',
                    _ => '+',
                }
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Params;
    use crate::index::parse;
    use crate::patrol::simulate;

    const SAMPLE: &str = "\
....#.....
.........#
..........
..#.......
.......#..
..........
.#..^.....
........#.
#.........
......#...
";

    #[test]
    fn test_ascii_trail_of_sample() {
        let layout = parse(SAMPLE).unwrap();
        let run = simulate(&layout.index, layout.start, None, &Params::default());
        let marked: String = render_ascii(&layout, &run.path, &[])
            .chars()
            .map(|c| if "|-+^".contains(c) { 'X' } else { c })
            .collect();
        assert_eq!(
            marked,
            "\
....#.....
....XXXXX#
....X...X.
..#.X...X.
..XXXXX#X.
..X.X.X.X.
.#XXXXXXX.
.XXXXXXX#.
#XXXXXXX..
......#X..
"
        );
    }

    #[test]
    fn test_ascii_marks_loop_cells_and_corners() {
        let layout = parse("..#..\n....#\n..^..\n...#.\n").unwrap();
        let run = simulate(&layout.index, layout.start, None, &Params::default());
        let text = render_ascii(&layout, &run.path, &[Pos::new(1, 2)]);
        assert_eq!(text, "..#..\n..++#\n-O^+.\n...#.\n");
    }

    #[test]
    fn test_rgba_colors() {
        let layout = parse("#.\n^.\n").unwrap();
        let run = simulate(&layout.index, layout.start, None, &Params::default());
        let rgba = render_patrol(&layout, &run.path, &[]);
        assert_eq!(rgba.len(), 2 * 2 * 4);
        assert_eq!(&rgba[0..4], &OBSTACLE);
        assert_eq!(&rgba[8..12], &START);
        assert_eq!(&rgba[12..16], &TRAIL_HORIZONTAL);
    }

    #[test]
    fn test_fit_scale_respects_pixel_budget() {
        assert_eq!(fit_scale(10, 10, 8), Some(8));
        assert_eq!(fit_scale(10, 10, 0), Some(1));
        assert_eq!(fit_scale(800, 800, 32), Some(5));
        assert_eq!(fit_scale(4096, 4096, 1), Some(1));
        assert_eq!(fit_scale(4097, 4096, 1), None);
        assert_eq!(fit_scale(usize::MAX, 2, 1), None);
        for (w, h) in [(3, 7), (130, 130), (1000, 17), (2500, 2500)] {
            let s = fit_scale(w, h, usize::MAX).unwrap();
            assert!(w * h * s * s <= MAX_PIXELS);
            assert!(w * h * (s + 1) * (s + 1) > MAX_PIXELS);
        }
    }

    #[test]
    fn test_upscale() {
        let rgba = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let big = upscale(&rgba, 2, 1, 2);
        assert_eq!(big.len(), 4 * 2 * 4);
        assert_eq!(&big[0..8], &[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(&big[16..24], &[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(&big[24..32], &[5, 6, 7, 8, 5, 6, 7, 8]);
    }
}
