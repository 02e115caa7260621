use crate::direction::{Axis, Direction};
use crate::error::{MalformedGrid, Result};
use crate::grid::Pos;
use crate::patrol::State;

/// Obstacle lookup by lane: for every row the sorted obstacle columns,
/// for every column the sorted obstacle rows. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstacleIndex {
    w: usize,
    h: usize,
    rows: Vec<Vec<usize>>,
    cols: Vec<Vec<usize>>,
}

impl ObstacleIndex {
    /// Build from obstacle positions in any order.
    pub fn from_obstacles(w: usize, h: usize, obstacles: impl IntoIterator<Item = Pos>) -> Self {
        let mut rows = vec![Vec::new(); h];
        let mut cols = vec![Vec::new(); w];
        for p in obstacles {
            debug_assert!(p.x < w && p.y < h);
            rows[p.y].push(p.x);
            cols[p.x].push(p.y);
        }
        for lane in rows.iter_mut().chain(cols.iter_mut()) {
            lane.sort_unstable();
            lane.dedup();
        }
        Self { w, h, rows, cols }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.w && pos.y < self.h
    }

    /// Sorted obstacle columns on row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[usize] {
        &self.rows[y]
    }

    /// Sorted obstacle rows on column `x`.
    #[inline]
    pub fn column(&self, x: usize) -> &[usize] {
        &self.cols[x]
    }

    /// The sorted lane a guard at `pos` travels along when facing `dir`.
    #[inline]
    pub fn lane(&self, pos: Pos, dir: Direction) -> &[usize] {
        match dir.axis() {
            Axis::Row => self.column(pos.x),
            Axis::Column => self.row(pos.y),
        }
    }

    pub fn is_obstacle(&self, pos: Pos) -> bool {
        self.contains(pos) && self.rows[pos.y].binary_search(&pos.x).is_ok()
    }

    pub fn obstacle_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// A parsed grid: the static obstacles and where the guard starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub index: ObstacleIndex,
    pub start: State,
}

/// Parse a rectangular character grid.
///
/// `#` is an obstacle, `.` is floor and one of `^ v < >` marks the guard
/// and its facing. Trailing whitespace on each line and trailing blank
/// lines are ignored.
pub fn parse(text: &str) -> Result<Layout> {
    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let h = lines.len();
    // Width comes from the first non-blank row so a stray blank row reports as ragged.
    let w = lines
        .iter()
        .find(|l| !l.is_empty())
        .map_or(0, |l| l.chars().count());
    if h == 0 || w == 0 {
        return Err(MalformedGrid::Empty);
    }

    let mut obstacles = Vec::new();
    let mut start: Option<State> = None;

    for (y, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != w {
            return Err(MalformedGrid::Ragged {
                row: y,
                expected: w,
                found,
            });
        }

        for (x, ch) in line.chars().enumerate() {
            match ch {
                '#' => obstacles.push(Pos::new(x, y)),
                '.' => {}
                _ => {
                    let Some(dir) = Direction::from_marker(ch) else {
                        return Err(MalformedGrid::UnknownCell { x, y, ch });
                    };
                    let here = State::new(Pos::new(x, y), dir);
                    if let Some(first) = start {
                        return Err(MalformedGrid::MultipleGuards {
                            first: first.pos,
                            second: here.pos,
                        });
                    }
                    start = Some(here);
                }
            }
        }
    }

    let start = start.ok_or(MalformedGrid::MissingGuard)?;
    let index = ObstacleIndex::from_obstacles(w, h, obstacles);
    log::debug!(
        "parsed {}x{} grid, {} obstacles, guard at ({}, {}) facing {:?}",
        w,
        h,
        index.obstacle_count(),
        start.pos.x,
        start.pos.y,
        start.dir
    );

    Ok(Layout { index, start })
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_parse_sample() {
        let layout = parse(SAMPLE).unwrap();
        assert_eq!(layout.index.width(), 10);
        assert_eq!(layout.index.height(), 10);
        assert_eq!(layout.index.obstacle_count(), 8);
        assert_eq!(layout.start, State::new(Pos::new(4, 6), Direction::North));
        assert!(!layout.index.is_obstacle(layout.start.pos));
    }

    #[test]
    fn test_lanes_are_sorted() {
        let layout = parse("#.#\n.^.\n#..\n").unwrap();
        assert_eq!(layout.index.row(0), &[0, 2]);
        assert_eq!(layout.index.column(0), &[0, 2]);
        assert_eq!(layout.index.column(1), &[] as &[usize]);
        assert_eq!(layout.index.lane(Pos::new(0, 1), Direction::South), &[0, 2]);
        assert_eq!(layout.index.lane(Pos::new(1, 0), Direction::East), &[0, 2]);
    }

    #[test]
    fn test_crlf_and_trailing_blank_lines() {
        let layout = parse(".#.\r\n.>.\r\n\r\n\n").unwrap();
        assert_eq!(layout.index.height(), 2);
        assert_eq!(layout.start.dir, Direction::East);
    }

    #[test]
    fn test_ragged_rows() {
        assert_eq!(
            parse("...\n.^\n...\n"),
            Err(MalformedGrid::Ragged {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_leading_blank_line_is_ragged() {
        assert_eq!(
            parse("\n.^.\n"),
            Err(MalformedGrid::Ragged {
                row: 0,
                expected: 3,
                found: 0
            })
        );
    }

    #[test]
    fn test_missing_guard() {
        assert_eq!(parse("..#\n...\n"), Err(MalformedGrid::MissingGuard));
    }

    #[test]
    fn test_multiple_guards() {
        assert_eq!(
            parse(".^.\n..v\n"),
            Err(MalformedGrid::MultipleGuards {
                first: Pos::new(1, 0),
                second: Pos::new(2, 1)
            })
        );
    }

    #[test]
    fn test_unknown_cell() {
        assert_eq!(
            parse(".^.\n.X.\n"),
            Err(MalformedGrid::UnknownCell { x: 1, y: 1, ch: 'X' })
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse(""), Err(MalformedGrid::Empty));
        assert_eq!(parse("\n\n"), Err(MalformedGrid::Empty));
    }
}
