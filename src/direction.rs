use serde::Serialize;

/// Compass facing of the guard. Right turns cycle North→East→South→West.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

/// The coordinate a direction changes while travelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Row index changes (North/South).
    Row,
    /// Column index changes (East/West).
    Column,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    #[inline]
    pub fn turn_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::Row,
            Self::East | Self::West => Axis::Column,
        }
    }

    /// -1 when travel decreases the coordinate (North, West), +1 otherwise.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Self::North | Self::West => -1,
            Self::South | Self::East => 1,
        }
    }

    /// (dx, dy) of one step.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self.axis() {
            Axis::Row => (0, self.sign()),
            Axis::Column => (self.sign(), 0),
        }
    }

    /// Mask bit used by the packed visited-state set.
    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Self::North => 1,
            Self::East => 2,
            Self::South => 4,
            Self::West => 8,
        }
    }

    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '^' => Some(Self::North),
            'v' => Some(Self::South),
            '<' => Some(Self::West),
            '>' => Some(Self::East),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Self::North => '^',
            Self::South => 'v',
            Self::West => '<',
            Self::East => '>',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_right_turns_return_home() {
        for d in Direction::ALL {
            let back = d.turn_right().turn_right().turn_right().turn_right();
            assert_eq!(back, d);
            assert_ne!(d.turn_right(), d);
        }
        assert_eq!(Direction::North.turn_right(), Direction::East);
        assert_eq!(Direction::West.turn_right(), Direction::North);
    }

    #[test]
    fn test_axis_and_sign() {
        assert_eq!(Direction::North.axis(), Axis::Row);
        assert_eq!(Direction::South.axis(), Axis::Row);
        assert_eq!(Direction::East.axis(), Axis::Column);
        assert_eq!(Direction::North.delta(), (0, -1));
        assert_eq!(Direction::West.delta(), (-1, 0));
        assert_eq!(Direction::South.sign(), 1);
    }

    #[test]
    fn test_markers_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_marker(d.marker()), Some(d));
        }
        assert_eq!(Direction::from_marker('#'), None);
    }

    #[test]
    fn test_bits_are_distinct() {
        let all = Direction::ALL.iter().fold(0u8, |acc, d| acc | d.bit());
        assert_eq!(all, 0b1111);
    }
}
