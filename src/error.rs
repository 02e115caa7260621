use thiserror::Error;

use crate::grid::Pos;

/// Reasons a character grid cannot be turned into a patrol layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedGrid {
    #[error("grid has no cells")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unrecognized cell {ch:?} at ({x}, {y})")]
    UnknownCell { x: usize, y: usize, ch: char },

    #[error("no guard marker (one of ^ v < >) in grid")]
    MissingGuard,

    #[error("multiple guard markers: ({}, {}) and ({}, {})", first.x, first.y, second.x, second.y)]
    MultipleGuards { first: Pos, second: Pos },
}

pub type Result<T> = std::result::Result<T, MalformedGrid>;
