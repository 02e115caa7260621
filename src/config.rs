use serde::Deserialize;

/// How the guard is advanced between turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stepping {
    /// One lane lookup per straight run.
    #[default]
    Segment,
    /// One cell per step. Slower; kept as the reference walk.
    Cell,
}

/// Representation of the visited-state set used for loop detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VisitedSet {
    /// Packed for grids up to `Params::packed_limit` cells, hashed above.
    #[default]
    Auto,
    Hashed,
    Packed,
}

/// All tunable parameters of a solve.
#[derive(Clone, Debug)]
pub struct Params {
    /// Fan the obstruction search out over the rayon pool.
    pub parallel: bool,
    pub stepping: Stepping,
    pub visited: VisitedSet,
    /// Largest grid (in cells) for which `VisitedSet::Auto` packs.
    pub packed_limit: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            parallel: true,
            stepping: Stepping::Segment,
            visited: VisitedSet::Auto,
            packed_limit: 1 << 22,
        }
    }
}
