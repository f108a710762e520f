//! Sparse Game of Life engine on an unbounded `i64` grid.
//!
//! The board is just its set of live cells. Every function here is pure over
//! its inputs; per-run state (frontier, neighbor counts, population history)
//! is local to the call.

mod cell;
mod cell_set;
mod generation;
mod neighbors;
mod stability;

pub use cell::{Cell, CellParseError};
pub use cell_set::{BuildCellHasher, CellHasher, CellSet, LiveSet};
pub use generation::{Annotated, Evolution, advance, annotate, next_generation, next_state};
pub use neighbors::{MOORE_OFFSETS, count_live_neighbors};
pub use stability::{
    Outcome, PopulationTracker, STABILITY_PERIODS, Settled, StabilityLimits, Unsettled,
    run_until_settled,
};
