//! Single-generation B3/S23 transition and the multi-step driver.
//!
//! A step never mutates the set it counts against: neighbor counts for both
//! live and frontier cells are taken from the same input `LiveSet`, and the
//! next generation is built into a fresh set.

use super::cell::Cell;
use super::cell_set::{CellSet, LiveSet, cell_set_with_capacity};
use super::neighbors::count_live_neighbors;

/// Neighbor counts for one generation.
///
/// Rebuilt from scratch on every step; nothing here outlives the step that
/// produced it.
#[derive(Debug, Default)]
pub struct Annotated {
    /// Every live cell with its live-neighbor count.
    pub live: Vec<(Cell, u8)>,
    /// Every dead cell adjacent to a live cell, with its live-neighbor count.
    pub frontier: Vec<(Cell, u8)>,
}

/// Count neighbors for every live cell and every frontier cell of `live`.
pub fn annotate(live: &LiveSet) -> Annotated {
    let mut frontier: CellSet = cell_set_with_capacity(live.len() * 3);
    let live_counts: Vec<(Cell, u8)> = live
        .iter()
        .map(|cell| {
            let count = count_live_neighbors(live, cell, |dead| {
                frontier.insert(dead);
            });
            (cell, count)
        })
        .collect();

    // Frontier cells only need a count; their own dead neighbors cannot be
    // born (they have no live neighbor) and are dropped.
    let frontier_counts = frontier
        .into_iter()
        .map(|cell| (cell, count_live_neighbors(live, cell, |_| {})))
        .collect();

    Annotated {
        live: live_counts,
        frontier: frontier_counts,
    }
}

/// Conway's rule for one cell: survive on 2 or 3, be born on exactly 3.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Apply one generation to `live`, returning the next live set.
pub fn next_generation(live: &LiveSet) -> LiveSet {
    if live.is_empty() {
        return LiveSet::new();
    }
    let Annotated { live: live_counts, frontier } = annotate(live);

    let mut next = LiveSet::with_capacity(live.len());
    next.extend(
        live_counts
            .into_iter()
            .filter(|&(_, count)| next_state(true, count))
            .map(|(cell, _)| cell),
    );
    next.extend(
        frontier
            .into_iter()
            .filter(|&(_, count)| next_state(false, count))
            .map(|(cell, _)| cell),
    );
    next
}

/// Result of [`advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evolution {
    pub live: LiveSet,
    /// Generations actually computed; below the request when the set emptied.
    pub generations: u64,
}

/// Apply [`next_generation`] up to `steps` times.
///
/// Stops as soon as the set is empty, since the empty set is a fixed point.
pub fn advance(live: LiveSet, steps: u64) -> Evolution {
    let mut live = live;
    let mut generations = 0;
    while generations < steps && !live.is_empty() {
        live = next_generation(&live);
        generations += 1;
    }
    Evolution { live, generations }
}
