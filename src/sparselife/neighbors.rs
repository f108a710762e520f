//! Moore-neighborhood counting.

use super::cell::Cell;
use super::cell_set::LiveSet;

/// The eight offsets at Chebyshev distance 1, row by row.
pub const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Count the live Moore neighbors of `cell` in `live`.
///
/// Every neighbor coordinate that is *not* live is handed to `on_dead`; the
/// generation step uses this to collect the frontier. Callers that only want
/// the count pass `|_| {}`.
#[inline]
pub fn count_live_neighbors<F>(live: &LiveSet, cell: Cell, mut on_dead: F) -> u8
where
    F: FnMut(Cell),
{
    let mut count = 0u8;
    for (dx, dy) in MOORE_OFFSETS {
        let neighbor = cell.offset(dx, dy);
        if live.contains(neighbor) {
            count += 1;
        } else {
            on_dead(neighbor);
        }
    }
    count
}
