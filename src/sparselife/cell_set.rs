//! Hash sets keyed by [`Cell`], and the [`LiveSet`] board state built on them.

use std::collections::HashSet;
use std::hash::{BuildHasherDefault, Hasher};

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// Pass-through hasher for [`Cell`] keys.
///
/// `Cell::hash` already emits one mixed `u64`, so the hasher keeps it as is.
/// Arbitrary byte input falls back to a multiplicative fold.
#[derive(Default, Clone, Copy)]
pub struct CellHasher {
    hash: u64,
}

impl Hasher for CellHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.hash
    }

    #[inline(always)]
    fn write_u64(&mut self, value: u64) {
        self.hash = self.hash.rotate_left(5) ^ value;
    }

    fn write(&mut self, bytes: &[u8]) {
        const SEED: u64 = 0x51_7c_c1_b7_27_22_0a_95;
        for &byte in bytes {
            self.hash = (self.hash.rotate_left(5) ^ byte as u64).wrapping_mul(SEED);
        }
    }
}

pub type BuildCellHasher = BuildHasherDefault<CellHasher>;

/// A plain set of cells with the coordinate hasher.
pub type CellSet = HashSet<Cell, BuildCellHasher>;

pub fn cell_set_with_capacity(capacity: usize) -> CellSet {
    CellSet::with_capacity_and_hasher(capacity, BuildCellHasher::default())
}

/// The complete state of a board: every member is live, everything else dead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct LiveSet {
    cells: CellSet,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: cell_set_with_capacity(capacity),
        }
    }

    /// Build a live set from `(x, y)` pairs; duplicates collapse.
    pub fn from_coords<I: IntoIterator<Item = (i64, i64)>>(coords: I) -> Self {
        coords.into_iter().map(Cell::from).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Returns `true` if the cell was not already live.
    #[inline]
    pub fn insert(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Cells in row-major order (by `y`, then `x`).
    pub fn to_sorted_vec(&self) -> Vec<Cell> {
        let mut out: Vec<Cell> = self.iter().collect();
        out.sort_unstable_by_key(|cell| (cell.y, cell.x));
        out
    }

    /// Inclusive bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(i64, i64, i64, i64)> {
        let mut cells = self.iter();
        let first = cells.next()?;
        Some(cells.fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), cell| {
                (
                    min_x.min(cell.x),
                    min_y.min(cell.y),
                    max_x.max(cell.x),
                    max_y.max(cell.y),
                )
            },
        ))
    }
}

impl FromIterator<Cell> for LiveSet {
    fn from_iter<T: IntoIterator<Item = Cell>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut set = Self::with_capacity(iter.size_hint().0);
        set.extend(iter);
        set
    }
}

impl Extend<Cell> for LiveSet {
    fn extend<T: IntoIterator<Item = Cell>>(&mut self, iter: T) {
        self.cells.extend(iter);
    }
}

impl From<Vec<Cell>> for LiveSet {
    fn from(cells: Vec<Cell>) -> Self {
        cells.into_iter().collect()
    }
}

impl From<LiveSet> for Vec<Cell> {
    fn from(set: LiveSet) -> Self {
        set.to_sorted_vec()
    }
}
