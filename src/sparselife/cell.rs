//! Integer grid coordinates.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Two distinct Fibonacci-derived constants for mixing x and y independently,
/// so grid-aligned patterns do not collapse onto a few buckets.
const MX: u64 = 0x517c_c1b7_2722_0a95;
const MY: u64 = 0x6c62_272e_07bb_0142;

#[inline(always)]
pub(crate) fn coord_hash(x: i64, y: i64) -> u64 {
    (x as u64).wrapping_mul(MX) ^ (y as u64).wrapping_mul(MY).rotate_right(31)
}

/// A single grid cell. Equality and ordering are purely structural.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The cell displaced by `(dx, dy)`. Wraps at the edges of `i64`.
    #[inline]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }
}

impl Hash for Cell {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(coord_hash(self.x, self.y));
    }
}

impl From<(i64, i64)> for Cell {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

impl From<Cell> for (i64, i64) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CellParseError {
    #[error("expected `x,y`, got {0:?}")]
    Shape(String),
    #[error("invalid coordinate {value:?}: {source}")]
    Coordinate {
        value: String,
        source: std::num::ParseIntError,
    },
}

impl FromStr for Cell {
    type Err = CellParseError;

    /// Parses `x,y`, with optional surrounding parentheses and whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (x, y) = trimmed
            .split_once(',')
            .ok_or_else(|| CellParseError::Shape(s.to_string()))?;
        let parse = |value: &str| {
            let value = value.trim();
            value
                .parse::<i64>()
                .map_err(|source| CellParseError::Coordinate {
                    value: value.to_string(),
                    source,
                })
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, CellParseError};

    #[test]
    fn parses_plain_and_parenthesized_pairs() {
        assert_eq!("3,-4".parse::<Cell>(), Ok(Cell::new(3, -4)));
        assert_eq!(" ( -1 , 7 ) ".parse::<Cell>(), Ok(Cell::new(-1, 7)));
        assert!(matches!(
            "12".parse::<Cell>(),
            Err(CellParseError::Shape(_))
        ));
        assert!(matches!(
            "1,y".parse::<Cell>(),
            Err(CellParseError::Coordinate { .. })
        ));
    }

    #[test]
    fn offset_wraps_at_extremes() {
        let corner = Cell::new(i64::MAX, i64::MIN);
        assert_eq!(corner.offset(1, -1), Cell::new(i64::MIN, i64::MAX));
    }

    #[test]
    fn display_matches_parse_input() {
        let cell = Cell::new(-9, 12);
        assert_eq!(cell.to_string(), "(-9, 12)");
        assert_eq!(cell.to_string().parse::<Cell>(), Ok(cell));
    }
}
