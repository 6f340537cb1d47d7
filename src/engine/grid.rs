//! The NxN tile grid
//!
//! Cells are stored row-major. A cell is either EMPTY or a power of two >= 2.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use crate::consts::{MAX_TILE, MIN_SIZE};
use crate::error::{GameError, Result};
use crate::is_tile_value;

/// Value of a cell with no tile
pub const EMPTY: u32 = 0;

/// Square grid of tile values
///
/// Serialized as a list of rows so stored snapshots stay human readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// An all-empty NxN grid
    pub fn new(size: usize) -> Result<Self> {
        if size < MIN_SIZE {
            return Err(GameError::GridTooSmall(size));
        }
        Ok(Self::empty(size))
    }

    pub(crate) fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![EMPTY; size * size],
        }
    }

    /// Build a grid from rows, checking shape and tile values
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self> {
        let size = rows.len();
        let mut grid = Self::new(size)?;
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(GameError::SizeMismatch {
                    expected: size,
                    found: values.len(),
                });
            }
            for (col, value) in values.into_iter().enumerate() {
                if value != EMPTY && !is_tile_value(value) {
                    return Err(GameError::InvalidTile { row, col, value });
                }
                grid.cells[row * size + col] = value;
            }
        }
        Ok(grid)
    }

    /// Side length
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at (row, col), or None when out of bounds
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row * self.size + col] = value;
    }

    /// Reset every cell to EMPTY
    pub(crate) fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Rows as slices, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.size)
    }

    /// Copy of the rows, for hosts that want an owned matrix
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(<[u32]>::to_vec).collect()
    }

    /// Cell coordinates of line `index`, ordered from the edge `dir` slides toward
    pub fn line_coords(&self, dir: Direction, index: usize) -> Vec<(usize, usize)> {
        let n = self.size;
        (0..n)
            .map(|k| {
                let along = if dir.toward_start() { k } else { n - 1 - k };
                if dir.is_horizontal() {
                    (index, along)
                } else {
                    (along, index)
                }
            })
            .collect()
    }

    /// Row-major coordinates of all empty cells
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == EMPTY)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == EMPTY).count()
    }

    pub fn count_tiles(&self) -> usize {
        self.cells.len() - self.count_empty()
    }

    /// Highest tile on the grid (EMPTY if the grid is empty)
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(EMPTY)
    }

    /// True if any move could change the grid
    ///
    /// Checking right and down neighbours covers every adjacent pair. A pair
    /// of `MAX_TILE`s cannot merge, so it does not count.
    pub fn can_move(&self) -> bool {
        if self.cells.contains(&EMPTY) {
            return true;
        }
        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let current = self.cells[row * n + col];
                if current >= MAX_TILE {
                    continue;
                }
                if col + 1 < n && self.cells[row * n + col + 1] == current {
                    return true;
                }
                if row + 1 < n && self.cells[(row + 1) * n + col] == current {
                    return true;
                }
            }
        }
        false
    }
}

impl TryFrom<Vec<Vec<u32>>> for Grid {
    type Error = GameError;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<u32>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().max(2).to_string().len();
        for row in self.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|&v| {
                    if v == EMPTY {
                        format!("{:>width$}", ".")
                    } else {
                        format!("{:>width$}", v)
                    }
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
