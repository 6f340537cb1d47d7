//! Single-line slide and merge
//!
//! A line is handed over already ordered from the target edge outward, so the
//! same rule serves all four directions: index 0 is where tiles pile up.

use super::grid::EMPTY;
use crate::consts::MAX_TILE;

/// Result of sliding one line toward index 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSlide {
    /// New cell values, same length as the input, EMPTY-padded at the far end
    pub cells: Vec<u32>,
    /// Sum of every merged tile's new value
    pub score: u64,
    /// Largest value produced by a merge (0 if nothing merged)
    pub best_merge: u32,
}

impl LineSlide {
    /// Whether the slide changed any cell of `before`
    pub fn changed(&self, before: &[u32]) -> bool {
        self.cells.as_slice() != before
    }
}

/// Slide a line toward index 0, merging equal neighbours once each
///
/// Equal pairs merge left to right without overlap, so `[2, 2, 2, 2]` becomes
/// `[4, 4, 0, 0]`, and a freshly merged tile is never merged again in the same
/// slide: `[4, 4, 8, 0]` becomes `[8, 8, 0, 0]`. Tiles already at `MAX_TILE`
/// slide but never merge.
pub fn slide_line(line: &[u32]) -> LineSlide {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != EMPTY).collect();

    let mut cells = Vec::with_capacity(line.len());
    let mut score = 0u64;
    let mut best_merge = 0u32;

    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] && tiles[i] < MAX_TILE {
            let merged = tiles[i] * 2;
            score += u64::from(merged);
            best_merge = best_merge.max(merged);
            cells.push(merged);
            // The partner is consumed
            i += 2;
        } else {
            cells.push(tiles[i]);
            i += 1;
        }
    }
    cells.resize(line.len(), EMPTY);

    LineSlide {
        cells,
        score,
        best_merge,
    }
}
