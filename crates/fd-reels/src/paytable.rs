//! Paylines and win evaluation
//!
//! A line wins when its three cells hold the same symbol. No wilds, no
//! weighting, no payouts: the result is simply the set of winning lines.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::symbols::Symbol;

/// Grid coordinate: (row, col)
pub type Cell = (usize, usize);

/// Payline shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaylineKind {
    Horizontal,
    Diagonal,
    Vertical,
}

/// A payline definition: three cells checked for equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: u8,
    pub kind: PaylineKind,
    pub cells: [Cell; 3],
}

impl Payline {
    /// Full row across the three reels
    pub fn horizontal(index: u8, row: usize) -> Self {
        Self {
            index,
            kind: PaylineKind::Horizontal,
            cells: [(row, 0), (row, 1), (row, 2)],
        }
    }

    /// Three stacked cells on one reel, starting at `top`
    pub fn vertical(index: u8, col: usize, top: usize) -> Self {
        Self {
            index,
            kind: PaylineKind::Vertical,
            cells: [(top, col), (top + 1, col), (top + 2, col)],
        }
    }

    pub fn diagonal(index: u8, cells: [Cell; 3]) -> Self {
        Self {
            index,
            kind: PaylineKind::Diagonal,
            cells,
        }
    }

    /// Symbols under this line, `None` if a cell falls outside the grid
    pub fn symbols(&self, grid: &Grid) -> Option<[Symbol; 3]> {
        let [a, b, c] = self.cells;
        Some([
            grid.get(a.0, a.1)?,
            grid.get(b.0, b.1)?,
            grid.get(c.0, c.1)?,
        ])
    }

    /// Strict three-way equality
    pub fn is_win(&self, grid: &Grid) -> bool {
        matches!(self.symbols(grid), Some([a, b, c]) if a == b && b == c)
    }
}

/// The fixed line set, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaylineSet {
    lines: Vec<Payline>,
}

impl PaylineSet {
    /// 14 lines for the 4-row × 3-reel cabinet:
    /// 4 horizontals, 4 diagonals, 2 verticals per reel
    pub fn standard_4x3() -> Self {
        let mut lines = Vec::with_capacity(14);

        for row in 0..4 {
            lines.push(Payline::horizontal(lines.len() as u8, row));
        }

        let diagonals: [[Cell; 3]; 4] = [
            [(0, 0), (1, 1), (2, 2)],
            [(1, 0), (2, 1), (3, 2)],
            [(2, 0), (1, 1), (0, 2)],
            [(3, 0), (2, 1), (1, 2)],
        ];
        for cells in diagonals {
            lines.push(Payline::diagonal(lines.len() as u8, cells));
        }

        for col in 0..3 {
            for top in 0..2 {
                lines.push(Payline::vertical(lines.len() as u8, col, top));
            }
        }

        Self { lines }
    }

    pub fn lines(&self) -> &[Payline] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&Payline> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every winning line, in index order. Overlapping wins are all reported.
    pub fn evaluate(&self, grid: &Grid) -> Vec<Payline> {
        self.lines.iter().filter(|l| l.is_win(grid)).copied().collect()
    }
}

impl Default for PaylineSet {
    fn default() -> Self {
        Self::standard_4x3()
    }
}
