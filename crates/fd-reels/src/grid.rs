//! Grid — read-only rows × cols view over the reel buffers

use serde::{Deserialize, Serialize};

use crate::reel::Reel;
use crate::symbols::Symbol;

/// Settled symbol matrix. Always derived from the reels, never stored as live state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major cells
    cells: Vec<Symbol>,
}

impl Grid {
    /// Build from the top `rows` entries of each reel's buffer.
    ///
    /// A buffer shorter than `rows` shrinks the grid to the shortest column.
    pub fn from_reels(reels: &[Reel], rows: usize) -> Self {
        let columns: Vec<&[Symbol]> = reels.iter().map(|r| r.visible(rows)).collect();
        let rows = columns.iter().map(|c| c.len()).min().unwrap_or(rows);
        let cols = columns.len();

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            cells.extend(columns.iter().map(|column| column[row]));
        }
        Self { rows, cols, cells }
    }

    /// Build from explicit rows (each inner vec is one row, left to right)
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> Self {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let row_count = rows.len();
        let cells: Vec<Symbol> = rows.into_iter().flatten().collect();
        debug_assert_eq!(cells.len(), row_count * cols, "ragged grid rows");
        Self {
            rows: row_count,
            cols,
            cells,
        }
    }

    /// Every cell holds `symbol`
    pub fn filled(rows: usize, cols: usize, symbol: Symbol) -> Self {
        Self {
            rows,
            cols,
            cells: vec![symbol; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Nested rows, top to bottom
    pub fn to_rows(&self) -> Vec<Vec<Symbol>> {
        if self.cols == 0 {
            return Vec::new();
        }
        self.cells.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    /// One text line per row using symbol glyphs
    pub fn to_text(&self) -> String {
        self.to_rows()
            .iter()
            .map(|row| row.iter().map(|s| s.glyph()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
