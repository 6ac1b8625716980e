//! Column buffer — the rolling symbol strip behind one reel

use crate::rng::SymbolRng;
use crate::symbols::Symbol;

/// Hidden cells kept below the visible rows
pub const BUFFER_PADDING: usize = 2;

/// Fixed-length rolling symbol sequence. Index 0 is the top visible row.
///
/// The length is fixed at construction (boxed slice, never resized); the only
/// mutation drops the head and appends a fresh symbol at the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBuffer {
    cells: Box<[Symbol]>,
}

impl ColumnBuffer {
    /// Buffer for `rows` visible rows (`rows + BUFFER_PADDING` cells), filled from `rng`
    pub fn for_rows(rows: usize, rng: &mut dyn SymbolRng) -> Self {
        let len = rows + BUFFER_PADDING;
        let cells: Vec<Symbol> = (0..len).map(|_| rng.next_symbol()).collect();
        Self {
            cells: cells.into_boxed_slice(),
        }
    }

    /// Buffer with explicit contents
    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        Self {
            cells: symbols.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop the head, append `rng.next_symbol()` at the tail. Returns the new symbol.
    pub fn shift_up(&mut self, rng: &mut dyn SymbolRng) -> Symbol {
        let next = rng.next_symbol();
        if let Some(last) = self.cells.len().checked_sub(1) {
            self.cells.copy_within(1.., 0);
            self.cells[last] = next;
        }
        next
    }

    /// First `n` entries (clamped to the buffer length), no mutation
    pub fn top_rows(&self, n: usize) -> &[Symbol] {
        &self.cells[..n.min(self.cells.len())]
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.cells.get(index).copied()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.cells
    }
}
