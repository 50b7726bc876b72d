//! Grid module - tracks which cells hold a placed tile
//!
//! The grid is `columns x rows`; each cell is empty or holds exactly one tile.
//! Uses a flat vector for cache locality, row-major (row * columns + col).
//! Coordinates: (col, row) where col grows left to right and row grows top to bottom.

use std::fmt;

use crate::tile::Tile;
use crate::types::{GridCell, TileVariant};

/// Errors raised by direct occupancy mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    OutOfBounds,
    CellOccupied,
}

impl GridError {
    pub fn code(self) -> &'static str {
        match self {
            GridError::OutOfBounds => "out_of_bounds",
            GridError::CellOccupied => "cell_occupied",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            GridError::OutOfBounds => "cell lies outside the grid",
            GridError::CellOccupied => "cell already holds a tile",
        }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for GridError {}

/// Occupancy store keyed by discrete cell coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct GridOccupancy {
    columns: u8,
    rows: u8,
    /// Flat vector of cells, row-major order
    cells: Vec<Option<Tile>>,
    filled: usize,
}

impl GridOccupancy {
    /// Create an empty grid
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; columns as usize * rows as usize],
            filled: 0,
        }
    }

    /// Calculate flat index from a cell, `None` when outside the grid
    #[inline(always)]
    pub(crate) fn index(&self, cell: GridCell) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(cell.row as usize * self.columns as usize + cell.col as usize)
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells holding a tile
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && cell.col < self.columns as i16
            && cell.row < self.rows as i16
    }

    /// Check if a cell holds a tile; out-of-bounds cells are never occupied
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.get(cell).is_some()
    }

    /// Get the tile at a cell
    pub fn get(&self, cell: GridCell) -> Option<&Tile> {
        self.index(cell).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Record a tile at `cell`.
    ///
    /// The tile is stored with `cell` as its position regardless of `tile.cell`.
    pub fn place(&mut self, cell: GridCell, tile: Tile) -> Result<(), GridError> {
        let idx = self.index(cell).ok_or(GridError::OutOfBounds)?;
        if self.cells[idx].is_some() {
            return Err(GridError::CellOccupied);
        }
        self.cells[idx] = Some(Tile { cell, ..tile });
        self.filled += 1;
        Ok(())
    }

    /// Iterate placed tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().filter_map(|c| c.as_ref())
    }

    /// Iterate every in-bounds cell in row-major order
    pub fn all_cells(&self) -> impl Iterator<Item = GridCell> {
        let columns = self.columns as i16;
        let rows = self.rows as i16;
        (0..rows).flat_map(move |row| (0..columns).map(move |col| GridCell::new(col, row)))
    }

    /// First tile of the given variant in row-major order
    pub fn find_variant(&self, variant: TileVariant) -> Option<&Tile> {
        self.tiles().find(|t| t.variant == variant)
    }

    pub fn start_tile(&self) -> Option<&Tile> {
        self.find_variant(TileVariant::Start)
    }

    pub fn stop_tile(&self) -> Option<&Tile> {
        self.find_variant(TileVariant::Stop)
    }

    /// Remove every tile
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
        self.filled = 0;
    }
}
