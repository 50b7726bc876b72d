//! Tile module - pipe variants and their edge geometry
//!
//! Every variant has a canonical open-edge set at 0°. Orientations rotate that
//! set clockwise one quarter turn at a time, so geometry is a pure lookup on
//! `(variant, orientation)` and never depends on where the tile sits.

use crate::types::{Direction, Edges, GridCell, Orientation, QueuedTile, TileVariant};

/// Open edges of a variant at 0°
pub fn canonical_edges(variant: TileVariant) -> Edges {
    match variant {
        // Openings top and bottom
        TileVariant::Straight => Edges::new(true, false, true, false),
        // Openings top and right
        TileVariant::Turn => Edges::new(true, true, false, false),
        // Closed on the left
        TileVariant::Tee => Edges::new(true, true, true, false),
        TileVariant::Crossed => Edges::OPEN,
        TileVariant::Blocked => Edges::CLOSED,
        TileVariant::Start | TileVariant::Stop => Edges::new(true, false, false, false),
    }
}

/// Open edges of a variant at the given orientation
pub fn edges_of(variant: TileVariant, orientation: Orientation) -> Edges {
    let mut edges = canonical_edges(variant);
    for _ in 0..orientation.quarter_turns() {
        edges = edges.rotate_cw();
    }
    edges
}

/// A tile placed on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub variant: TileVariant,
    pub orientation: Orientation,
    pub cell: GridCell,
}

impl Tile {
    pub fn new(variant: TileVariant, orientation: Orientation, cell: GridCell) -> Self {
        Self {
            variant,
            orientation,
            cell,
        }
    }

    /// Instantiate a queue entry at a cell
    pub fn from_queued(queued: QueuedTile, cell: GridCell) -> Self {
        Self::new(queued.variant, queued.orientation, cell)
    }

    #[inline]
    pub fn edges(&self) -> Edges {
        edges_of(self.variant, self.orientation)
    }

    #[inline]
    pub fn is_open(&self, dir: Direction) -> bool {
        self.edges().is_open(dir)
    }
}

/// True iff `a` is open towards `direction` and `b` is open on the facing side.
///
/// Tiles are not required to be adjacent; callers pair a tile with its neighbour.
pub fn connects(a: &Tile, b: &Tile, direction: Direction) -> bool {
    a.is_open(direction) && b.is_open(direction.opposite())
}
