//! Place module - the single entry point for player placements

use std::fmt;

use tracing::debug;

use crate::grid::{GridError, GridOccupancy};
use crate::queue::SupplyQueue;
use crate::rng::RandomSource;
use crate::tile::Tile;
use crate::types::GridCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    OutOfBounds,
    CellOccupied,
    /// Nothing to place; callers treat this as a silent no-op
    QueueEmpty,
    /// The round is not accepting placements (paused, flowing, finished)
    NotPlacing,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::OutOfBounds => "out_of_bounds",
            PlaceError::CellOccupied => "cell_occupied",
            PlaceError::QueueEmpty => "queue_empty",
            PlaceError::NotPlacing => "not_placing",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::OutOfBounds => "target cell lies outside the grid",
            PlaceError::CellOccupied => "target cell already holds a tile",
            PlaceError::QueueEmpty => "no tile available to place",
            PlaceError::NotPlacing => "round is not in the placement phase",
        }
    }

    /// Whether the player should see this rejection at all
    pub fn is_benign(self) -> bool {
        matches!(self, PlaceError::QueueEmpty)
    }
}

impl fmt::Display for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PlaceError {}

impl From<GridError> for PlaceError {
    fn from(value: GridError) -> Self {
        match value {
            GridError::OutOfBounds => PlaceError::OutOfBounds,
            GridError::CellOccupied => PlaceError::CellOccupied,
        }
    }
}

/// Place the queue head at `cell`.
///
/// Checks run in order: bounds, occupancy, queue non-empty. A rejected call
/// leaves both `occupancy` and `queue` untouched. On success the head is
/// dequeued, recorded in `occupancy`, and only then is the queue refilled.
pub fn try_place<R: RandomSource>(
    cell: GridCell,
    queue: &mut SupplyQueue,
    occupancy: &mut GridOccupancy,
    rng: &mut R,
) -> Result<Tile, PlaceError> {
    if !occupancy.in_bounds(cell) {
        debug!(%cell, "placement rejected: out of bounds");
        return Err(PlaceError::OutOfBounds);
    }
    if occupancy.is_occupied(cell) {
        debug!(%cell, "placement rejected: cell occupied");
        return Err(PlaceError::CellOccupied);
    }
    let Some(next) = queue.peek() else {
        return Err(PlaceError::QueueEmpty);
    };

    let tile = Tile::from_queued(next, cell);
    occupancy.place(cell, tile)?;
    queue.dequeue();
    queue.refill(rng);

    debug!(%cell, variant = %tile.variant, degrees = tile.orientation.degrees(), "tile placed");
    Ok(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::DrawPolicy;
    use crate::rng::SimpleRng;
    use crate::types::{Orientation, QueuedTile, TileVariant};

    fn setup() -> (SupplyQueue, GridOccupancy, SimpleRng) {
        let mut rng = SimpleRng::new(1);
        let mut queue = SupplyQueue::new(5, DrawPolicy::Classic.variants()).unwrap();
        queue.refill(&mut rng);
        (queue, GridOccupancy::new(10, 8), rng)
    }

    #[test]
    fn place_consumes_head_and_refills() {
        let (mut queue, mut grid, mut rng) = setup();
        let head = queue.peek().unwrap();
        let second = queue.peek_all().nth(1).copied().unwrap();

        let tile = try_place(GridCell::new(3, 3), &mut queue, &mut grid, &mut rng).unwrap();

        assert_eq!(tile.variant, head.variant);
        assert_eq!(tile.orientation, head.orientation);
        assert_eq!(tile.cell, GridCell::new(3, 3));
        assert_eq!(grid.get(GridCell::new(3, 3)), Some(&tile));
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.peek(), Some(second));
    }

    #[test]
    fn place_rejected_when_out_of_bounds() {
        let (mut queue, mut grid, mut rng) = setup();
        let before = queue.clone();

        for cell in [GridCell::new(-1, 0), GridCell::new(10, 0), GridCell::new(0, 8)] {
            let err = try_place(cell, &mut queue, &mut grid, &mut rng).unwrap_err();
            assert_eq!(err, PlaceError::OutOfBounds);
        }
        assert_eq!(queue, before);
        assert!(grid.is_empty());
    }

    #[test]
    fn bounds_checked_before_empty_queue() {
        let (mut queue, _, _) = setup();
        queue.clear();
        let mut grid = GridOccupancy::new(2, 2);
        let err = try_place(GridCell::new(5, 5), &mut queue, &mut grid, &mut SimpleRng::new(1))
            .unwrap_err();
        assert_eq!(err, PlaceError::OutOfBounds);
    }

    #[test]
    fn occupied_checked_before_empty_queue() {
        let mut queue = SupplyQueue::new(1, &[TileVariant::Turn]).unwrap();
        queue.push(QueuedTile::new(TileVariant::Turn, Orientation::Deg0));
        let mut grid = GridOccupancy::new(2, 2);
        let mut rng = SimpleRng::new(1);

        try_place(GridCell::new(0, 0), &mut queue, &mut grid, &mut rng).unwrap();
        queue.clear();

        let err = try_place(GridCell::new(0, 0), &mut queue, &mut grid, &mut rng).unwrap_err();
        assert_eq!(err, PlaceError::CellOccupied);
    }

    #[test]
    fn drained_queue_reports_queue_empty() {
        let (mut queue, mut grid, mut rng) = setup();
        queue.clear();

        let err = try_place(GridCell::new(1, 1), &mut queue, &mut grid, &mut rng).unwrap_err();
        assert_eq!(err, PlaceError::QueueEmpty);
        assert!(grid.is_empty());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(PlaceError::OutOfBounds.code(), "out_of_bounds");
        assert_eq!(PlaceError::CellOccupied.code(), "cell_occupied");
        assert_eq!(PlaceError::QueueEmpty.code(), "queue_empty");
        assert!(PlaceError::QueueEmpty.is_benign());
        assert!(!PlaceError::CellOccupied.is_benign());
    }
}
