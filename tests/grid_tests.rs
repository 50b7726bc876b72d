//! Grid occupancy tests

use pipeworks::core::{GridError, GridOccupancy, Tile};
use pipeworks::types::{GridCell, Orientation, TileVariant, GRID_COLUMNS, GRID_ROWS};

fn straight() -> Tile {
    Tile::new(TileVariant::Straight, Orientation::Deg0, GridCell::new(0, 0))
}

#[test]
fn test_grid_new_empty() {
    let grid = GridOccupancy::new(GRID_COLUMNS, GRID_ROWS);
    assert_eq!(grid.area(), 80);
    assert!(grid.is_empty());
    for cell in grid.all_cells() {
        assert!(grid.in_bounds(cell));
        assert!(!grid.is_occupied(cell), "cell {} should be free", cell);
    }
}

#[test]
fn test_bounds_are_half_open() {
    let grid = GridOccupancy::new(GRID_COLUMNS, GRID_ROWS);

    assert!(grid.in_bounds(GridCell::new(0, 0)));
    assert!(grid.in_bounds(GridCell::new(9, 7)));
    assert!(!grid.in_bounds(GridCell::new(10, 0)));
    assert!(!grid.in_bounds(GridCell::new(0, 8)));
    assert!(!grid.in_bounds(GridCell::new(-1, 3)));
}

#[test]
fn test_place_then_occupied() {
    let mut grid = GridOccupancy::new(GRID_COLUMNS, GRID_ROWS);
    let cell = GridCell::new(4, 5);

    grid.place(cell, straight()).unwrap();
    assert!(grid.is_occupied(cell));
    assert_eq!(grid.get(cell).map(|t| t.cell), Some(cell));
    assert_eq!(grid.place(cell, straight()), Err(GridError::CellOccupied));
    assert_eq!(grid.len(), 1);
}

#[test]
fn test_place_out_of_bounds_is_rejected() {
    let mut grid = GridOccupancy::new(3, 3);
    assert_eq!(
        grid.place(GridCell::new(3, 0), straight()),
        Err(GridError::OutOfBounds)
    );
    assert!(grid.is_empty());
}

#[test]
fn test_clear_resets_everything() {
    let mut grid = GridOccupancy::new(3, 3);
    grid.place(GridCell::new(1, 1), straight()).unwrap();
    grid.place(
        GridCell::new(2, 2),
        Tile::new(TileVariant::Start, Orientation::Deg0, GridCell::new(2, 2)),
    )
    .unwrap();
    assert!(grid.start_tile().is_some());

    grid.clear();
    assert!(grid.is_empty());
    assert!(grid.start_tile().is_none());
    assert_eq!(grid.tiles().count(), 0);
}
