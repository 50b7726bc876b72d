//! Flow module - follows the ooze from the start tile through open pipes
//!
//! The traversal is a state machine over `(tile, entry)` where `entry` is the
//! side the flow came in through (`None` on the start tile). Each step picks an
//! exit with [`choose_exit`], emits a [`FlowStep`], and moves to the neighbour
//! on the other side of that exit.
//!
//! Termination:
//! - the current tile is a `stop` tile ([`FlowEnd::ReachedStop`])
//! - no legal exit exists ([`FlowEnd::DeadEnd`])
//! - the neighbour cell is empty ([`FlowEnd::Spill`]) or off the grid ([`FlowEnd::OffGrid`])
//! - the same `(cell, entry)` state comes around again ([`FlowEnd::Loop`])
//!
//! The last guard caps the walk at four states per cell, since a crossed tile
//! can legitimately be crossed once horizontally and once vertically.

use std::fmt;

use tracing::info;

use crate::grid::GridOccupancy;
use crate::tile::Tile;
use crate::types::{Direction, Edges, GridCell, TileVariant};

/// One tile crossed by the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowStep {
    pub tile: Tile,
    /// Side the flow came in through; `None` on the start tile
    pub entry: Option<Direction>,
    pub exit: Direction,
}

/// Why the traversal stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowEnd {
    ReachedStop {
        cell: GridCell,
        entry: Option<Direction>,
    },
    DeadEnd {
        cell: GridCell,
    },
    Spill {
        from: GridCell,
        direction: Direction,
    },
    OffGrid {
        from: GridCell,
        direction: Direction,
    },
    Loop {
        cell: GridCell,
        entry: Option<Direction>,
    },
}

impl FlowEnd {
    pub fn is_success(&self) -> bool {
        matches!(self, FlowEnd::ReachedStop { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowEnd::ReachedStop { .. } => "reached_stop",
            FlowEnd::DeadEnd { .. } => "dead_end",
            FlowEnd::Spill { .. } => "spill",
            FlowEnd::OffGrid { .. } => "off_grid",
            FlowEnd::Loop { .. } => "loop",
        }
    }

    /// Cell where the flow came to rest
    pub fn cell(&self) -> GridCell {
        match *self {
            FlowEnd::ReachedStop { cell, .. }
            | FlowEnd::DeadEnd { cell }
            | FlowEnd::Loop { cell, .. } => cell,
            FlowEnd::Spill { from, .. } | FlowEnd::OffGrid { from, .. } => from,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    StartTileMissing,
}

impl FlowError {
    pub fn code(self) -> &'static str {
        match self {
            FlowError::StartTileMissing => "start_tile_missing",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FlowError::StartTileMissing => "no start tile has been placed",
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for FlowError {}

/// Pick the side the flow leaves through.
///
/// Scans top, right, bottom, left and returns the first open side that is not
/// the entry side and either goes straight through or, when straight through
/// is closed, turns.
pub fn choose_exit(edges: Edges, entry: Option<Direction>) -> Option<Direction> {
    Direction::ALL.into_iter().find(|&d| {
        if !edges.is_open(d) || Some(d) == entry {
            return false;
        }
        match entry {
            None => true,
            Some(prev) => d == prev.opposite() || !edges.is_open(prev.opposite()),
        }
    })
}

const NO_ENTRY_BIT: u8 = 1 << 4;

fn state_bit(entry: Option<Direction>) -> u8 {
    entry.map_or(NO_ENTRY_BIT, |d| 1 << d.index())
}

/// Lazy iterator over the flow path
///
/// ```
/// use pipeworks_core::{GridOccupancy, Tile, Traversal};
/// use pipeworks_core::types::{GridCell, Orientation, TileVariant};
///
/// let mut grid = GridOccupancy::new(4, 4);
/// let start = Tile::new(TileVariant::Start, Orientation::Deg90, GridCell::new(0, 0));
/// grid.place(start.cell, start).unwrap();
///
/// let mut flow = Traversal::new(start, &grid);
/// assert_eq!(flow.by_ref().count(), 1);
/// assert_eq!(flow.end().unwrap().as_str(), "spill");
/// ```
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    grid: &'a GridOccupancy,
    current: Option<(Tile, Option<Direction>)>,
    /// Per-cell bitmask of entry sides already traversed
    visited: Vec<u8>,
    end: Option<FlowEnd>,
}

impl<'a> Traversal<'a> {
    pub fn new(start: Tile, grid: &'a GridOccupancy) -> Self {
        Self {
            grid,
            current: Some((start, None)),
            visited: vec![0; grid.area()],
            end: None,
        }
    }

    /// Termination reason, available once the iterator returned `None`
    pub fn end(&self) -> Option<FlowEnd> {
        self.end
    }

    fn finish(&mut self, end: FlowEnd) {
        self.current = None;
        self.end = Some(end);
    }
}

impl Iterator for Traversal<'_> {
    type Item = FlowStep;

    fn next(&mut self) -> Option<FlowStep> {
        let (tile, entry) = self.current.take()?;

        if tile.variant == TileVariant::Stop {
            self.finish(FlowEnd::ReachedStop {
                cell: tile.cell,
                entry,
            });
            return None;
        }

        if let Some(idx) = self.grid.index(tile.cell) {
            let bit = state_bit(entry);
            if self.visited[idx] & bit != 0 {
                self.finish(FlowEnd::Loop {
                    cell: tile.cell,
                    entry,
                });
                return None;
            }
            self.visited[idx] |= bit;
        }

        let Some(exit) = choose_exit(tile.edges(), entry) else {
            self.finish(FlowEnd::DeadEnd { cell: tile.cell });
            return None;
        };

        let step = FlowStep { tile, entry, exit };
        let next_cell = tile.cell.step(exit);

        if !self.grid.in_bounds(next_cell) {
            self.finish(FlowEnd::OffGrid {
                from: tile.cell,
                direction: exit,
            });
        } else {
            match self.grid.get(next_cell) {
                Some(next) => self.current = Some((*next, Some(exit.opposite()))),
                None => self.finish(FlowEnd::Spill {
                    from: tile.cell,
                    direction: exit,
                }),
            }
        }

        Some(step)
    }
}

/// A fully computed flow path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPath {
    pub steps: Vec<FlowStep>,
    pub end: FlowEnd,
}

impl FlowPath {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Exit directions in order, the sequence presentation layers animate
    pub fn exits(&self) -> impl Iterator<Item = Direction> + '_ {
        self.steps.iter().map(|s| s.exit)
    }
}

/// Run the traversal from `start` to completion
pub fn run_traversal(start: Tile, grid: &GridOccupancy) -> FlowPath {
    let mut traversal = Traversal::new(start, grid);
    let steps: Vec<FlowStep> = traversal.by_ref().collect();
    // The iterator only stops after recording an end.
    let end = traversal
        .end()
        .unwrap_or(FlowEnd::DeadEnd { cell: start.cell });

    info!(steps = steps.len(), end = end.as_str(), cell = %end.cell(), "flow traced");
    FlowPath { steps, end }
}

/// Locate the grid's start tile and run the traversal from it
pub fn trace_from_start(grid: &GridOccupancy) -> Result<FlowPath, FlowError> {
    let start = *grid.start_tile().ok_or(FlowError::StartTileMissing)?;
    Ok(run_traversal(start, grid))
}
