use crate::flow::{FlowEnd, FlowStep};
use crate::round::{Phase, Round};
use crate::tile::Tile;
use crate::types::QueuedTile;

/// Owned copy of everything an observer needs to draw a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub round_id: u32,
    pub seed: u32,
    pub phase: Phase,
    pub columns: u8,
    pub rows: u8,
    pub tile_size: u16,
    /// Placed tiles in row-major order
    pub tiles: Vec<Tile>,
    /// Supply queue, head first
    pub queue: Vec<QueuedTile>,
    pub remaining_secs: u32,
    pub revealed: Vec<FlowStep>,
    pub end: Option<FlowEnd>,
    pub score: u32,
}

impl RoundSnapshot {
    pub fn placing(&self) -> bool {
        self.phase == Phase::Placing
    }
}

impl Round {
    pub fn snapshot(&self) -> RoundSnapshot {
        let end = if self.is_finished() {
            self.path().map(|p| p.end)
        } else {
            None
        };

        RoundSnapshot {
            round_id: self.round_id(),
            seed: self.seed(),
            phase: self.phase(),
            columns: self.grid().columns(),
            rows: self.grid().rows(),
            tile_size: self.config().tile_size,
            tiles: self.grid().tiles().copied().collect(),
            queue: self.queue().peek_all().copied().collect(),
            remaining_secs: self.remaining_secs(),
            revealed: self.revealed_steps().to_vec(),
            end,
            score: self.score().total,
        }
    }
}
