//! Round module - one placement countdown followed by one flow playback
//!
//! This module ties together the grid, the supply queue, the RNG, flow
//! traversal and scoring. Phases:
//!
//! - **Placing**: the countdown runs and placements are accepted
//! - **Paused**: the countdown is frozen and placements are rejected
//! - **Flowing**: the path has been traced; one step is revealed per `flow_step_ms`
//! - **Finished**: every step is revealed and the score is final
//!
//! Call [`Round::tick`] every frame with the elapsed time.

use std::fmt;

use arrayvec::ArrayVec;
use tracing::{error, info};

use crate::config::{ConfigError, GameConfig};
use crate::flow::{trace_from_start, FlowEnd, FlowError, FlowPath, FlowStep};
use crate::grid::{GridError, GridOccupancy};
use crate::place::{try_place, PlaceError};
use crate::queue::SupplyQueue;
use crate::rng::{RandomSource, SimpleRng};
use crate::scoring::{score_path, ScoreResult};
use crate::tile::Tile;
use crate::types::{Direction, GridCell, Orientation, TileVariant, COUNTDOWN_STEP_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Placing,
    Paused,
    Flowing,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Placing => "placing",
            Phase::Paused => "paused",
            Phase::Flowing => "flowing",
            Phase::Finished => "finished",
        }
    }
}

/// Something observers may want to animate or report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    TilePlaced(Tile),
    CountdownTick { remaining_secs: u32 },
    Paused,
    Resumed,
    FlowStarted { steps: usize },
    FlowAdvanced(FlowStep),
    FlowFinished { end: Option<FlowEnd>, score: u32 },
}

/// Errors from building a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    Config(ConfigError),
    Grid(GridError),
    /// Custom endpoints must be a `start` and a `stop` tile
    WrongEndpoint(TileVariant),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Config(e) => write!(f, "invalid config: {}", e),
            SetupError::Grid(e) => write!(f, "cannot place endpoint: {}", e),
            SetupError::WrongEndpoint(v) => write!(f, "{} tile cannot be used as an endpoint", v),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<ConfigError> for SetupError {
    fn from(value: ConfigError) -> Self {
        SetupError::Config(value)
    }
}

impl From<GridError> for SetupError {
    fn from(value: GridError) -> Self {
        SetupError::Grid(value)
    }
}

/// Orientations of a single-edge tile at `cell` whose open edge points into the grid
pub fn inward_orientations(grid: &GridOccupancy, cell: GridCell) -> ArrayVec<Orientation, 4> {
    Direction::ALL
        .into_iter()
        .filter(|&d| grid.in_bounds(cell.step(d)))
        .map(Orientation::facing)
        .collect()
}

/// Place `start` and `stop` on distinct random cells, each facing into the grid
pub fn place_endpoints<R: RandomSource>(
    grid: &mut GridOccupancy,
    rng: &mut R,
) -> Result<(Tile, Tile), SetupError> {
    let mut free: Vec<GridCell> = grid.all_cells().filter(|&c| !grid.is_occupied(c)).collect();
    if free.len() < 2 {
        return Err(SetupError::Config(ConfigError::GridTooSmall));
    }

    let mut endpoints = ArrayVec::<Tile, 2>::new();
    for variant in [TileVariant::Start, TileVariant::Stop] {
        let idx = rng.next_range(free.len() as u32) as usize;
        let cell = free.remove(idx);
        let orientations = inward_orientations(grid, cell);
        let orientation = *rng
            .pick(&orientations)
            .ok_or(SetupError::Config(ConfigError::GridTooSmall))?;
        let tile = Tile::new(variant, orientation, cell);
        grid.place(cell, tile)?;
        endpoints.push(tile);
    }

    Ok((endpoints[0], endpoints[1]))
}

/// Complete round state
#[derive(Debug, Clone)]
pub struct Round {
    config: GameConfig,
    grid: GridOccupancy,
    queue: SupplyQueue,
    rng: SimpleRng,
    seed: u32,
    /// Monotonic id (increments on restart)
    round_id: u32,
    phase: Phase,
    countdown_ms: u32,
    path: Option<FlowPath>,
    revealed: usize,
    flow_timer_ms: u32,
    score: ScoreResult,
    events: Vec<RoundEvent>,
}

impl Round {
    /// Create a round with random start/stop placement
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, SetupError> {
        let mut round = Self::empty(config, seed)?;
        place_endpoints(&mut round.grid, &mut round.rng)?;
        round.log_setup();
        Ok(round)
    }

    /// Create a round with fixed endpoints (scripted levels and tests)
    pub fn with_endpoints(
        config: GameConfig,
        seed: u32,
        start: Tile,
        stop: Tile,
    ) -> Result<Self, SetupError> {
        if start.variant != TileVariant::Start {
            return Err(SetupError::WrongEndpoint(start.variant));
        }
        if stop.variant != TileVariant::Stop {
            return Err(SetupError::WrongEndpoint(stop.variant));
        }
        let mut round = Self::empty(config, seed)?;
        round.grid.place(start.cell, start)?;
        round.grid.place(stop.cell, stop)?;
        round.log_setup();
        Ok(round)
    }

    fn empty(config: GameConfig, seed: u32) -> Result<Self, SetupError> {
        config.validate()?;
        let mut rng = SimpleRng::new(seed);
        let mut queue = SupplyQueue::new(config.queue_target_len, &config.drawable_variants)?;
        queue.refill(&mut rng);

        Ok(Self {
            grid: GridOccupancy::new(config.grid_columns, config.grid_rows),
            queue,
            rng,
            seed,
            round_id: 0,
            phase: Phase::Placing,
            countdown_ms: config.countdown_ms(),
            path: None,
            revealed: 0,
            flow_timer_ms: 0,
            score: ScoreResult::default(),
            events: Vec::new(),
            config,
        })
    }

    fn log_setup(&self) {
        let start = self.grid.start_tile().map(|t| t.cell);
        let stop = self.grid.stop_tile().map(|t| t.cell);
        info!(
            round_id = self.round_id,
            seed = self.seed,
            columns = self.config.grid_columns,
            rows = self.config.grid_rows,
            ?start,
            ?stop,
            "round ready"
        );
    }

    /// Discard everything and set up a fresh round
    pub fn restart(&mut self, seed: u32) -> Result<(), SetupError> {
        let round_id = self.round_id.wrapping_add(1);
        let mut fresh = Self::empty(self.config.clone(), seed)?;
        place_endpoints(&mut fresh.grid, &mut fresh.rng)?;
        fresh.round_id = round_id;
        *self = fresh;
        self.log_setup();
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridOccupancy {
        &self.grid
    }

    pub fn queue(&self) -> &SupplyQueue {
        &self.queue
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn round_id(&self) -> u32 {
        self.round_id
    }

    /// Whole seconds left on the countdown, rounded up
    pub fn remaining_secs(&self) -> u32 {
        self.countdown_ms.div_ceil(COUNTDOWN_STEP_MS)
    }

    pub fn remaining_ms(&self) -> u32 {
        self.countdown_ms
    }

    pub fn path(&self) -> Option<&FlowPath> {
        self.path.as_ref()
    }

    /// Steps already played back
    pub fn revealed_steps(&self) -> &[FlowStep] {
        match &self.path {
            Some(path) => &path.steps[..self.revealed],
            None => &[],
        }
    }

    pub fn score(&self) -> ScoreResult {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Place the queue head at `cell`
    pub fn place(&mut self, cell: GridCell) -> Result<Tile, PlaceError> {
        if self.phase != Phase::Placing {
            return Err(PlaceError::NotPlacing);
        }
        let tile = try_place(cell, &mut self.queue, &mut self.grid, &mut self.rng)?;
        self.events.push(RoundEvent::TilePlaced(tile));
        Ok(tile)
    }

    /// Toggle between placing and paused; returns false in other phases
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Placing => {
                self.phase = Phase::Paused;
                self.events.push(RoundEvent::Paused);
            }
            Phase::Paused => {
                self.phase = Phase::Placing;
                self.events.push(RoundEvent::Resumed);
            }
            Phase::Flowing | Phase::Finished => return false,
        }
        info!(phase = self.phase.as_str(), "pause toggled");
        true
    }

    /// Skip the rest of the countdown. Returns `Ok(false)` if the flow already started.
    pub fn start_flow(&mut self) -> Result<bool, FlowError> {
        if !matches!(self.phase, Phase::Placing | Phase::Paused) {
            return Ok(false);
        }
        let path = trace_from_start(&self.grid)?;
        self.countdown_ms = 0;
        self.events.push(RoundEvent::FlowStarted { steps: path.len() });
        self.path = Some(path);
        self.revealed = 0;
        self.flow_timer_ms = 0;
        self.phase = Phase::Flowing;
        info!(round_id = self.round_id, "flow started");
        Ok(true)
    }

    /// Advance time. Returns true if anything observable changed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        match self.phase {
            Phase::Placing => self.tick_countdown(elapsed_ms),
            Phase::Flowing => self.tick_flow(elapsed_ms),
            Phase::Paused | Phase::Finished => false,
        }
    }

    fn tick_countdown(&mut self, elapsed_ms: u32) -> bool {
        let before = self.remaining_secs();
        self.countdown_ms = self.countdown_ms.saturating_sub(elapsed_ms);
        let after = self.remaining_secs();
        if after < before {
            self.events.push(RoundEvent::CountdownTick {
                remaining_secs: after,
            });
        }

        if self.countdown_ms == 0 {
            if let Err(err) = self.start_flow() {
                error!(code = err.code(), "cannot start flow: {}", err);
                self.finish();
            }
            return true;
        }
        after < before
    }

    fn tick_flow(&mut self, elapsed_ms: u32) -> bool {
        let total = self.path.as_ref().map_or(0, |p| p.len());
        let step_ms = self.config.flow_step_ms;
        let before = self.revealed;

        if step_ms == 0 {
            self.revealed = total;
        } else {
            self.flow_timer_ms = self.flow_timer_ms.saturating_add(elapsed_ms);
            while self.revealed < total && self.flow_timer_ms >= step_ms {
                self.flow_timer_ms -= step_ms;
                self.revealed += 1;
            }
        }

        if let Some(path) = &self.path {
            for step in &path.steps[before..self.revealed] {
                self.events.push(RoundEvent::FlowAdvanced(*step));
            }
        }

        if self.revealed >= total {
            self.finish();
            return true;
        }
        self.revealed != before
    }

    fn finish(&mut self) {
        self.score = self.path.as_ref().map(score_path).unwrap_or_default();
        let end = self.path.as_ref().map(|p| p.end);
        self.phase = Phase::Finished;
        self.events.push(RoundEvent::FlowFinished {
            end,
            score: self.score.total,
        });
        info!(
            round_id = self.round_id,
            end = end.map_or("none", |e| e.as_str()),
            score = self.score.total,
            "round finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edges, QueuedTile, PIPE_STEP_SCORE, STOP_BONUS};

    fn small_config() -> GameConfig {
        GameConfig {
            grid_columns: 4,
            grid_rows: 3,
            countdown_secs: 2,
            flow_step_ms: 100,
            ..GameConfig::default()
        }
    }

    #[test]
    fn setup_places_distinct_inward_endpoints() {
        for seed in 1..200 {
            let round = Round::new(GameConfig::default(), seed).unwrap();
            let grid = round.grid();
            let start = grid.start_tile().copied().unwrap();
            let stop = grid.stop_tile().copied().unwrap();

            assert_ne!(start.cell, stop.cell);
            assert_eq!(grid.len(), 2);
            for tile in [start, stop] {
                let edges: Edges = tile.edges();
                let open = Direction::ALL.into_iter().find(|&d| edges.is_open(d)).unwrap();
                assert!(grid.in_bounds(tile.cell.step(open)), "seed {} faces off-grid", seed);
            }
        }
    }

    #[test]
    fn inward_orientations_in_corner() {
        let grid = GridOccupancy::new(10, 8);
        let corner = inward_orientations(&grid, GridCell::new(0, 0));
        assert_eq!(corner.as_slice(), &[Orientation::Deg90, Orientation::Deg180]);

        let far = inward_orientations(&grid, GridCell::new(9, 7));
        assert_eq!(far.as_slice(), &[Orientation::Deg0, Orientation::Deg270]);

        let middle = inward_orientations(&grid, GridCell::new(4, 4));
        assert_eq!(middle.len(), 4);
    }

    #[test]
    fn two_cell_grid_still_sets_up() {
        let config = GameConfig {
            grid_columns: 2,
            grid_rows: 1,
            ..GameConfig::default()
        };
        let round = Round::new(config, 5).unwrap();
        assert_eq!(round.grid().len(), 2);
    }

    #[test]
    fn same_seed_same_setup() {
        let a = Round::new(GameConfig::default(), 77).unwrap();
        let b = Round::new(GameConfig::default(), 77).unwrap();
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.queue(), b.queue());
    }

    #[test]
    fn countdown_emits_ticks_then_starts_flow() {
        let mut round = Round::new(small_config(), 3).unwrap();
        assert_eq!(round.remaining_secs(), 2);

        assert!(!round.tick(400));
        assert!(round.tick(700));
        assert_eq!(round.remaining_secs(), 1);
        assert!(round.tick(900));
        assert_eq!(round.phase(), Phase::Flowing);

        let events = round.take_events();
        assert_eq!(
            events[..2],
            [
                RoundEvent::CountdownTick { remaining_secs: 1 },
                RoundEvent::CountdownTick { remaining_secs: 0 },
            ]
        );
        assert!(matches!(events[2], RoundEvent::FlowStarted { .. }));
    }

    #[test]
    fn paused_round_rejects_placement_and_freezes_countdown() {
        let mut round = Round::new(small_config(), 3).unwrap();
        assert!(round.toggle_pause());
        assert_eq!(round.phase(), Phase::Paused);

        let free = round.grid().all_cells().find(|&c| !round.grid().is_occupied(c)).unwrap();
        assert_eq!(round.place(free), Err(PlaceError::NotPlacing));
        assert!(!round.tick(5000));
        assert_eq!(round.remaining_secs(), 2);

        assert!(round.toggle_pause());
        assert_eq!(round.phase(), Phase::Placing);
    }

    #[test]
    fn flow_plays_back_one_step_per_interval() {
        let config = small_config();
        let start = Tile::new(TileVariant::Start, Orientation::Deg90, GridCell::new(0, 0));
        let stop = Tile::new(TileVariant::Stop, Orientation::Deg270, GridCell::new(3, 0));
        let mut round = Round::with_endpoints(config, 1, start, stop).unwrap();

        // Force two horizontal straights regardless of the queue contents.
        round.queue.clear();
        round.queue.push(crate::types::QueuedTile::new(TileVariant::Straight, Orientation::Deg90));
        round.queue.push(crate::types::QueuedTile::new(TileVariant::Straight, Orientation::Deg270));
        round.place(GridCell::new(1, 0)).unwrap();
        round.place(GridCell::new(2, 0)).unwrap();

        assert_eq!(round.start_flow(), Ok(true));
        assert_eq!(round.path().unwrap().len(), 3);

        round.tick(150);
        assert_eq!(round.revealed_steps().len(), 1);
        round.tick(50);
        assert_eq!(round.revealed_steps().len(), 2);
        round.tick(100);
        assert!(round.is_finished());
        assert!(round.path().unwrap().end.is_success());
        assert_eq!(round.score().total, 2 * 10 + 100);

        // Finished rounds ignore further input.
        assert!(!round.tick(1000));
        assert_eq!(round.start_flow(), Ok(false));
        assert!(!round.toggle_pause());
    }

    #[test]
    fn full_column_reaches_stop_for_bonus() {
        let config = GameConfig {
            grid_columns: 6,
            grid_rows: 6,
            flow_step_ms: 250,
            ..small_config()
        };
        let start = Tile::new(TileVariant::Start, Orientation::Deg180, GridCell::new(2, 0));
        let stop = Tile::new(TileVariant::Stop, Orientation::Deg0, GridCell::new(2, 5));
        let mut round = Round::with_endpoints(config, 3, start, stop).unwrap();

        round.queue.clear();
        // Vertical straights only, whatever the seed would have drawn.
        for orientation in [Orientation::Deg0, Orientation::Deg180].repeat(2) {
            round.queue.push(QueuedTile::new(TileVariant::Straight, orientation));
        }
        for row in 1..5 {
            round.place(GridCell::new(2, row)).unwrap();
        }

        round.start_flow().unwrap();
        while !round.is_finished() {
            round.tick(250);
        }

        let path = round.path().unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(
            path.end,
            FlowEnd::ReachedStop {
                cell: GridCell::new(2, 5),
                entry: Some(Direction::Top),
            }
        );
        assert_eq!(round.revealed_steps().len(), 5);
        assert_eq!(round.score().total, 4 * PIPE_STEP_SCORE + STOP_BONUS);
    }

    #[test]
    fn restart_bumps_round_id_and_resets_state() {
        let mut round = Round::new(small_config(), 3).unwrap();
        round.start_flow().unwrap();
        round.restart(4).unwrap();

        assert_eq!(round.round_id(), 1);
        assert_eq!(round.seed(), 4);
        assert_eq!(round.phase(), Phase::Placing);
        assert_eq!(round.grid().len(), 2);
        assert_eq!(round.queue().len(), 5);
        assert!(round.path().is_none());
    }

    #[test]
    fn with_endpoints_rejects_wrong_variants() {
        let t = Tile::new(TileVariant::Straight, Orientation::Deg0, GridCell::new(0, 0));
        let stop = Tile::new(TileVariant::Stop, Orientation::Deg0, GridCell::new(1, 1));
        let err = Round::with_endpoints(small_config(), 1, t, stop).unwrap_err();
        assert_eq!(err, SetupError::WrongEndpoint(TileVariant::Straight));
    }
}
