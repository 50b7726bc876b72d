//! Core puzzle logic - pure, deterministic, and testable
//!
//! This crate contains the pipe geometry, grid rules, supply queue, placement
//! validation, flow traversal and round lifecycle. It has **zero dependencies**
//! on rendering, networking, or I/O:
//!
//! - **Deterministic**: the same seed produces the same setup and queue
//! - **Testable**: every random decision goes through an injectable [`RandomSource`]
//! - **Portable**: any front end can drive it (terminal, GUI, headless protocol)
//!
//! # Module Structure
//!
//! - [`tile`]: tile variants, edge geometry per orientation, `connects`
//! - [`grid`]: occupancy store keyed by grid cell
//! - [`rng`]: random source trait and seeded LCG
//! - [`queue`]: supply queue and its refill policy
//! - [`place`]: the placement validator
//! - [`flow`]: flow traversal from the start tile
//! - [`scoring`]: points for a finished flow
//! - [`round`]: countdown, pause, flow playback and restart
//! - [`config`]: the configuration bundle
//! - [`snapshot`]: owned view of a round for observers
//!
//! # Example
//!
//! ```
//! use pipeworks_core::{GameConfig, Phase, Round};
//! use pipeworks_core::types::GridCell;
//!
//! let mut round = Round::new(GameConfig::default(), 12345).unwrap();
//!
//! // Place the queue head somewhere free
//! let free = round
//!     .grid()
//!     .all_cells()
//!     .find(|&c| !round.grid().is_occupied(c))
//!     .unwrap();
//! round.place(free).unwrap();
//! assert_eq!(round.queue().len(), 5);
//!
//! // Let the countdown run out
//! round.tick(30_000);
//! assert_eq!(round.phase(), Phase::Flowing);
//! ```

pub mod config;
pub mod flow;
pub mod grid;
pub mod place;
pub mod queue;
pub mod rng;
pub mod round;
pub mod scoring;
pub mod snapshot;
pub mod tile;

pub use pipeworks_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, GameConfig};
pub use flow::{
    choose_exit, run_traversal, trace_from_start, FlowEnd, FlowError, FlowPath, FlowStep,
    Traversal,
};
pub use grid::{GridError, GridOccupancy};
pub use place::{try_place, PlaceError};
pub use queue::{refill, DrawPolicy, SupplyQueue};
pub use rng::{RandomSource, ScriptedRng, SimpleRng};
pub use round::{inward_orientations, place_endpoints, Phase, Round, RoundEvent, SetupError};
pub use scoring::{score_path, ScoreResult};
pub use snapshot::RoundSnapshot;
pub use tile::{canonical_edges, connects, edges_of, Tile};
