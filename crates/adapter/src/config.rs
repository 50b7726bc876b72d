//! Session configuration from environment variables
//!
//! | Variable                  | Meaning                              | Default |
//! |---------------------------|--------------------------------------|---------|
//! | `PIPEWORKS_GRID_COLUMNS`  | grid width in cells                  | 10      |
//! | `PIPEWORKS_GRID_ROWS`     | grid height in cells                 | 8       |
//! | `PIPEWORKS_TILE_SIZE`     | tile size in pixels                  | 64      |
//! | `PIPEWORKS_COUNTDOWN_SECS`| placement countdown                  | 30      |
//! | `PIPEWORKS_QUEUE_LEN`     | supply queue target length           | 5       |
//! | `PIPEWORKS_DRAWABLE`      | comma list, e.g. `straight,turn,tee` | classic |
//! | `PIPEWORKS_FLOW_STEP_MS`  | delay between revealed flow steps    | 3000    |
//! | `PIPEWORKS_SEED`          | seed for the first round             | 1       |
//! | `PIPEWORKS_TICK_MS`       | session tick interval                | 16      |
//!
//! Unparseable values fall back to the default.

use crate::core::GameConfig;
use crate::types::{TileVariant, TICK_MS};

pub const DEFAULT_SEED: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub game: GameConfig,
    pub seed: u32,
    pub tick_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            seed: DEFAULT_SEED,
            tick_ms: TICK_MS,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
            raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
        }

        let defaults = Self::default();
        let game = defaults.game;

        let drawable_variants = lookup("PIPEWORKS_DRAWABLE")
            .map(|s| parse_variants(&s))
            .filter(|v| !v.is_empty())
            .unwrap_or(game.drawable_variants);

        Self {
            game: GameConfig {
                grid_columns: parsed(lookup("PIPEWORKS_GRID_COLUMNS"), game.grid_columns),
                grid_rows: parsed(lookup("PIPEWORKS_GRID_ROWS"), game.grid_rows),
                tile_size: parsed(lookup("PIPEWORKS_TILE_SIZE"), game.tile_size),
                countdown_secs: parsed(lookup("PIPEWORKS_COUNTDOWN_SECS"), game.countdown_secs),
                queue_target_len: parsed(lookup("PIPEWORKS_QUEUE_LEN"), game.queue_target_len),
                drawable_variants,
                flow_step_ms: parsed(lookup("PIPEWORKS_FLOW_STEP_MS"), game.flow_step_ms),
            },
            seed: parsed(lookup("PIPEWORKS_SEED"), defaults.seed),
            tick_ms: parsed(lookup("PIPEWORKS_TICK_MS"), defaults.tick_ms).max(1),
        }
    }
}

/// Parse a comma-separated variant list, skipping unknown names
pub fn parse_variants(raw: &str) -> Vec<TileVariant> {
    raw.split(',')
        .filter_map(TileVariant::from_str)
        .collect()
}
