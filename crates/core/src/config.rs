//! Config module - the plain-value bundle a round is built from

use std::fmt;

use crate::queue::DrawPolicy;
use crate::types::{
    TileVariant, COUNTDOWN_STEP_MS, DEFAULT_COUNTDOWN_SECS, DEFAULT_FLOW_STEP_MS, GRID_COLUMNS,
    GRID_ROWS, QUEUE_TARGET_LEN, TILE_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    EmptyGrid,
    /// Start and stop need two distinct cells
    GridTooSmall,
    ZeroQueueLength,
    NoDrawableVariants,
    UnplaceableVariant(TileVariant),
}

impl ConfigError {
    pub fn code(self) -> &'static str {
        match self {
            ConfigError::EmptyGrid => "empty_grid",
            ConfigError::GridTooSmall => "grid_too_small",
            ConfigError::ZeroQueueLength => "zero_queue_length",
            ConfigError::NoDrawableVariants => "no_drawable_variants",
            ConfigError::UnplaceableVariant(_) => "unplaceable_variant",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ConfigError::EmptyGrid => "grid must have at least one column and one row",
            ConfigError::GridTooSmall => "grid must have room for distinct start and stop tiles",
            ConfigError::ZeroQueueLength => "supply queue target length must be positive",
            ConfigError::NoDrawableVariants => "at least one drawable variant is required",
            ConfigError::UnplaceableVariant(_) => "start and stop tiles cannot be drawn",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnplaceableVariant(v) => write!(f, "{} ({})", self.message(), v),
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Round configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub grid_columns: u8,
    pub grid_rows: u8,
    /// Pixel size of one tile; bounds are expressed in cells, so the core ignores it
    pub tile_size: u16,
    pub countdown_secs: u32,
    pub queue_target_len: usize,
    pub drawable_variants: Vec<TileVariant>,
    pub flow_step_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_columns: GRID_COLUMNS,
            grid_rows: GRID_ROWS,
            tile_size: TILE_SIZE,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            queue_target_len: QUEUE_TARGET_LEN,
            drawable_variants: DrawPolicy::Classic.variants().to_vec(),
            flow_step_ms: DEFAULT_FLOW_STEP_MS,
        }
    }
}

impl GameConfig {
    /// Replace the drawable set with a named policy
    pub fn with_policy(mut self, policy: DrawPolicy) -> Self {
        self.drawable_variants = policy.variants().to_vec();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_columns == 0 || self.grid_rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if (self.grid_columns as usize) * (self.grid_rows as usize) < 2 {
            return Err(ConfigError::GridTooSmall);
        }
        if self.queue_target_len == 0 {
            return Err(ConfigError::ZeroQueueLength);
        }
        if self.drawable_variants.is_empty() {
            return Err(ConfigError::NoDrawableVariants);
        }
        if let Some(&bad) = self.drawable_variants.iter().find(|v| !v.is_placeable()) {
            return Err(ConfigError::UnplaceableVariant(bad));
        }
        Ok(())
    }

    pub fn countdown_ms(&self) -> u32 {
        self.countdown_secs.saturating_mul(COUNTDOWN_STEP_MS)
    }
}
