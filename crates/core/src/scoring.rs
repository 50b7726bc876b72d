//! Scoring module - points for a finished flow
//!
//! - Every step through a player-placed tile scores `PIPE_STEP_SCORE`.
//! - A crossed tile entered a second time adds `RECROSS_BONUS`.
//! - Ending in the stop tile adds `STOP_BONUS`.
//!
//! The start tile itself scores nothing.

use std::collections::HashSet;

use crate::flow::{FlowEnd, FlowPath};
use crate::types::{TileVariant, PIPE_STEP_SCORE, RECROSS_BONUS, STOP_BONUS};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub pipe_points: u32,
    pub recross_bonus: u32,
    pub stop_bonus: u32,
    pub total: u32,
}

/// Score a flow path
pub fn score_path(path: &FlowPath) -> ScoreResult {
    let mut pipe_points = 0u32;
    let mut recross_bonus = 0u32;
    let mut crossed_seen = HashSet::new();

    for step in &path.steps {
        if !step.tile.variant.is_placeable() {
            continue;
        }
        pipe_points = pipe_points.saturating_add(PIPE_STEP_SCORE);

        if step.tile.variant == TileVariant::Crossed && !crossed_seen.insert(step.tile.cell) {
            recross_bonus = recross_bonus.saturating_add(RECROSS_BONUS);
        }
    }

    let stop_bonus = match path.end {
        FlowEnd::ReachedStop { .. } => STOP_BONUS,
        _ => 0,
    };

    ScoreResult {
        pipe_points,
        recross_bonus,
        stop_bonus,
        total: pipe_points
            .saturating_add(recross_bonus)
            .saturating_add(stop_bonus),
    }
}
