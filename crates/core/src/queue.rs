//! Queue module - upcoming placeable tiles
//!
//! The queue is topped up to a fixed target length after every draw. Each new
//! entry is a variant picked uniformly from the configured drawable set with an
//! orientation picked uniformly from the four cardinal values.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::config::ConfigError;
use crate::rng::RandomSource;
use crate::types::{Orientation, QueuedTile, TileVariant};

/// Maximum number of distinct drawable variants (every placeable variant)
pub const MAX_DRAWABLE: usize = 5;

/// Named drawable sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPolicy {
    /// straight, turn, crossed
    Classic,
    /// straight, turn, tee, crossed
    WithTee,
}

impl DrawPolicy {
    pub fn variants(self) -> &'static [TileVariant] {
        match self {
            DrawPolicy::Classic => &[TileVariant::Straight, TileVariant::Turn, TileVariant::Crossed],
            DrawPolicy::WithTee => &[
                TileVariant::Straight,
                TileVariant::Turn,
                TileVariant::Tee,
                TileVariant::Crossed,
            ],
        }
    }
}

/// Append random entries until `queue` holds `target_len` items.
///
/// Never removes entries and never overshoots. Returns how many entries were
/// appended; an empty `drawable` set appends nothing.
pub fn refill<R: RandomSource>(
    queue: &mut VecDeque<QueuedTile>,
    target_len: usize,
    drawable: &[TileVariant],
    rng: &mut R,
) -> usize {
    if drawable.is_empty() {
        return 0;
    }
    let mut added = 0;
    while queue.len() < target_len {
        let variant = drawable[rng.next_range(drawable.len() as u32) as usize];
        let orientation = Orientation::ALL[rng.next_range(4) as usize];
        queue.push_back(QueuedTile::new(variant, orientation));
        added += 1;
    }
    added
}

/// The player's supply of upcoming tiles
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyQueue {
    entries: VecDeque<QueuedTile>,
    target_len: usize,
    drawable: ArrayVec<TileVariant, MAX_DRAWABLE>,
}

impl SupplyQueue {
    /// Create an empty queue; call [`SupplyQueue::refill`] to fill it.
    ///
    /// Duplicate and non-placeable variants are dropped from `drawable`. If
    /// nothing drawable is left, refill could never reach `target_len`, so
    /// that is rejected with [`ConfigError::NoDrawableVariants`].
    pub fn new(target_len: usize, drawable: &[TileVariant]) -> Result<Self, ConfigError> {
        let mut set = ArrayVec::new();
        for &v in drawable {
            if v.is_placeable() && !set.contains(&v) {
                set.push(v);
            }
        }
        if set.is_empty() {
            return Err(ConfigError::NoDrawableVariants);
        }
        Ok(Self {
            entries: VecDeque::with_capacity(target_len),
            target_len,
            drawable: set,
        })
    }

    /// Top the queue up to its target length
    pub fn refill<R: RandomSource>(&mut self, rng: &mut R) -> usize {
        refill(&mut self.entries, self.target_len, &self.drawable, rng)
    }

    /// Remove and return the head of the queue
    pub fn dequeue(&mut self) -> Option<QueuedTile> {
        self.entries.pop_front()
    }

    /// Peek at the next tile without removing it
    pub fn peek(&self) -> Option<QueuedTile> {
        self.entries.front().copied()
    }

    /// All pending entries, head first
    pub fn peek_all(&self) -> impl ExactSizeIterator<Item = &QueuedTile> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    pub fn drawable(&self) -> &[TileVariant] {
        &self.drawable
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append a specific entry (setup and tests), ignoring the target length
    pub fn push(&mut self, tile: QueuedTile) {
        self.entries.push_back(tile);
    }
}
