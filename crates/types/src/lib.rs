//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the pipe puzzle.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, session protocol, presentation layers).
//!
//! # Grid Dimensions
//!
//! Default playfield dimensions:
//!
//! - **Columns**: 10 (indexed 0-9, left to right)
//! - **Rows**: 8 (indexed 0-7, top to bottom)
//!
//! # Round Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_COUNTDOWN_SECS` | 30 | Placement phase length |
//! | `COUNTDOWN_STEP_MS` | 1000 | Countdown granularity |
//! | `DEFAULT_FLOW_STEP_MS` | 3000 | Time the ooze spends crossing one tile |
//! | `TICK_MS` | 16 | Fixed timestep of the session driver |
//!
//! # Examples
//!
//! ```
//! use pipeworks_types::{Direction, Orientation, TileVariant, GRID_COLUMNS, GRID_ROWS};
//!
//! // Parse from string (case-insensitive)
//! let variant = TileVariant::from_str("Turn").unwrap();
//! assert_eq!(variant, TileVariant::Turn);
//!
//! // Orientations rotate clockwise in quarter turns
//! assert_eq!(Orientation::Deg270.rotate_cw(), Orientation::Deg0);
//!
//! // Directions pair up with their opposite
//! assert_eq!(Direction::Left.opposite(), Direction::Right);
//!
//! assert_eq!(GRID_COLUMNS, 10);
//! assert_eq!(GRID_ROWS, 8);
//! ```

use std::fmt;

/// Default grid width in cells
pub const GRID_COLUMNS: u8 = 10;

/// Default grid height in cells
pub const GRID_ROWS: u8 = 8;

/// Default tile edge length in pixels (only used by presentation layers)
pub const TILE_SIZE: u16 = 64;

/// Number of upcoming tiles kept in the supply queue
pub const QUEUE_TARGET_LEN: usize = 5;

/// Placement phase length in seconds
pub const DEFAULT_COUNTDOWN_SECS: u32 = 30;

/// Countdown granularity (one visible tick per second)
pub const COUNTDOWN_STEP_MS: u32 = 1000;

/// Time the ooze spends crossing one tile
pub const DEFAULT_FLOW_STEP_MS: u32 = 3000;

/// Fixed timestep interval of the session driver in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Points for every step the ooze takes through a player-placed tile
pub const PIPE_STEP_SCORE: u32 = 10;

/// Extra points when the ooze re-enters a crossed tile on its second axis
pub const RECROSS_BONUS: u32 = 5;

/// Bonus for delivering the ooze into the stop tile
pub const STOP_BONUS: u32 = 100;

/// One of the four sides of a tile.
///
/// The declaration order is the canonical scan order used by flow traversal:
/// top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// All directions in canonical order
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    /// The side facing this one across a shared edge
    ///
    /// # Examples
    ///
    /// ```
    /// use pipeworks_types::Direction;
    ///
    /// assert_eq!(Direction::Top.opposite(), Direction::Bottom);
    /// assert_eq!(Direction::Right.opposite(), Direction::Left);
    /// ```
    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Rotate 90° clockwise: top → right → bottom → left → top
    pub fn rotate_cw(self) -> Self {
        match self {
            Direction::Top => Direction::Right,
            Direction::Right => Direction::Bottom,
            Direction::Bottom => Direction::Left,
            Direction::Left => Direction::Top,
        }
    }

    /// Index into the canonical order
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Top => 0,
            Direction::Right => 1,
            Direction::Bottom => 2,
            Direction::Left => 3,
        }
    }

    /// Unit step in grid coordinates as (d_col, d_row); rows grow downwards
    pub fn offset(self) -> (i16, i16) {
        match self {
            Direction::Top => (0, -1),
            Direction::Right => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Parse direction from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "top" => Some(Direction::Top),
            "right" => Some(Direction::Right),
            "bottom" => Some(Direction::Bottom),
            "left" => Some(Direction::Left),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Right => "right",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clockwise rotation applied to a tile's canonical edge set
///
/// The rotation cycle goes: 0° → 90° → 180° → 270° → 0°
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use pipeworks_types::Orientation;
    ///
    /// assert_eq!(Orientation::Deg0.rotate_cw(), Orientation::Deg90);
    /// assert_eq!(Orientation::Deg90.rotate_cw(), Orientation::Deg180);
    /// assert_eq!(Orientation::Deg180.rotate_cw(), Orientation::Deg270);
    /// assert_eq!(Orientation::Deg270.rotate_cw(), Orientation::Deg0);
    /// ```
    pub fn rotate_cw(self) -> Self {
        match self {
            Orientation::Deg0 => Orientation::Deg90,
            Orientation::Deg90 => Orientation::Deg180,
            Orientation::Deg180 => Orientation::Deg270,
            Orientation::Deg270 => Orientation::Deg0,
        }
    }

    /// Number of clockwise quarter turns from 0°
    pub fn quarter_turns(self) -> u8 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 1,
            Orientation::Deg180 => 2,
            Orientation::Deg270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Parse from a degree value; only the four cardinal values are accepted
    ///
    /// # Examples
    ///
    /// ```
    /// use pipeworks_types::Orientation;
    ///
    /// assert_eq!(Orientation::from_degrees(180), Some(Orientation::Deg180));
    /// assert_eq!(Orientation::from_degrees(45), None);
    /// ```
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Orientation::Deg0),
            90 => Some(Orientation::Deg90),
            180 => Some(Orientation::Deg180),
            270 => Some(Orientation::Deg270),
            _ => None,
        }
    }

    /// The orientation that points a single-edge tile (start/stop) towards `dir`
    pub fn facing(dir: Direction) -> Self {
        match dir {
            Direction::Top => Orientation::Deg0,
            Direction::Right => Orientation::Deg90,
            Direction::Bottom => Orientation::Deg180,
            Direction::Left => Orientation::Deg270,
        }
    }
}

/// The fixed set of tile variants
///
/// - **Straight**: two opposite edges open
/// - **Turn**: two adjacent edges open
/// - **Tee**: three edges open
/// - **Crossed**: all four edges open at every orientation
/// - **Blocked**: no edges open at any orientation
/// - **Start** / **Stop**: a single open edge, placed once per round by setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileVariant {
    Straight,
    Turn,
    Tee,
    Crossed,
    Blocked,
    Start,
    Stop,
}

impl TileVariant {
    pub const ALL: [TileVariant; 7] = [
        TileVariant::Straight,
        TileVariant::Turn,
        TileVariant::Tee,
        TileVariant::Crossed,
        TileVariant::Blocked,
        TileVariant::Start,
        TileVariant::Stop,
    ];

    /// Whether the variant may appear in the supply queue
    pub fn is_placeable(&self) -> bool {
        !matches!(self, TileVariant::Start | TileVariant::Stop)
    }

    /// Parse tile variant from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use pipeworks_types::TileVariant;
    ///
    /// assert_eq!(TileVariant::from_str("crossed"), Some(TileVariant::Crossed));
    /// assert_eq!(TileVariant::from_str("TEE"), Some(TileVariant::Tee));
    /// assert_eq!(TileVariant::from_str("elbow"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "straight" => Some(TileVariant::Straight),
            "turn" => Some(TileVariant::Turn),
            "tee" => Some(TileVariant::Tee),
            "crossed" => Some(TileVariant::Crossed),
            "blocked" => Some(TileVariant::Blocked),
            "start" => Some(TileVariant::Start),
            "stop" => Some(TileVariant::Stop),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TileVariant::Straight => "straight",
            TileVariant::Turn => "turn",
            TileVariant::Tee => "tee",
            TileVariant::Crossed => "crossed",
            TileVariant::Blocked => "blocked",
            TileVariant::Start => "start",
            TileVariant::Stop => "stop",
        }
    }
}

impl fmt::Display for TileVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open/closed state of a tile's four edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Edges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Edges {
    pub const CLOSED: Edges = Edges::new(false, false, false, false);
    pub const OPEN: Edges = Edges::new(true, true, true, true);

    pub const fn new(top: bool, right: bool, bottom: bool, left: bool) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[inline]
    pub fn is_open(&self, dir: Direction) -> bool {
        match dir {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    /// Rotate the edge set 90° clockwise: what was open on top is now open on the right
    pub fn rotate_cw(&self) -> Self {
        Self {
            top: self.left,
            right: self.top,
            bottom: self.right,
            left: self.bottom,
        }
    }

    pub fn open_count(&self) -> usize {
        Direction::ALL.iter().filter(|&&d| self.is_open(d)).count()
    }
}

/// A discrete grid coordinate
///
/// Signed so that stepping off the top/left edge yields a representable
/// (out-of-bounds) cell instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub col: i16,
    pub row: i16,
}

impl GridCell {
    pub const fn new(col: i16, row: i16) -> Self {
        Self { col, row }
    }

    /// The neighbouring cell one unit towards `dir`
    pub fn step(self, dir: Direction) -> Self {
        let (dc, dr) = dir.offset();
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// A pending supply-queue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueuedTile {
    pub variant: TileVariant,
    pub orientation: Orientation,
}

impl QueuedTile {
    pub const fn new(variant: TileVariant, orientation: Orientation) -> Self {
        Self {
            variant,
            orientation,
        }
    }
}
