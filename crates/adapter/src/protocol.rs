//! Protocol module - JSON message types for the session adapter
//!
//! One JSON object per line, tagged by `"type"`. Client messages carry a `seq`
//! that must increase monotonically; server replies echo it.

use serde::{Deserialize, Serialize};

use crate::core::{FlowEnd, FlowStep, PlaceError, RoundEvent, RoundSnapshot, Tile};
use crate::types::QueuedTile;

pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Session Messages ==============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        seq: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client: Option<ClientInfo>,
    },
    Place {
        seq: u64,
        col: i16,
        row: i16,
    },
    StartFlow {
        seq: u64,
    },
    Pause {
        seq: u64,
    },
    Restart {
        seq: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u32>,
    },
    Observe {
        seq: u64,
    },
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Hello { seq, .. }
            | ClientMessage::Place { seq, .. }
            | ClientMessage::StartFlow { seq }
            | ClientMessage::Pause { seq }
            | ClientMessage::Restart { seq, .. }
            | ClientMessage::Observe { seq } => *seq,
        }
    }
}

// ============== Session -> Client Messages ==============

/// Protocol-level error codes that do not come from the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    InvalidJson,
    HandshakeRequired,
    InvalidSeq,
}

impl ProtocolError {
    pub fn code(self) -> &'static str {
        match self {
            ProtocolError::InvalidJson => "invalid_json",
            ProtocolError::HandshakeRequired => "handshake_required",
            ProtocolError::InvalidSeq => "invalid_seq",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ProtocolError::InvalidJson => "line is not a valid client message",
            ProtocolError::HandshakeRequired => "send hello before any other message",
            ProtocolError::InvalidSeq => "seq must increase monotonically",
        }
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ProtocolError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileWire {
    pub variant: &'static str,
    pub orientation: u16,
    pub col: i16,
    pub row: i16,
}

impl From<&Tile> for TileWire {
    fn from(t: &Tile) -> Self {
        Self {
            variant: t.variant.as_str(),
            orientation: t.orientation.degrees(),
            col: t.cell.col,
            row: t.cell.row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueuedWire {
    pub variant: &'static str,
    pub orientation: u16,
}

impl From<&QueuedTile> for QueuedWire {
    fn from(q: &QueuedTile) -> Self {
        Self {
            variant: q.variant.as_str(),
            orientation: q.orientation.degrees(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepWire {
    pub col: i16,
    pub row: i16,
    pub variant: &'static str,
    pub entry: Option<&'static str>,
    pub exit: &'static str,
}

impl From<&FlowStep> for StepWire {
    fn from(s: &FlowStep) -> Self {
        Self {
            col: s.tile.cell.col,
            row: s.tile.cell.row,
            variant: s.tile.variant.as_str(),
            entry: s.entry.map(|d| d.as_str()),
            exit: s.exit.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndWire {
    pub kind: &'static str,
    pub col: i16,
    pub row: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<&'static str>,
}

impl From<&FlowEnd> for EndWire {
    fn from(e: &FlowEnd) -> Self {
        let cell = e.cell();
        let direction = match *e {
            FlowEnd::Spill { direction, .. } | FlowEnd::OffGrid { direction, .. } => {
                Some(direction.as_str())
            }
            FlowEnd::ReachedStop { entry, .. } | FlowEnd::Loop { entry, .. } => {
                entry.map(|d| d.as_str())
            }
            FlowEnd::DeadEnd { .. } => None,
        };
        Self {
            kind: e.as_str(),
            col: cell.col,
            row: cell.row,
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservationMessage {
    pub seq: u64,
    pub round_id: u32,
    pub seed: u32,
    pub phase: &'static str,
    pub columns: u8,
    pub rows: u8,
    pub tile_size: u16,
    pub tiles: Vec<TileWire>,
    pub queue: Vec<QueuedWire>,
    pub remaining_secs: u32,
    pub revealed: Vec<StepWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EndWire>,
    pub score: u32,
}

impl ObservationMessage {
    pub fn from_snapshot(seq: u64, snap: &RoundSnapshot) -> Self {
        Self {
            seq,
            round_id: snap.round_id,
            seed: snap.seed,
            phase: snap.phase.as_str(),
            columns: snap.columns,
            rows: snap.rows,
            tile_size: snap.tile_size,
            tiles: snap.tiles.iter().map(TileWire::from).collect(),
            queue: snap.queue.iter().map(QueuedWire::from).collect(),
            remaining_secs: snap.remaining_secs,
            revealed: snap.revealed.iter().map(StepWire::from).collect(),
            end: snap.end.as_ref().map(EndWire::from),
            score: snap.score,
        }
    }
}

/// Flattened round event; only the fields relevant to `event` are present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventMessage {
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile: Option<TileWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EndWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl EventMessage {
    fn named(event: &'static str) -> Self {
        Self {
            event,
            tile: None,
            remaining_secs: None,
            steps: None,
            step: None,
            end: None,
            score: None,
        }
    }
}

impl From<&RoundEvent> for EventMessage {
    fn from(e: &RoundEvent) -> Self {
        match e {
            RoundEvent::TilePlaced(tile) => Self {
                tile: Some(tile.into()),
                ..Self::named("tile_placed")
            },
            RoundEvent::CountdownTick { remaining_secs } => Self {
                remaining_secs: Some(*remaining_secs),
                ..Self::named("countdown")
            },
            RoundEvent::Paused => Self::named("paused"),
            RoundEvent::Resumed => Self::named("resumed"),
            RoundEvent::FlowStarted { steps } => Self {
                steps: Some(*steps),
                ..Self::named("flow_started")
            },
            RoundEvent::FlowAdvanced(step) => Self {
                step: Some(step.into()),
                ..Self::named("flow_step")
            },
            RoundEvent::FlowFinished { end, score } => Self {
                end: end.as_ref().map(EndWire::from),
                score: Some(*score),
                ..Self::named("flow_finished")
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        seq: u64,
        protocol_version: &'static str,
        columns: u8,
        rows: u8,
        tile_size: u16,
        queue_len: usize,
    },
    Ack {
        seq: u64,
        /// Set when the command was a benign no-op (e.g. `queue_empty`)
        #[serde(skip_serializing_if = "Option::is_none")]
        ignored: Option<&'static str>,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        seq: Option<u64>,
        code: &'static str,
        message: String,
    },
    Observation(ObservationMessage),
    Event(EventMessage),
}

impl ServerMessage {
    pub fn ack(seq: u64) -> Self {
        ServerMessage::Ack { seq, ignored: None }
    }

    pub fn protocol_error(seq: Option<u64>, err: ProtocolError) -> Self {
        ServerMessage::Error {
            seq,
            code: err.code(),
            message: err.message().to_string(),
        }
    }

    pub fn place_error(seq: u64, err: PlaceError) -> Self {
        ServerMessage::Error {
            seq: Some(seq),
            code: err.code(),
            message: err.message().to_string(),
        }
    }
}
