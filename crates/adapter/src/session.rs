//! Session: drives one round from line-delimited JSON commands
//!
//! `Session` is the synchronous part. It turns a client message into server
//! messages and never blocks. `run_session` wraps it in a tokio loop that
//! multiplexes input lines with a fixed tick interval.

use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::core::{GameConfig, Round, SetupError};
use crate::protocol::{
    ClientMessage, EventMessage, ObservationMessage, ProtocolError, ServerMessage,
    PROTOCOL_VERSION,
};
use crate::types::GridCell;

/// Pull `"seq": <n>` out of a line that failed to parse, so the error can echo it
fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

pub struct Session {
    round: Round,
    handshaken: bool,
    last_seq: Option<u64>,
}

impl Session {
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, SetupError> {
        Ok(Self {
            round: Round::new(config, seed)?,
            handshaken: false,
            last_seq: None,
        })
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, SetupError> {
        Self::new(config.game.clone(), config.seed)
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn is_handshaken(&self) -> bool {
        self.handshaken
    }

    pub fn observation(&self, seq: u64) -> ServerMessage {
        ServerMessage::Observation(ObservationMessage::from_snapshot(
            seq,
            &self.round.snapshot(),
        ))
    }

    /// Parse and handle one input line. Blank lines produce nothing.
    pub fn handle_line(&mut self, line: &str) -> Vec<ServerMessage> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<ClientMessage>(line) {
            Ok(msg) => self.handle(msg),
            Err(err) => {
                warn!(error = %err, "rejecting malformed line");
                vec![ServerMessage::protocol_error(
                    extract_seq_best_effort(line),
                    ProtocolError::InvalidJson,
                )]
            }
        }
    }

    pub fn handle(&mut self, msg: ClientMessage) -> Vec<ServerMessage> {
        let seq = msg.seq();

        if !self.handshaken && !matches!(msg, ClientMessage::Hello { .. }) {
            return vec![ServerMessage::protocol_error(
                Some(seq),
                ProtocolError::HandshakeRequired,
            )];
        }
        if self.last_seq.is_some_and(|prev| seq <= prev) {
            return vec![ServerMessage::protocol_error(
                Some(seq),
                ProtocolError::InvalidSeq,
            )];
        }
        self.last_seq = Some(seq);

        let mut out = Vec::new();
        match msg {
            ClientMessage::Hello { client, .. } => {
                self.handshaken = true;
                if let Some(client) = client {
                    info!(name = %client.name, version = %client.version, "client connected");
                }
                let config = self.round.config();
                out.push(ServerMessage::Welcome {
                    seq,
                    protocol_version: PROTOCOL_VERSION,
                    columns: config.grid_columns,
                    rows: config.grid_rows,
                    tile_size: config.tile_size,
                    queue_len: config.queue_target_len,
                });
                out.push(self.observation(seq));
            }
            ClientMessage::Place { col, row, .. } => {
                match self.round.place(GridCell::new(col, row)) {
                    Ok(_) => out.push(ServerMessage::ack(seq)),
                    Err(err) if err.is_benign() => out.push(ServerMessage::Ack {
                        seq,
                        ignored: Some(err.code()),
                    }),
                    Err(err) => out.push(ServerMessage::place_error(seq, err)),
                }
                self.drain_events(&mut out);
            }
            ClientMessage::StartFlow { .. } => {
                match self.round.start_flow() {
                    Ok(true) => out.push(ServerMessage::ack(seq)),
                    Ok(false) => out.push(ServerMessage::Ack {
                        seq,
                        ignored: Some("already_flowing"),
                    }),
                    Err(err) => out.push(ServerMessage::Error {
                        seq: Some(seq),
                        code: err.code(),
                        message: err.message().to_string(),
                    }),
                }
                self.drain_events(&mut out);
            }
            ClientMessage::Pause { .. } => {
                if self.round.toggle_pause() {
                    out.push(ServerMessage::ack(seq));
                } else {
                    out.push(ServerMessage::Ack {
                        seq,
                        ignored: Some("not_pausable"),
                    });
                }
                self.drain_events(&mut out);
            }
            ClientMessage::Restart { seed, .. } => {
                let seed = seed.unwrap_or_else(|| self.round.seed().wrapping_add(1));
                match self.round.restart(seed) {
                    Ok(()) => {
                        // Events from the previous round are stale.
                        self.round.take_events();
                        out.push(ServerMessage::ack(seq));
                        out.push(self.observation(seq));
                    }
                    Err(err) => {
                        warn!(error = %err, "restart failed");
                        out.push(ServerMessage::Error {
                            seq: Some(seq),
                            code: "restart_failed",
                            message: err.to_string(),
                        });
                    }
                }
            }
            ClientMessage::Observe { .. } => out.push(self.observation(seq)),
        }
        out
    }

    /// Advance the round clock and report whatever happened.
    ///
    /// The clock only runs after `hello`, so a late client still gets the full
    /// placement phase.
    pub fn tick(&mut self, elapsed_ms: u32) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        if !self.handshaken {
            return out;
        }
        if self.round.tick(elapsed_ms) {
            self.drain_events(&mut out);
        }
        out
    }

    fn drain_events(&mut self, out: &mut Vec<ServerMessage>) {
        out.extend(
            self.round
                .take_events()
                .iter()
                .map(|e| ServerMessage::Event(EventMessage::from(e))),
        );
    }
}

async fn write_message<W>(writer: &mut W, msg: &ServerMessage) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(msg).context("serializing server message")?;
    line.push('\n');
    writer
        .write_all(line.as_bytes())
        .await
        .context("writing server message")?;
    Ok(())
}

async fn write_all<W>(writer: &mut W, msgs: Vec<ServerMessage>) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if msgs.is_empty() {
        return Ok(());
    }
    for msg in &msgs {
        write_message(writer, msg).await?;
    }
    writer.flush().await.context("flushing output")?;
    Ok(())
}

/// Run a session until the reader hits EOF. Returns the session for inspection.
pub async fn run_session<R, W>(
    reader: R,
    mut writer: W,
    mut session: Session,
    tick_ms: u32,
) -> anyhow::Result<Session>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut interval = tokio::time::interval(Duration::from_millis(u64::from(tick_ms.max(1))));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    info!(
        round_id = session.round().round_id(),
        tick_ms, "session started"
    );

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading client line")? else {
                    break;
                };
                let replies = session.handle_line(&line);
                write_all(&mut writer, replies).await?;
            }
            _ = interval.tick() => {
                let now = Instant::now();
                let elapsed = u32::try_from(now.duration_since(last_tick).as_millis())
                    .unwrap_or(u32::MAX);
                last_tick = now;
                let updates = session.tick(elapsed);
                write_all(&mut writer, updates).await?;
            }
        }
    }

    info!(
        phase = session.round().phase().as_str(),
        score = session.round().score().total,
        "session ended"
    );
    writer.flush().await.context("flushing output")?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Phase, Tile};
    use crate::types::{Orientation, TileVariant};

    fn session() -> Session {
        let config = GameConfig {
            grid_columns: 5,
            grid_rows: 5,
            countdown_secs: 3,
            flow_step_ms: 0,
            ..GameConfig::default()
        };
        let round = Round::with_endpoints(
            config,
            7,
            Tile::new(TileVariant::Start, Orientation::Deg180, GridCell::new(2, 0)),
            Tile::new(TileVariant::Stop, Orientation::Deg0, GridCell::new(2, 4)),
        )
        .unwrap();
        Session {
            round,
            handshaken: false,
            last_seq: None,
        }
    }

    fn hello(s: &mut Session) {
        let out = s.handle_line(r#"{"type":"hello","seq":1}"#);
        assert!(matches!(out[0], ServerMessage::Welcome { seq: 1, .. }));
    }

    #[test]
    fn clock_waits_for_hello() {
        let mut s = session();
        let mut quiet = true;
        for _ in 0..1875 {
            quiet &= s.tick(16).is_empty();
        }
        assert!(quiet);
        assert_eq!(s.round().phase(), Phase::Placing);
        assert_eq!(s.round().remaining_secs(), 3);

        hello(&mut s);
        let out = s.handle_line(r#"{"type":"place","seq":2,"col":0,"row":0}"#);
        assert_eq!(out[0], ServerMessage::ack(2));

        let events = s.tick(1000);
        assert!(events.iter().any(|m| matches!(
            m,
            ServerMessage::Event(e) if e.event == "countdown" && e.remaining_secs == Some(2)
        )));
    }

    #[test]
    fn extracts_seq_from_broken_json() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type":"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"type":"x"}"#), None);
        assert_eq!(extract_seq_best_effort(r#"{"seq":"a"}"#), None);
    }

    #[test]
    fn commands_before_hello_are_rejected() {
        let mut s = session();
        let out = s.handle_line(r#"{"type":"place","seq":1,"col":0,"row":0}"#);
        assert_eq!(
            out,
            vec![ServerMessage::protocol_error(
                Some(1),
                ProtocolError::HandshakeRequired
            )]
        );
        assert!(s.round().grid().get(GridCell::new(0, 0)).is_none());
    }

    #[test]
    fn hello_returns_welcome_and_observation() {
        let mut s = session();
        let out = s.handle_line(r#"{"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"}}"#);
        assert_eq!(out.len(), 2);
        assert!(matches!(
            out[0],
            ServerMessage::Welcome {
                columns: 5,
                rows: 5,
                ..
            }
        ));
        assert!(matches!(out[1], ServerMessage::Observation(_)));
        assert!(s.is_handshaken());
    }

    #[test]
    fn malformed_line_reports_invalid_json() {
        let mut s = session();
        hello(&mut s);
        let out = s.handle_line(r#"{"type":"place","seq":2,"col":"#);
        assert_eq!(
            out,
            vec![ServerMessage::protocol_error(Some(2), ProtocolError::InvalidJson)]
        );
        assert!(s.handle_line("   ").is_empty());
    }

    #[test]
    fn seq_must_increase() {
        let mut s = session();
        hello(&mut s);
        let out = s.handle_line(r#"{"type":"observe","seq":1}"#);
        assert_eq!(
            out,
            vec![ServerMessage::protocol_error(Some(1), ProtocolError::InvalidSeq)]
        );
    }

    #[test]
    fn place_acks_and_reports_tile() {
        let mut s = session();
        hello(&mut s);
        let out = s.handle_line(r#"{"type":"place","seq":2,"col":0,"row":0}"#);
        assert_eq!(out[0], ServerMessage::ack(2));
        match &out[1] {
            ServerMessage::Event(e) => {
                assert_eq!(e.event, "tile_placed");
                let tile = e.tile.unwrap();
                assert_eq!((tile.col, tile.row), (0, 0));
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn place_on_endpoint_is_an_error() {
        let mut s = session();
        hello(&mut s);
        let out = s.handle_line(r#"{"type":"place","seq":2,"col":2,"row":0}"#);
        match &out[0] {
            ServerMessage::Error { seq, code, .. } => {
                assert_eq!(*seq, Some(2));
                assert_eq!(*code, "cell_occupied");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn start_flow_then_tick_finishes_round() {
        let mut s = session();
        hello(&mut s);
        let out = s.handle_line(r#"{"type":"start_flow","seq":2}"#);
        assert_eq!(out[0], ServerMessage::ack(2));
        assert_eq!(s.round().phase(), Phase::Flowing);

        let updates = s.tick(1);
        let finished = updates.iter().any(|m| {
            matches!(m, ServerMessage::Event(e) if e.event == "flow_finished")
        });
        assert!(finished);
        assert_eq!(s.round().phase(), Phase::Finished);

        let again = s.handle_line(r#"{"type":"start_flow","seq":3}"#);
        assert_eq!(
            again[0],
            ServerMessage::Ack {
                seq: 3,
                ignored: Some("already_flowing")
            }
        );
    }

    #[test]
    fn pause_blocks_placement() {
        let mut s = session();
        hello(&mut s);
        s.handle_line(r#"{"type":"pause","seq":2}"#);
        assert_eq!(s.round().phase(), Phase::Paused);

        let out = s.handle_line(r#"{"type":"place","seq":3,"col":0,"row":0}"#);
        assert!(matches!(
            out[0],
            ServerMessage::Error {
                code: "not_placing",
                ..
            }
        ));
    }

    #[test]
    fn restart_with_seed_starts_new_round() {
        let mut s = session();
        hello(&mut s);
        s.handle_line(r#"{"type":"place","seq":2,"col":0,"row":0}"#);
        let out = s.handle_line(r#"{"type":"restart","seq":3,"seed":55}"#);

        assert_eq!(out[0], ServerMessage::ack(3));
        assert_eq!(s.round().seed(), 55);
        assert_eq!(s.round().round_id(), 1);
        assert_eq!(s.round().phase(), Phase::Placing);
        assert_eq!(s.round().grid().len(), 2);
    }
}
