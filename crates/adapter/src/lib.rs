//! Adapter - drive a pipe round over a line-delimited JSON stream
//!
//! Lets a script or external agent play a round without a renderer. The
//! binary wires it to stdin/stdout; tests wire it to an in-memory duplex.
//!
//! # Protocol Overview
//!
//! 1. **Handshake**: client sends `hello`, session answers `welcome` plus an `observation`
//! 2. **Commanding**: `place`, `start_flow`, `pause`, `restart`, `observe`
//! 3. **Events**: placement, countdown, flow steps and the final result are pushed as `event`
//!
//! Every client message carries a `seq` that must increase. Replies echo it.
//!
//! # Message Types
//!
//! ## Client → Session
//!
//! - **hello**: optional client info
//! - **place**: `col`/`row` of the target cell; the queue head is placed there
//! - **start_flow**: skip the rest of the countdown
//! - **pause**: toggle pause while placing
//! - **restart**: new round, optional `seed`
//! - **observe**: request a full snapshot
//!
//! ## Session → Client
//!
//! - **welcome**: protocol version and grid geometry
//! - **ack**: command accepted; `ignored` names a benign no-op
//! - **error**: `code` and `message`, with `seq` when it could be recovered
//! - **observation**: full round snapshot
//! - **event**: one round event
//!
//! # Example
//!
//! ```text
//! -> {"type":"hello","seq":1}
//! <- {"type":"welcome","seq":1,"protocol_version":"1.0.0","columns":10,"rows":8,"tile_size":64,"queue_len":5}
//! <- {"type":"observation","seq":1,"round_id":0,"phase":"placing",...}
//! -> {"type":"place","seq":2,"col":3,"row":2}
//! <- {"type":"ack","seq":2}
//! <- {"type":"event","event":"tile_placed","tile":{"variant":"turn","orientation":90,"col":3,"row":2}}
//! ```
//!
//! See [`config`] for the environment variables the binary reads.

pub mod config;
pub mod protocol;
pub mod session;

pub use pipeworks_core as core;
pub use pipeworks_types as types;

pub use config::SessionConfig;
pub use protocol::*;
pub use session::{run_session, Session};
