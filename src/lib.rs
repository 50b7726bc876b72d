//! Pipeworks (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binary, integration
//! tests and benches can write `pipeworks::core::Round` and friends.

pub use pipeworks_adapter as adapter;
pub use pipeworks_core as core;
pub use pipeworks_types as types;
