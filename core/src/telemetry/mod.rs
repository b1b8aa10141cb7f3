//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for the reader and writer.
//!
//! Notes:
//! - Counters are plain integers owned by one reader or writer; nothing is shared.
//! - A snapshot is taken when a writer closes, or on demand from a reader.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
