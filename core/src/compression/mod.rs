//! compression/mod.rs
//! Lossless compression of the whole container stream.
//!
//! Notes:
//! - Frames are already delta coded; gzip removes the remaining redundancy.
//! - Identity exists for inspecting raw container bytes.

pub mod constants;
pub mod types;
pub mod registry;
pub mod stream;

pub use constants::*;
pub use types::*;
pub use registry::*;
pub use stream::*;
