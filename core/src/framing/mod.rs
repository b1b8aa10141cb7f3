//! framing/mod.rs
//! Per-frame codec: snake-order delta residuals, fixed-width bit packing and
//! the `'F'` section that carries them.

pub mod types;
pub mod bits;
pub mod delta;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
