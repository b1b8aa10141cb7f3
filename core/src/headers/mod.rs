//! headers/mod.rs
//! Container header and footer sections.
//!
//! Notes:
//! - The header opens every stream: magic, version, then the `'H'` section.
//! - The footer is an optional `'W'` section holding totals for the frames before it.
//! - Both sections use the tagged-field layout from `fields`.

pub mod types;
pub mod footer;
pub mod encode;
pub mod decode;

pub use types::*;
pub use footer::*;
pub use encode::*;
pub use decode::*;
