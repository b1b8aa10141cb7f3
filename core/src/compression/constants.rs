//! compression/constants.rs
//! Stable stream compression ids and level bounds.

/// Stable ids (u8) for configuration and diagnostics.
pub mod codec_ids {
    pub const IDENTITY: u8 = 0x00;
    pub const GZIP: u8     = 0x01;
}

/// gzip member magic (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Balanced default, same as `flate2::Compression::default()`.
pub const DEFAULT_LEVEL_GZIP: u32 = 6;
pub const MAX_LEVEL_GZIP: u32 = 9;
