//! compression/registry.rs
//! Per-codec properties.

use crate::compression::constants::{DEFAULT_LEVEL_GZIP, MAX_LEVEL_GZIP};
use crate::compression::types::{CompressionError, StreamCompression};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecInfo {
    pub name: &'static str,
    pub default_level: u32,
    pub max_level: u32,
}

pub fn resolve(codec: StreamCompression) -> CodecInfo {
    match codec {
        StreamCompression::Identity => CodecInfo { name: "identity", default_level: 0, max_level: 0 },
        StreamCompression::Gzip => CodecInfo {
            name: "gzip",
            default_level: DEFAULT_LEVEL_GZIP,
            max_level: MAX_LEVEL_GZIP,
        },
    }
}

/// Identity ignores the level; gzip accepts `0..=9`.
pub fn validate_level(codec: StreamCompression, level: u32) -> Result<(), CompressionError> {
    let info = resolve(codec);
    if codec != StreamCompression::Identity && level > info.max_level {
        return Err(CompressionError::InvalidLevel {
            codec: info.name,
            level,
            max: info.max_level,
        });
    }
    Ok(())
}
