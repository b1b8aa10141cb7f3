//! compression/types.rs
//! Codec enum and compression errors.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::constants::codec_ids;
use crate::utils::enum_name_or_hex;

/// Whole-stream compression applied after container encoding.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamCompression {
    /// Raw container bytes. Useful for inspection and debugging.
    Identity = codec_ids::IDENTITY,
    /// gzip, as used by every CPTV recorder.
    Gzip     = codec_ids::GZIP,
}

impl Default for StreamCompression {
    fn default() -> Self {
        StreamCompression::Gzip
    }
}

impl StreamCompression {
    #[inline(always)]
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(raw: u8) -> Result<Self, CompressionError> {
        Self::try_from_primitive(raw).map_err(|_| CompressionError::UnknownCodec { raw })
    }

    pub fn name(self) -> &'static str {
        match self {
            StreamCompression::Identity => "identity",
            StreamCompression::Gzip => "gzip",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompressionError {
    #[error("unknown stream compression: {}", enum_name_or_hex::<StreamCompression>(*raw))]
    UnknownCodec { raw: u8 },

    #[error("{codec} level {level} outside 0..={max}")]
    InvalidLevel { codec: &'static str, level: u32, max: u32 },

    #[error("compressed stream ended before its trailer")]
    Truncated,

    #[error("corrupt compressed stream: {reason}")]
    Corrupt { reason: String },
}
