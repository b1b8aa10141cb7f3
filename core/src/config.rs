//! config.rs
//! Codec configuration shared by the writer and `reencode`.

use serde::{Deserialize, Serialize};

use crate::compression::{validate_level, StreamCompression, DEFAULT_LEVEL_GZIP};
use crate::types::CptvError;

/// What `close()` does on a writer whose header was never written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderOnlyClose {
    /// Fail with `HeaderNotWritten`.
    #[default]
    Reject,
    /// Write the header, then close: a valid file with no frames.
    WriteHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub compression: StreamCompression,
    /// gzip level, `0..=9`. Ignored for identity.
    pub compression_level: u32,
    /// Append the `'W'` totals section on close.
    pub write_footer: bool,
    pub header_only_close: HeaderOnlyClose,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression: StreamCompression::Gzip,
            compression_level: DEFAULT_LEVEL_GZIP,
            write_footer: true,
            header_only_close: HeaderOnlyClose::Reject,
        }
    }
}

impl CodecConfig {
    /// Uncompressed output with a footer.
    pub fn identity() -> Self {
        Self { compression: StreamCompression::Identity, ..Default::default() }
    }

    /// Parse from JSON; missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, CptvError> {
        let config: CodecConfig =
            serde_json::from_str(s).map_err(|e| CptvError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CptvError> {
        validate_level(self.compression, self.compression_level)?;
        Ok(())
    }
}
