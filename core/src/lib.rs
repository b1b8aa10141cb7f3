//! cptv-core
//!
//! Encoder and decoder for CPTV v2 thermal video.
//! Streams over caller-supplied `Read`/`Write`; no file handling.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;
pub mod fields;

// Codec layers
pub mod compression;
pub mod headers;
pub mod framing;
pub mod telemetry;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::StreamCompression;
    pub use crate::config::{CodecConfig, HeaderOnlyClose};
    pub use crate::framing::{CptvFrame, FrameData};
    pub use crate::headers::{CptvFooter, CptvHeader};
    pub use crate::stream::{reencode, reencode_stream, CptvReader, CptvWriter, InputSource, OutputSink};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{CptvError, Result};
}
