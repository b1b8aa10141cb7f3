use std::io;
use thiserror::Error;

use crate::compression::CompressionError;

/// Unified codec error covering container structure, writer ordering,
/// compression configuration and I/O.
/// - `From<T>` impls enable `?` across the reader/writer.
/// - Messages aim to be stable and contextual for logs.
#[derive(Debug, Error)]
pub enum CptvError {
    /// Header block does not match the expected schema.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Frame section is structurally invalid or decodes to the wrong pixel count.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Source ended in the middle of a frame section.
    #[error("truncated frame: {0}")]
    TruncatedFrame(String),

    /// Footer disagrees with the frames that precede it.
    #[error("malformed footer: {0}")]
    MalformedFooter(String),

    /// `write_frame`/`close` called before `write_header`.
    #[error("header has not been written")]
    HeaderNotWritten,

    /// Header mutated or written after `write_header`.
    #[error("header has already been written")]
    HeaderAlreadyWritten,

    /// Any call after `close`, or after an I/O failure poisoned the writer.
    #[error("writer is closed")]
    WriterClosed,

    /// Sink requested before the writer was closed.
    #[error("writer must be closed before its sink can be taken")]
    WriterOpen,

    /// Codec configuration could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Stream compression configuration error.
    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),

    /// I/O error from the caller's sink or source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CptvError {
    /// True for errors raised by the writer's state machine.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            CptvError::HeaderNotWritten
                | CptvError::HeaderAlreadyWritten
                | CptvError::WriterClosed
                | CptvError::WriterOpen
        )
    }
}

pub type Result<T, E = CptvError> = std::result::Result<T, E>;
