//! compression/stream.rs
//! `Write`/`Read` adapters that apply stream compression around the container.
//!
//! Notes:
//! - gzip output is deterministic: flate2 writes a zero mtime and no file name.
//! - The reader detects gzip from its magic, so callers need not know how a
//!   file was written.

use std::io::{self, BufReader, Chain, Cursor, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::compression::constants::GZIP_MAGIC;
use crate::compression::registry::{resolve, validate_level};
use crate::compression::types::{CompressionError, StreamCompression};

/// Sink that compresses everything written through it.
pub enum CompressedSink<W: Write> {
    Identity(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> CompressedSink<W> {
    pub fn new(inner: W, codec: StreamCompression, level: u32) -> Result<Self, CompressionError> {
        validate_level(codec, level)?;
        Ok(match codec {
            StreamCompression::Identity => CompressedSink::Identity(inner),
            StreamCompression::Gzip => CompressedSink::Gzip(GzEncoder::new(inner, Compression::new(level))),
        })
    }

    /// gzip at the registry's default level. Infallible counterpart of `new`.
    pub fn gzip(inner: W) -> Self {
        let level = resolve(StreamCompression::Gzip).default_level;
        CompressedSink::Gzip(GzEncoder::new(inner, Compression::new(level)))
    }

    pub fn codec(&self) -> StreamCompression {
        match self {
            CompressedSink::Identity(_) => StreamCompression::Identity,
            CompressedSink::Gzip(_) => StreamCompression::Gzip,
        }
    }

    pub fn get_ref(&self) -> &W {
        match self {
            CompressedSink::Identity(w) => w,
            CompressedSink::Gzip(enc) => enc.get_ref(),
        }
    }

    /// Push a completed section to the caller's sink. gzip keeps its block
    /// open until `finish`, so only identity output is flushed.
    pub fn flush_section(&mut self) -> io::Result<()> {
        match self {
            CompressedSink::Identity(w) => w.flush(),
            CompressedSink::Gzip(_) => Ok(()),
        }
    }

    /// Terminate the compressed stream, flush, and hand back the inner sink.
    pub fn finish(self) -> io::Result<W> {
        let mut inner = match self {
            CompressedSink::Identity(w) => w,
            CompressedSink::Gzip(enc) => enc.finish()?,
        };
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for CompressedSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompressedSink::Identity(w) => w.write(buf),
            CompressedSink::Gzip(enc) => enc.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            CompressedSink::Identity(w) => w.write_all(buf),
            CompressedSink::Gzip(enc) => enc.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompressedSink::Identity(w) => w.flush(),
            CompressedSink::Gzip(enc) => enc.flush(),
        }
    }
}

type Sniffed<R> = Chain<Cursor<Vec<u8>>, R>;

/// Buffered source that undoes whatever stream compression it detects.
pub enum DecompressedSource<R: Read> {
    Identity(BufReader<Sniffed<R>>),
    Gzip(BufReader<GzDecoder<Sniffed<R>>>),
}

impl<R: Read> DecompressedSource<R> {
    /// Peek at the first two bytes and pick the matching decoder. The peeked
    /// bytes are replayed ahead of the rest of the source.
    pub fn detect(mut inner: R) -> io::Result<Self> {
        let mut prefix = Vec::with_capacity(GZIP_MAGIC.len());
        (&mut inner)
            .take(GZIP_MAGIC.len() as u64)
            .read_to_end(&mut prefix)?;

        let is_gzip = prefix[..] == GZIP_MAGIC[..];
        let source = Cursor::new(prefix).chain(inner);
        let codec = if is_gzip { StreamCompression::Gzip } else { StreamCompression::Identity };
        debug!(codec = codec.name(), "detected stream compression");

        Ok(if is_gzip {
            DecompressedSource::Gzip(BufReader::new(GzDecoder::new(source)))
        } else {
            DecompressedSource::Identity(BufReader::new(source))
        })
    }

    pub fn codec(&self) -> StreamCompression {
        match self {
            DecompressedSource::Identity(_) => StreamCompression::Identity,
            DecompressedSource::Gzip(_) => StreamCompression::Gzip,
        }
    }

    /// The caller's source, underneath any buffering.
    pub fn get_ref(&self) -> &R {
        match self {
            DecompressedSource::Identity(r) => r.get_ref().get_ref().1,
            DecompressedSource::Gzip(r) => r.get_ref().get_ref().get_ref().1,
        }
    }
}

impl<R: Read> Read for DecompressedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            DecompressedSource::Identity(r) => r.read(buf),
            DecompressedSource::Gzip(r) => r.read(buf).map_err(gzip_error),
        }
    }
}

/// Tag decoder failures so they can be told apart from source failures.
/// `UnexpectedEof` from the decoder means the gzip trailer never arrived.
fn gzip_error(e: io::Error) -> io::Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            io::Error::new(io::ErrorKind::UnexpectedEof, CompressionError::Truncated)
        }
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => io::Error::new(
            io::ErrorKind::InvalidData,
            CompressionError::Corrupt { reason: e.to_string() },
        ),
        _ => e,
    }
}

/// The compression error carried by an I/O error, if any.
pub fn compression_error(e: &io::Error) -> Option<&CompressionError> {
    e.get_ref().and_then(|inner| inner.downcast_ref::<CompressionError>())
}

/// The compressed stream stopped before its end marker.
pub fn is_truncated(e: &io::Error) -> bool {
    matches!(compression_error(e), Some(CompressionError::Truncated))
}

/// The bytes could not be decoded, as opposed to the source failing.
pub fn is_corrupt(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput)
}
