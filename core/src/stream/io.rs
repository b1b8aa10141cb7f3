//! stream/io.rs
//! Normalized I/O for the reencode entry points, plus byte-counting adapters.

use std::io::{self, Cursor, Read, Write};

/// Canonical input abstraction.
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    Memory(Vec<u8>),
}

/// Canonical output abstraction.
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    /// Collect the output and hand it back to the caller.
    Memory,
}

/// Normalize an input source into a boxed reader.
pub fn open_input(src: InputSource) -> Box<dyn Read + Send> {
    match src {
        InputSource::Reader(r) => r,
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    }
}

/// An opened `OutputSink`.
pub enum OpenedOutput {
    Writer(Box<dyn Write + Send>),
    Memory(Vec<u8>),
}

impl OpenedOutput {
    /// Collected bytes for `OutputSink::Memory`, `None` for caller writers.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            OpenedOutput::Writer(_) => None,
            OpenedOutput::Memory(buf) => Some(buf),
        }
    }
}

impl Write for OpenedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OpenedOutput::Writer(w) => w.write(buf),
            OpenedOutput::Memory(v) => v.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OpenedOutput::Writer(w) => w.flush(),
            OpenedOutput::Memory(_) => Ok(()),
        }
    }
}

pub fn open_output(sink: OutputSink) -> OpenedOutput {
    match sink {
        OutputSink::Writer(w) => OpenedOutput::Writer(w),
        OutputSink::Memory => OpenedOutput::Memory(Vec::new()),
    }
}

/// Counts bytes accepted by the inner writer.
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Counts bytes returned by the inner reader.
pub struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
