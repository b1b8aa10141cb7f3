//! stream/writer.rs
//!
//! `CptvWriter`: header, then frames, then close.
//!
//! Design notes:
//! - The state enum owns the sink, so a sink in the wrong phase cannot be written.
//! - Ordering errors leave the state untouched. I/O errors poison the writer.
//! - Only the last frame's pixels are kept, as the predecessor for the next one.
//! - Identity output is flushed after every section; gzip output reaches the
//!   sink as the encoder fills blocks and completes at `close`.

use std::io::Write;
use std::mem;
use std::time::Instant;

use tracing::{debug, warn};

use crate::compression::CompressedSink;
use crate::config::{CodecConfig, HeaderOnlyClose};
use crate::framing::{encode_frame_into, CptvFrame, FrameData};
use crate::headers::{encode_footer, encode_header, CptvFooter, CptvHeader, FooterStats};
use crate::stream::io::CountingWriter;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::CptvError;

type Sink<W> = CompressedSink<CountingWriter<W>>;

enum WriterState<W: Write> {
    Created(Sink<W>),
    HeaderWritten(Sink<W>),
    Closed(W),
    /// A sink write failed; the sink has been dropped.
    Poisoned,
}

/// Observable writer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterPhase {
    Created,
    HeaderWritten,
    Closed,
    Poisoned,
}

pub struct CptvWriter<W: Write> {
    state: WriterState<W>,
    header: CptvHeader,
    config: CodecConfig,
    prev: Option<FrameData>,
    scratch: Vec<i32>,
    buf: Vec<u8>,
    stats: FooterStats,
    footer: Option<CptvFooter>,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl<W: Write> CptvWriter<W> {
    /// Writer with the default configuration (gzip, footer on).
    pub fn new(sink: W) -> Self {
        Self::from_sink(CompressedSink::gzip(CountingWriter::new(sink)), CodecConfig::default())
    }

    pub fn with_config(sink: W, config: CodecConfig) -> Result<Self, CptvError> {
        config.validate()?;
        let sink = CompressedSink::new(
            CountingWriter::new(sink),
            config.compression,
            config.compression_level,
        )?;
        Ok(Self::from_sink(sink, config))
    }

    fn from_sink(sink: Sink<W>, config: CodecConfig) -> Self {
        Self {
            state: WriterState::Created(sink),
            header: CptvHeader::default(),
            config,
            prev: None,
            scratch: Vec::new(),
            buf: Vec::new(),
            stats: FooterStats::new(),
            footer: None,
            counters: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
        }
    }

    pub fn phase(&self) -> WriterPhase {
        match self.state {
            WriterState::Created(_) => WriterPhase::Created,
            WriterState::HeaderWritten(_) => WriterPhase::HeaderWritten,
            WriterState::Closed(_) => WriterPhase::Closed,
            WriterState::Poisoned => WriterPhase::Poisoned,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn header(&self) -> &CptvHeader {
        &self.header
    }

    /// Error for a call that needs the `Created` phase.
    fn require_created(&self) -> Result<(), CptvError> {
        match self.state {
            WriterState::Created(_) => Ok(()),
            WriterState::HeaderWritten(_) => Err(CptvError::HeaderAlreadyWritten),
            WriterState::Closed(_) | WriterState::Poisoned => Err(CptvError::WriterClosed),
        }
    }

    /// Mutable access to the header fields before `write_header`.
    pub fn header_mut(&mut self) -> Result<&mut CptvHeader, CptvError> {
        self.require_created()?;
        Ok(&mut self.header)
    }

    pub fn set_header(&mut self, header: CptvHeader) -> Result<(), CptvError> {
        self.require_created()?;
        self.header = header;
        Ok(())
    }

    /// Validate, encode and write the header.
    pub fn write_header(&mut self) -> Result<(), CptvError> {
        self.require_created()?;

        let t = Instant::now();
        let bytes = encode_header(&self.header)?;
        self.timer.add_stage_time(Stage::Encode, t.elapsed());

        let WriterState::Created(mut sink) = mem::replace(&mut self.state, WriterState::Poisoned)
        else {
            return Err(CptvError::WriterClosed);
        };
        let t = Instant::now();
        sink.write_all(&bytes)?;
        sink.flush_section()?;
        self.timer.add_stage_time(Stage::Write, t.elapsed());
        self.state = WriterState::HeaderWritten(sink);

        self.counters.add_header(bytes.len());
        debug!(
            device = %self.header.device_name,
            width = self.header.width,
            height = self.header.height,
            bytes = bytes.len(),
            "wrote header"
        );
        Ok(())
    }

    /// Encode `frame` against the previously written frame and append it.
    pub fn write_frame(&mut self, frame: &CptvFrame) -> Result<(), CptvError> {
        match self.state {
            WriterState::HeaderWritten(_) => {}
            WriterState::Created(_) => return Err(CptvError::HeaderNotWritten),
            WriterState::Closed(_) | WriterState::Poisoned => return Err(CptvError::WriterClosed),
        }

        if frame.width() != self.header.width as usize
            || frame.height() != self.header.height as usize
        {
            return Err(CptvError::MalformedFrame(format!(
                "frame is {}x{}, header declares {}x{}",
                frame.width(),
                frame.height(),
                self.header.width,
                self.header.height
            )));
        }
        if self.stats.num_frames() > 0 && frame.time_on < self.stats.last_time_on() {
            warn!(
                time_on = frame.time_on,
                previous = self.stats.last_time_on(),
                "frame time_on went backwards"
            );
        }

        let t = Instant::now();
        self.buf.clear();
        let info = encode_frame_into(frame, self.prev.as_ref(), &mut self.scratch, &mut self.buf)?;
        self.timer.add_stage_time(Stage::Encode, t.elapsed());

        self.emit()?;

        self.counters.add_frame(
            frame.image_data.pixel_count(),
            info.bits_per_pixel,
            info.payload_len,
            info.section_len,
        );
        self.stats.record(frame);
        match &mut self.prev {
            Some(prev) => prev.pixels_mut().copy_from_slice(frame.image_data.pixels()),
            None => self.prev = Some(frame.image_data.clone()),
        }
        Ok(())
    }

    /// Write `self.buf` to the sink; a failure poisons the writer.
    fn emit(&mut self) -> Result<(), CptvError> {
        let WriterState::HeaderWritten(sink) = &mut self.state else {
            return Err(CptvError::WriterClosed);
        };
        let t = Instant::now();
        let res = sink.write_all(&self.buf).and_then(|()| sink.flush_section());
        self.timer.add_stage_time(Stage::Write, t.elapsed());
        if let Err(e) = res {
            self.state = WriterState::Poisoned;
            return Err(e.into());
        }
        Ok(())
    }

    /// Write the footer (if configured), finish stream compression and flush.
    pub fn close(&mut self) -> Result<TelemetrySnapshot, CptvError> {
        match self.state {
            WriterState::HeaderWritten(_) => {}
            WriterState::Created(_) => match self.config.header_only_close {
                HeaderOnlyClose::Reject => return Err(CptvError::HeaderNotWritten),
                HeaderOnlyClose::WriteHeader => self.write_header()?,
            },
            WriterState::Closed(_) | WriterState::Poisoned => return Err(CptvError::WriterClosed),
        }

        if self.config.write_footer {
            let footer = self.stats.to_footer();
            self.buf = encode_footer(&footer)?;
            self.emit()?;
            self.counters.add_footer(self.buf.len());
            self.footer = Some(footer);
        }

        let WriterState::HeaderWritten(sink) = mem::replace(&mut self.state, WriterState::Poisoned)
        else {
            return Err(CptvError::WriterClosed);
        };
        let t = Instant::now();
        let counting = sink.finish()?;
        self.timer.add_stage_time(Stage::Compress, t.elapsed());

        self.counters.set_stream_bytes(counting.count());
        self.state = WriterState::Closed(counting.into_inner());
        self.timer.finish();

        let snapshot = TelemetrySnapshot::from(&self.counters, &self.timer);
        debug!(
            frames = snapshot.frames,
            stream_bytes = snapshot.bytes_stream,
            footer = self.footer.is_some(),
            "closed writer"
        );
        Ok(snapshot)
    }

    /// Footer written by `close`, if any.
    pub fn footer(&self) -> Option<&CptvFooter> {
        self.footer.as_ref()
    }

    pub fn frames_written(&self) -> u32 {
        self.stats.num_frames()
    }

    /// Hand back the sink. Only valid after `close`.
    pub fn into_inner(self) -> Result<W, CptvError> {
        match self.state {
            WriterState::Closed(sink) => Ok(sink),
            WriterState::Poisoned => Err(CptvError::WriterClosed),
            _ => Err(CptvError::WriterOpen),
        }
    }
}
