//! stream/reader.rs
//!
//! `CptvReader`: eager header, lazy forward-only frames.
//!
//! Design notes:
//! - Stream compression is detected from the first bytes of the source.
//! - Each call decodes exactly one section; memory stays flat in the frame count.
//! - The first error ends the sequence; later calls return `None`.

use std::io::{self, Read};
use std::time::Instant;

use byteorder::ReadBytesExt;
use tracing::debug;

use crate::compression::{is_corrupt, is_truncated, DecompressedSource, StreamCompression};
use crate::constants::section_tags;
use crate::framing::{read_frame_body, CptvFrame, FrameData};
use crate::headers::{read_footer_body, read_header, CptvFooter, CptvHeader};
use crate::stream::io::CountingReader;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::CptvError;
use crate::utils::fmt_code;

type Source<R> = CountingReader<DecompressedSource<CountingReader<R>>>;

pub struct CptvReader<R: Read> {
    /// Outer counter sees container bytes, inner counter sees stream bytes.
    source: Source<R>,
    header: CptvHeader,
    footer: Option<CptvFooter>,
    prev: Option<FrameData>,
    payload: Vec<u8>,
    frames_read: u32,
    done: bool,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

/// One byte, or `None` when the source ends cleanly between sections.
/// A compressed stream cut before its trailer is not a clean end.
fn read_tag<R: Read>(r: &mut R) -> Result<Option<u8>, CptvError> {
    match r.read_u8() {
        Ok(tag) => Ok(Some(tag)),
        Err(e) if is_truncated(&e) => Err(CptvError::TruncatedFrame(e.to_string())),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) if is_corrupt(&e) => Err(CptvError::MalformedFrame(e.to_string())),
        Err(e) => Err(CptvError::Io(e)),
    }
}

impl<R: Read> CptvReader<R> {
    /// Detect stream compression and parse the header.
    pub fn new(source: R) -> Result<Self, CptvError> {
        let mut timer = TelemetryTimer::new();
        let t = Instant::now();
        let mut source =
            CountingReader::new(DecompressedSource::detect(CountingReader::new(source))?);
        let header = read_header(&mut source)?;
        timer.add_stage_time(Stage::Read, t.elapsed());

        let mut counters = TelemetryCounters::default();
        counters.add_header(source.count() as usize);
        debug!(
            codec = source.get_ref().codec().name(),
            device = %header.device_name,
            "opened reader"
        );

        Ok(Self {
            source,
            header,
            footer: None,
            prev: None,
            payload: Vec::new(),
            frames_read: 0,
            done: false,
            counters,
            timer,
        })
    }

    pub fn header(&self) -> &CptvHeader {
        &self.header
    }

    /// Footer, once the sequence has reached it.
    pub fn footer(&self) -> Option<&CptvFooter> {
        self.footer.as_ref()
    }

    pub fn frames_read(&self) -> u32 {
        self.frames_read
    }

    pub fn stream_compression(&self) -> StreamCompression {
        self.source.get_ref().codec()
    }

    /// Decode the next frame. `Ok(None)` at the end of the sequence, and
    /// after any error.
    pub fn next_frame(&mut self) -> Result<Option<CptvFrame>, CptvError> {
        if self.done {
            return Ok(None);
        }
        match self.read_section() {
            Ok(Some(frame)) => Ok(Some(frame)),
            Ok(None) => {
                self.done = true;
                self.timer.finish();
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                self.timer.finish();
                Err(e)
            }
        }
    }

    fn read_section(&mut self) -> Result<Option<CptvFrame>, CptvError> {
        let start = self.source.count();
        let Some(tag) = read_tag(&mut self.source)? else {
            return Ok(None);
        };

        match tag {
            section_tags::FRAME => {
                let t = Instant::now();
                let (frame, info) = read_frame_body(
                    &mut self.source,
                    self.prev.as_ref(),
                    self.header.width as usize,
                    self.header.height as usize,
                    &mut self.payload,
                )?;
                self.timer.add_stage_time(Stage::Decode, t.elapsed());

                self.counters.add_frame(
                    frame.image_data.pixel_count(),
                    info.bits_per_pixel,
                    info.payload_len,
                    (self.source.count() - start) as usize,
                );
                self.frames_read += 1;
                match &mut self.prev {
                    Some(prev) => prev.pixels_mut().copy_from_slice(frame.image_data.pixels()),
                    None => self.prev = Some(frame.image_data.clone()),
                }
                Ok(Some(frame))
            }
            section_tags::FOOTER => {
                let t = Instant::now();
                let footer = read_footer_body(&mut self.source)?;
                if footer.num_frames != self.frames_read {
                    return Err(CptvError::MalformedFooter(format!(
                        "footer counts {} frames, stream holds {}",
                        footer.num_frames, self.frames_read
                    )));
                }
                if read_tag(&mut self.source)?.is_some() {
                    return Err(CptvError::MalformedFooter(
                        "bytes follow the footer".into(),
                    ));
                }
                self.timer.add_stage_time(Stage::Read, t.elapsed());
                self.counters.add_footer((self.source.count() - start) as usize);
                debug!(
                    frames = footer.num_frames,
                    duration_ms = footer.duration_ms,
                    "read footer"
                );
                self.footer = Some(footer);
                Ok(None)
            }
            other => Err(CptvError::MalformedFrame(format!(
                "unknown section tag {}",
                fmt_code(other)
            ))),
        }
    }

    /// Decode counters and timings so far.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        let mut counters = self.counters.clone();
        counters.set_stream_bytes(self.source.get_ref().get_ref().count());
        TelemetrySnapshot::from(&counters, &self.timer)
    }
}

impl<R: Read> Iterator for CptvReader<R> {
    type Item = Result<CptvFrame, CptvError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}
