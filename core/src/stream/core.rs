//! stream/core.rs
//! Public reencode API: read a CPTV stream, write its frames under a new header.

use std::io::{Read, Write};

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::CodecConfig;
use crate::headers::{CptvFooter, CptvHeader};
use crate::stream::io::{open_input, open_output, InputSource, OutputSink};
use crate::stream::reader::CptvReader;
use crate::stream::writer::CptvWriter;
use crate::telemetry::TelemetrySnapshot;
use crate::types::CptvError;

/// Outcome of one reencode run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReencodeReport {
    /// Header as written, dimensions taken from the source.
    pub header: CptvHeader,
    pub frames: u32,
    /// Footer of the source stream, when it carried one.
    pub source_footer: Option<CptvFooter>,
    /// Encode-side telemetry.
    pub telemetry: TelemetrySnapshot,
}

/// Decode every frame of `source` and re-encode it into `sink` under `header`.
///
/// Width and height always come from the source header; every other header
/// field comes from `header`.
#[instrument(skip_all)]
pub fn reencode<R: Read, W: Write>(
    source: R,
    sink: W,
    header: CptvHeader,
    config: &CodecConfig,
) -> Result<(W, ReencodeReport), CptvError> {
    let mut reader = CptvReader::new(source)?;

    let mut header = header;
    header.width = reader.header().width;
    header.height = reader.header().height;

    let mut writer = CptvWriter::with_config(sink, config.clone())?;
    writer.set_header(header)?;
    writer.write_header()?;

    for frame in &mut reader {
        writer.write_frame(&frame?)?;
    }
    let telemetry = writer.close()?;

    let report = ReencodeReport {
        header: writer.header().clone(),
        frames: writer.frames_written(),
        source_footer: reader.footer().copied(),
        telemetry,
    };
    info!(
        frames = report.frames,
        frames_per_sec = report.telemetry.frames_per_sec,
        pixel_bytes_per_sec = report.telemetry.pixel_bytes_per_sec,
        compression_ratio = report.telemetry.compression_ratio,
        elapsed_ms = report.telemetry.elapsed.as_millis() as u64,
        "reencode complete"
    );

    let sink = writer.into_inner()?;
    Ok((sink, report))
}

/// `reencode` over boxed or in-memory I/O. Returns the output bytes for
/// `OutputSink::Memory`, `None` otherwise.
pub fn reencode_stream(
    input: InputSource,
    output: OutputSink,
    header: CptvHeader,
    config: &CodecConfig,
) -> Result<(Option<Vec<u8>>, ReencodeReport), CptvError> {
    config.validate()?;
    let reader = open_input(input);
    let writer = open_output(output);
    let (writer, report) = reencode(reader, writer, header, config)?;
    Ok((writer.into_bytes(), report))
}
