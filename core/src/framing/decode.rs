//! framing/decode.rs
//!
//! Frame section decoding. The streaming reader calls `read_frame_body` after
//! it has consumed the section tag; `decode_frame` is the slice form.

use std::io::{self, Cursor, Read};
use std::iter;

use byteorder::ReadBytesExt;
use tracing::{trace, warn};

use crate::compression::is_corrupt;
use crate::constants::{section_tags, FIRST_PIXEL_LEN, MAX_BITS_PER_PIXEL};
use crate::fields::{read_fields, FieldError, FieldType};
use crate::framing::bits::BitUnpacker;
use crate::framing::delta::delta_decode;
use crate::framing::encode::payload_len;
use crate::framing::types::{CptvFrame, FrameData};
use crate::types::CptvError;
use crate::utils::fmt_code;

/// What the decoder found in one frame section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrameInfo {
    pub bits_per_pixel: u8,
    pub payload_len: usize,
}

fn truncated(e: io::Error) -> CptvError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CptvError::TruncatedFrame("source ended inside a frame".into())
    } else if is_corrupt(&e) {
        CptvError::MalformedFrame(e.to_string())
    } else {
        CptvError::Io(e)
    }
}

fn malformed(e: FieldError) -> CptvError {
    CptvError::MalformedFrame(e.to_string())
}

/// Frame fields before the payload.
#[derive(Debug, Default)]
struct FrameFields {
    frame_size: Option<u32>,
    bits_per_pixel: Option<u8>,
    time_on: u32,
    last_ffc_time: Option<u32>,
    frame_temp_c: Option<f32>,
    last_ffc_temp_c: Option<f32>,
    is_background_frame: bool,
}

fn parse_fields<R: Read>(r: &mut R) -> Result<FrameFields, CptvError> {
    let mut ff = FrameFields::default();
    for field in read_fields(r).map_err(truncated)? {
        match field.field_type() {
            Some(FieldType::FrameSize) => ff.frame_size = Some(field.as_u32().map_err(malformed)?),
            Some(FieldType::BitsPerPixel) => {
                ff.bits_per_pixel = Some(field.as_u8().map_err(malformed)?)
            }
            Some(FieldType::TimeOn) => ff.time_on = field.as_u32().map_err(malformed)?,
            Some(FieldType::LastFfcTime) => {
                ff.last_ffc_time = Some(field.as_u32().map_err(malformed)?)
            }
            Some(FieldType::FrameTempC) => {
                ff.frame_temp_c = Some(field.as_f32().map_err(malformed)?)
            }
            Some(FieldType::LastFfcTempC) => {
                ff.last_ffc_temp_c = Some(field.as_f32().map_err(malformed)?)
            }
            Some(FieldType::BackgroundFrame) => {
                ff.is_background_frame = field.as_flag().map_err(malformed)?
            }
            _ => warn!(code = %fmt_code(field.code), "skipping unknown frame field"),
        }
    }
    Ok(ff)
}

/// Read one frame section whose `'F'` tag has already been consumed.
///
/// `payload` is a reusable buffer; `prev` is the previously decoded frame,
/// `None` for the first frame of a stream.
pub fn read_frame_body<R: Read>(
    r: &mut R,
    prev: Option<&FrameData>,
    width: usize,
    height: usize,
    payload: &mut Vec<u8>,
) -> Result<(CptvFrame, DecodedFrameInfo), CptvError> {
    let ff = parse_fields(r)?;

    let frame_size = ff
        .frame_size
        .ok_or_else(|| CptvError::MalformedFrame("frame size field is missing".into()))?;
    let bits = ff
        .bits_per_pixel
        .ok_or_else(|| CptvError::MalformedFrame("bits-per-pixel field is missing".into()))?;
    if bits == 0 || bits > MAX_BITS_PER_PIXEL {
        return Err(CptvError::MalformedFrame(format!(
            "bits per pixel {} outside 1..={}",
            bits, MAX_BITS_PER_PIXEL
        )));
    }

    let pixel_count = width * height;
    if pixel_count == 0 {
        return Err(CptvError::MalformedFrame("frame has no pixels".into()));
    }
    if let Some(prev) = prev {
        if prev.width() != width || prev.height() != height {
            return Err(CptvError::MalformedFrame(format!(
                "predecessor is {}x{}, frame is {}x{}",
                prev.width(),
                prev.height(),
                width,
                height
            )));
        }
    }

    let expected = payload_len(pixel_count, bits);
    if frame_size as usize != expected {
        return Err(CptvError::MalformedFrame(format!(
            "payload is {} bytes, {} pixels at {} bits need {}",
            frame_size, pixel_count, bits, expected
        )));
    }

    // Grow with the bytes actually present, not the declared size.
    payload.clear();
    r.by_ref().take(expected as u64).read_to_end(payload).map_err(truncated)?;
    if payload.len() != expected {
        return Err(CptvError::TruncatedFrame(format!(
            "payload ended after {} of {} bytes",
            payload.len(),
            expected
        )));
    }

    let mut first = [0u8; FIRST_PIXEL_LEN];
    first.copy_from_slice(&payload[..FIRST_PIXEL_LEN]);
    let residuals = iter::once(i32::from_le_bytes(first))
        .chain(BitUnpacker::new(&payload[FIRST_PIXEL_LEN..], bits).take(pixel_count - 1));
    let image_data = delta_decode(residuals, prev, width, height)?;

    trace!(time_on = ff.time_on, bits = bits, payload = expected, "decoded frame");
    let frame = CptvFrame {
        time_on: ff.time_on,
        last_ffc_time: ff.last_ffc_time,
        frame_temp_c: ff.frame_temp_c,
        last_ffc_temp_c: ff.last_ffc_temp_c,
        is_background_frame: ff.is_background_frame,
        image_data,
    };
    Ok((frame, DecodedFrameInfo { bits_per_pixel: bits, payload_len: expected }))
}

/// Decode one frame section (tag included) from the start of `buf`,
/// returning the frame and the number of bytes consumed.
pub fn decode_frame(
    buf: &[u8],
    prev: Option<&FrameData>,
    width: usize,
    height: usize,
) -> Result<(CptvFrame, usize), CptvError> {
    let mut cur = Cursor::new(buf);
    let tag = cur.read_u8().map_err(truncated)?;
    if tag != section_tags::FRAME {
        return Err(CptvError::MalformedFrame(format!(
            "expected frame section {}, got {}",
            fmt_code(section_tags::FRAME),
            fmt_code(tag)
        )));
    }
    let mut payload = Vec::new();
    let (frame, _) = read_frame_body(&mut cur, prev, width, height, &mut payload)?;
    Ok((frame, cur.position() as usize))
}
