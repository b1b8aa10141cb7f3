//! framing/encode.rs
//!
//! Frame section layout:
//!
//! ```text
//! [ 'F' (1) ][ field_count (1) ][ f w t (c a b g)? ][ payload (f bytes) ]
//! payload = [ first residual, i32 LE (4) ][ remaining residuals, packed MSB-first ]
//! ```

use tracing::trace;

use crate::constants::{section_tags, FIRST_PIXEL_LEN};
use crate::fields::{FieldError, FieldType, SectionWriter};
use crate::framing::bits::{pack_bits, packed_len};
use crate::framing::delta::delta_encode;
use crate::framing::types::{CptvFrame, FrameData};
use crate::types::CptvError;

/// What the encoder chose for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedFrameInfo {
    pub bits_per_pixel: u8,
    /// Payload bytes, first residual included.
    pub payload_len: usize,
    /// Whole section, tag to last payload byte.
    pub section_len: usize,
}

/// Exact payload size for a frame of `pixel_count` pixels packed at `bits`.
#[inline]
pub fn payload_len(pixel_count: usize, bits: u8) -> usize {
    FIRST_PIXEL_LEN + packed_len(pixel_count.saturating_sub(1), bits)
}

fn check_predecessor(frame: &FrameData, prev: Option<&FrameData>) -> Result<(), CptvError> {
    if let Some(prev) = prev {
        if !prev.same_dimensions(frame) {
            return Err(CptvError::MalformedFrame(format!(
                "predecessor is {}x{}, frame is {}x{}",
                prev.width(),
                prev.height(),
                frame.width(),
                frame.height()
            )));
        }
    }
    Ok(())
}

/// Encode one frame section into `out`, differenced against `prev`.
/// `scratch` holds residuals and is reused across calls.
pub fn encode_frame_into(
    frame: &CptvFrame,
    prev: Option<&FrameData>,
    scratch: &mut Vec<i32>,
    out: &mut Vec<u8>,
) -> Result<EncodedFrameInfo, CptvError> {
    let image = &frame.image_data;
    if image.pixel_count() == 0 {
        return Err(CptvError::MalformedFrame("frame has no pixels".into()));
    }
    check_predecessor(image, prev)?;

    let bits = delta_encode(image, prev, scratch);
    let payload = payload_len(image.pixel_count(), bits);
    let frame_size = u32::try_from(payload).map_err(|_| {
        CptvError::MalformedFrame(format!("payload of {} bytes does not fit a u32", payload))
    })?;

    let start = out.len();
    out.reserve(payload + 32);
    let mut w = SectionWriter::begin(out, section_tags::FRAME);
    put_frame_fields(&mut w, frame, frame_size, bits)
        .map_err(|e| CptvError::MalformedFrame(e.to_string()))?;
    w.finish();

    out.extend_from_slice(&scratch[0].to_le_bytes());
    pack_bits(scratch[1..].iter().copied(), bits, out);

    let info = EncodedFrameInfo {
        bits_per_pixel: bits,
        payload_len: payload,
        section_len: out.len() - start,
    };
    trace!(
        time_on = frame.time_on,
        bits = bits,
        payload = payload,
        "encoded frame"
    );
    Ok(info)
}

fn put_frame_fields(
    w: &mut SectionWriter<'_>,
    frame: &CptvFrame,
    frame_size: u32,
    bits: u8,
) -> Result<(), FieldError> {
    w.put_u32(FieldType::FrameSize, frame_size)?;
    w.put_u8(FieldType::BitsPerPixel, bits)?;
    w.put_u32(FieldType::TimeOn, frame.time_on)?;
    if let Some(t) = frame.last_ffc_time {
        w.put_u32(FieldType::LastFfcTime, t)?;
    }
    if let Some(c) = frame.frame_temp_c {
        w.put_f32(FieldType::FrameTempC, c)?;
    }
    if let Some(c) = frame.last_ffc_temp_c {
        w.put_f32(FieldType::LastFfcTempC, c)?;
    }
    if frame.is_background_frame {
        w.put_flag(FieldType::BackgroundFrame)?;
    }
    Ok(())
}

/// Encode one frame section, differenced against `prev` (zeros when `None`).
pub fn encode_frame(frame: &CptvFrame, prev: Option<&FrameData>) -> Result<Vec<u8>, CptvError> {
    let mut out = Vec::new();
    let mut scratch = Vec::new();
    encode_frame_into(frame, prev, &mut scratch, &mut out)?;
    Ok(out)
}
