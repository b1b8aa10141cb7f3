//! headers/encode.rs
//!
//! Header and footer encoding.
//!
//! Design notes:
//! - Field order is fixed so identical headers always produce identical bytes.
//! - Optional fields are written only when present.
//! - Validation runs before any byte is produced.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::constants::{section_tags, CPTV_VERSION, MAGIC_CPTV};
use crate::fields::{FieldError, FieldType, SectionWriter};
use crate::headers::footer::CptvFooter;
use crate::headers::types::CptvHeader;
use crate::types::CptvError;

/// Serialize a header, including the container magic and version.
///
/// Layout:
///
/// ```text
/// [ "CPTV" (4) ][ version (1) ][ 'H' (1) ][ field_count (1) ][ fields ... ]
/// ```
pub fn encode_header(h: &CptvHeader) -> Result<Vec<u8>, CptvError> {
    h.validate()?;

    let mut out = Vec::with_capacity(96 + h.motion_config.len());
    out.extend_from_slice(&MAGIC_CPTV);
    out.push(CPTV_VERSION);

    let mut w = SectionWriter::begin(&mut out, section_tags::HEADER);
    put_header_fields(&mut w, h).map_err(|e| CptvError::MalformedHeader(e.to_string()))?;
    let count = w.finish();

    trace!(fields = count, bytes = out.len(), "encoded header");
    Ok(out)
}

fn put_header_fields(w: &mut SectionWriter<'_>, h: &CptvHeader) -> Result<(), FieldError> {
    // Mandatory fields first.
    w.put_u64(FieldType::Timestamp, wire_micros(&h.capture_time))?;
    w.put_u32(FieldType::Width, h.width)?;
    w.put_u32(FieldType::Height, h.height)?;
    w.put_u8(FieldType::Compression, h.compression)?;
    w.put_u8(FieldType::FrameRate, h.frame_rate)?;
    w.put_text(FieldType::DeviceName, &h.device_name)?;

    if let Some(brand) = &h.brand {
        w.put_text(FieldType::Brand, brand)?;
    }
    if let Some(model) = &h.model {
        w.put_text(FieldType::Model, model)?;
    }
    if let Some(device_id) = h.device_id {
        w.put_u32(FieldType::DeviceId, device_id)?;
    }
    if let Some(serial) = h.camera_serial {
        w.put_u32(FieldType::CameraSerial, serial)?;
    }
    if let Some(firmware) = &h.firmware {
        w.put_text(FieldType::FirmwareVersion, firmware)?;
    }
    if !h.motion_config.is_empty() {
        w.put(FieldType::MotionConfig, &h.motion_config)?;
    }
    if let Some(preview_secs) = h.preview_secs {
        w.put_u8(FieldType::PreviewSecs, preview_secs)?;
    }
    if let Some(latitude) = h.latitude {
        w.put_f32(FieldType::Latitude, latitude)?;
    }
    if let Some(longitude) = h.longitude {
        w.put_f32(FieldType::Longitude, longitude)?;
    }
    if let Some(ts) = &h.location_timestamp {
        w.put_u64(FieldType::LocTimestamp, wire_micros(ts))?;
    }
    if let Some(altitude) = h.altitude {
        w.put_f32(FieldType::Altitude, altitude)?;
    }
    if let Some(accuracy) = h.location_accuracy {
        w.put_f32(FieldType::Accuracy, accuracy)?;
    }
    if h.has_background_frame {
        w.put_flag(FieldType::BackgroundFrame)?;
    }
    Ok(())
}

/// `validate()` has already rejected pre-epoch times.
#[inline]
fn wire_micros(ts: &DateTime<Utc>) -> u64 {
    ts.timestamp_micros().max(0) as u64
}

/// Serialize the trailing totals section.
///
/// ```text
/// [ 'W' (1) ][ field_count (1) ][ J d (Q K)? ]
/// ```
pub fn encode_footer(f: &CptvFooter) -> Result<Vec<u8>, CptvError> {
    let mut out = Vec::with_capacity(32);
    let mut w = SectionWriter::begin(&mut out, section_tags::FOOTER);
    put_footer_fields(&mut w, f).map_err(|e| CptvError::MalformedFooter(e.to_string()))?;
    w.finish();
    Ok(out)
}

fn put_footer_fields(w: &mut SectionWriter<'_>, f: &CptvFooter) -> Result<(), FieldError> {
    w.put_u32(FieldType::NumFrames, f.num_frames)?;
    w.put_u32(FieldType::DurationMs, f.duration_ms)?;
    if let Some(min) = f.min_value {
        w.put_u16(FieldType::MinValue, min)?;
    }
    if let Some(max) = f.max_value {
        w.put_u16(FieldType::MaxValue, max)?;
    }
    Ok(())
}
