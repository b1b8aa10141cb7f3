//! headers/decode.rs
//!
//! Header and footer decoding.
//!
//! Design notes:
//! - One streaming implementation over `Read`; slice decoding wraps it in a cursor.
//! - Unknown field codes are skipped with a warning so newer recorders stay readable.
//! - Absent optional fields keep their defaults; width and height are required.

use std::io::{self, Cursor, Read};

use byteorder::ReadBytesExt;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::compression::is_corrupt;
use crate::constants::{section_tags, CPTV_VERSION, MAGIC_CPTV};
use crate::fields::{read_fields, Field, FieldError, FieldType};
use crate::headers::footer::CptvFooter;
use crate::headers::types::CptvHeader;
use crate::types::CptvError;
use crate::utils::{fmt_bytes, fmt_code};

fn header_io(e: io::Error) -> CptvError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CptvError::MalformedHeader("source ended inside the header".into())
    } else if is_corrupt(&e) {
        CptvError::MalformedHeader(e.to_string())
    } else {
        CptvError::Io(e)
    }
}

fn malformed(e: FieldError) -> CptvError {
    CptvError::MalformedHeader(e.to_string())
}

/// Read and validate magic, version and the header section from a stream.
/// The stream is left positioned at the first frame.
pub fn read_header<R: Read>(r: &mut R) -> Result<CptvHeader, CptvError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic).map_err(header_io)?;
    if magic != MAGIC_CPTV {
        return Err(CptvError::MalformedHeader(format!(
            "invalid magic: expected {}, got {}",
            fmt_bytes(&MAGIC_CPTV),
            fmt_bytes(&magic)
        )));
    }

    let version = r.read_u8().map_err(header_io)?;
    if version != CPTV_VERSION {
        return Err(CptvError::MalformedHeader(format!(
            "unsupported version: {} (expected {})",
            version, CPTV_VERSION
        )));
    }

    let tag = r.read_u8().map_err(header_io)?;
    if tag != section_tags::HEADER {
        return Err(CptvError::MalformedHeader(format!(
            "expected header section {}, got {}",
            fmt_code(section_tags::HEADER),
            fmt_code(tag)
        )));
    }

    let fields = read_fields(r).map_err(header_io)?;
    let header = header_from_fields(fields)?;
    debug!(
        device = %header.device_name,
        width = header.width,
        height = header.height,
        "decoded header"
    );
    Ok(header)
}

/// Decode a header from the start of `buf`, returning it with the number of
/// bytes consumed.
pub fn decode_header(buf: &[u8]) -> Result<(CptvHeader, usize), CptvError> {
    let mut cur = Cursor::new(buf);
    let header = read_header(&mut cur)?;
    Ok((header, cur.position() as usize))
}

fn wire_time(field: &Field) -> Result<DateTime<Utc>, CptvError> {
    let micros = field.as_u64().map_err(malformed)?;
    i64::try_from(micros)
        .ok()
        .and_then(DateTime::from_timestamp_micros)
        .ok_or_else(|| {
            CptvError::MalformedHeader(format!(
                "timestamp {} in field {} is out of range",
                micros,
                fmt_code(field.code)
            ))
        })
}

fn header_from_fields(fields: Vec<Field>) -> Result<CptvHeader, CptvError> {
    let mut h = CptvHeader { width: 0, height: 0, ..Default::default() };
    let mut seen_width = false;
    let mut seen_height = false;

    for field in fields {
        match field.field_type() {
            Some(FieldType::Timestamp) => h.capture_time = wire_time(&field)?,
            Some(FieldType::Width) => {
                h.width = field.as_u32().map_err(malformed)?;
                seen_width = true;
            }
            Some(FieldType::Height) => {
                h.height = field.as_u32().map_err(malformed)?;
                seen_height = true;
            }
            Some(FieldType::Compression) => h.compression = field.as_u8().map_err(malformed)?,
            Some(FieldType::FrameRate) => h.frame_rate = field.as_u8().map_err(malformed)?,
            Some(FieldType::DeviceName) => h.device_name = field.as_text().map_err(malformed)?,

            // Optional fields
            Some(FieldType::Brand) => h.brand = Some(field.as_text().map_err(malformed)?),
            Some(FieldType::Model) => h.model = Some(field.as_text().map_err(malformed)?),
            Some(FieldType::DeviceId) => h.device_id = Some(field.as_u32().map_err(malformed)?),
            Some(FieldType::CameraSerial) => {
                h.camera_serial = Some(field.as_u32().map_err(malformed)?)
            }
            Some(FieldType::FirmwareVersion) => {
                h.firmware = Some(field.as_text().map_err(malformed)?)
            }
            Some(FieldType::MotionConfig) => h.motion_config = field.into_blob(),
            Some(FieldType::PreviewSecs) => {
                h.preview_secs = Some(field.as_u8().map_err(malformed)?)
            }
            Some(FieldType::Latitude) => h.latitude = Some(field.as_f32().map_err(malformed)?),
            Some(FieldType::Longitude) => h.longitude = Some(field.as_f32().map_err(malformed)?),
            Some(FieldType::LocTimestamp) => h.location_timestamp = Some(wire_time(&field)?),
            Some(FieldType::Altitude) => h.altitude = Some(field.as_f32().map_err(malformed)?),
            Some(FieldType::Accuracy) => {
                h.location_accuracy = Some(field.as_f32().map_err(malformed)?)
            }
            Some(FieldType::BackgroundFrame) => {
                h.has_background_frame = field.as_flag().map_err(malformed)?
            }
            _ => {
                warn!(
                    code = %fmt_code(field.code),
                    len = field.value.len(),
                    "skipping unknown header field"
                );
            }
        }
    }

    if !seen_width || !seen_height {
        return Err(CptvError::MalformedHeader(
            "header is missing width or height".into(),
        ));
    }
    h.validate()?;
    Ok(h)
}

fn footer_io(e: io::Error) -> CptvError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CptvError::MalformedFooter("source ended inside the footer".into())
    } else if is_corrupt(&e) {
        CptvError::MalformedFooter(e.to_string())
    } else {
        CptvError::Io(e)
    }
}

/// Read the footer fields. The `'W'` tag must already have been consumed.
pub fn read_footer_body<R: Read>(r: &mut R) -> Result<CptvFooter, CptvError> {
    let fields = read_fields(r).map_err(footer_io)?;
    let bad = |e: FieldError| CptvError::MalformedFooter(e.to_string());

    let mut footer = CptvFooter::default();
    let mut seen_count = false;
    for field in fields {
        match field.field_type() {
            Some(FieldType::NumFrames) => {
                footer.num_frames = field.as_u32().map_err(bad)?;
                seen_count = true;
            }
            Some(FieldType::DurationMs) => footer.duration_ms = field.as_u32().map_err(bad)?,
            Some(FieldType::MinValue) => footer.min_value = Some(field.as_u16().map_err(bad)?),
            Some(FieldType::MaxValue) => footer.max_value = Some(field.as_u16().map_err(bad)?),
            _ => {
                warn!(code = %fmt_code(field.code), "skipping unknown footer field");
            }
        }
    }
    if !seen_count {
        return Err(CptvError::MalformedFooter("footer is missing the frame count".into()));
    }
    Ok(footer)
}

/// Decode a footer section (tag included) from the start of `buf`.
pub fn decode_footer(buf: &[u8]) -> Result<(CptvFooter, usize), CptvError> {
    let mut cur = Cursor::new(buf);
    let tag = cur.read_u8().map_err(footer_io)?;
    if tag != section_tags::FOOTER {
        return Err(CptvError::MalformedFooter(format!(
            "expected footer section {}, got {}",
            fmt_code(section_tags::FOOTER),
            fmt_code(tag)
        )));
    }
    let footer = read_footer_body(&mut cur)?;
    Ok((footer, cur.position() as usize))
}
