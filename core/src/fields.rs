//! fields.rs
//! Tagged-field primitives shared by the header, frame and footer sections.
//!
//! Wire layout of a section:
//!
//! ```text
//! [ tag (1) ][ field_count (1) ]
//! field_count x [ len (1) ][ code (1) ][ value (len) ]
//! ```
//!
//! All multi-byte numeric values are little-endian.

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::constants::{field_codes, MAX_FIELD_LEN};
use crate::utils::fmt_code;

/// Field registry. Unknown codes are tolerated by readers and skipped.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum FieldType {
    Timestamp       = field_codes::TIMESTAMP,
    Width           = field_codes::WIDTH,
    Height          = field_codes::HEIGHT,
    Compression     = field_codes::COMPRESSION,
    DeviceName      = field_codes::DEVICE_NAME,
    MotionConfig    = field_codes::MOTION_CONFIG,
    PreviewSecs     = field_codes::PREVIEW_SECS,
    Latitude        = field_codes::LATITUDE,
    Longitude       = field_codes::LONGITUDE,
    LocTimestamp    = field_codes::LOC_TIMESTAMP,
    Altitude        = field_codes::ALTITUDE,
    Accuracy        = field_codes::ACCURACY,
    Model           = field_codes::MODEL,
    Brand           = field_codes::BRAND,
    DeviceId        = field_codes::DEVICE_ID,
    FirmwareVersion = field_codes::FIRMWARE_VERSION,
    CameraSerial    = field_codes::CAMERA_SERIAL,
    FrameRate       = field_codes::FRAME_RATE,
    BackgroundFrame = field_codes::BACKGROUND_FRAME,

    NumFrames       = field_codes::NUM_FRAMES,
    DurationMs      = field_codes::DURATION_MS,
    MinValue        = field_codes::MIN_VALUE,
    MaxValue        = field_codes::MAX_VALUE,

    BitsPerPixel    = field_codes::BITS_PER_PIXEL,
    FrameSize       = field_codes::FRAME_SIZE,
    LastFfcTime     = field_codes::LAST_FFC_TIME,
    FrameTempC      = field_codes::FRAME_TEMP_C,
    LastFfcTempC    = field_codes::LAST_FFC_TEMP_C,
    TimeOn          = field_codes::TIME_ON,
}

impl FieldType {
    #[inline(always)]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("field {code} has length {actual}, expected {expected}")]
    LengthMismatch { code: String, expected: usize, actual: usize },

    #[error("field {code} is not valid UTF-8")]
    InvalidUtf8 { code: String },

    #[error("field {code} contains a NUL byte")]
    EmbeddedNul { code: String },

    #[error("field {code} is {len} bytes, limit is {max}")]
    TooLong { code: String, len: usize, max: usize },

    #[error("section holds more than {max} fields")]
    TooManyFields { max: usize },
}

/// One raw field as read from the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub code: u8,
    pub value: Vec<u8>,
}

impl Field {
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::try_from_primitive(self.code).ok()
    }

    fn expect_len(&self, expected: usize) -> Result<&[u8], FieldError> {
        if self.value.len() != expected {
            return Err(FieldError::LengthMismatch {
                code: fmt_code(self.code),
                expected,
                actual: self.value.len(),
            });
        }
        Ok(&self.value)
    }

    pub fn as_u8(&self) -> Result<u8, FieldError> {
        Ok(self.expect_len(1)?[0])
    }

    pub fn as_u16(&self) -> Result<u16, FieldError> {
        self.expect_len(2).map(LittleEndian::read_u16)
    }

    pub fn as_u32(&self) -> Result<u32, FieldError> {
        self.expect_len(4).map(LittleEndian::read_u32)
    }

    pub fn as_u64(&self) -> Result<u64, FieldError> {
        self.expect_len(8).map(LittleEndian::read_u64)
    }

    pub fn as_f32(&self) -> Result<f32, FieldError> {
        self.expect_len(4).map(LittleEndian::read_f32)
    }

    /// Presence flags are written as a single `1` byte.
    pub fn as_flag(&self) -> Result<bool, FieldError> {
        self.as_u8().map(|v| v != 0)
    }

    /// UTF-8 text without embedded NUL bytes.
    pub fn as_text(&self) -> Result<String, FieldError> {
        check_text(self.code, &self.value)?;
        String::from_utf8(self.value.clone())
            .map_err(|_| FieldError::InvalidUtf8 { code: fmt_code(self.code) })
    }

    pub fn into_blob(self) -> Vec<u8> {
        self.value
    }
}

fn check_text(code: u8, bytes: &[u8]) -> Result<(), FieldError> {
    if bytes.contains(&0) {
        return Err(FieldError::EmbeddedNul { code: fmt_code(code) });
    }
    Ok(())
}

/// Read `[len][code][value]`. EOF anywhere inside surfaces as `UnexpectedEof`.
pub fn read_field<R: Read>(r: &mut R) -> io::Result<Field> {
    let len = r.read_u8()?;
    let code = r.read_u8()?;
    let mut value = vec![0u8; len as usize];
    r.read_exact(&mut value)?;
    Ok(Field { code, value })
}

/// Read a section's field count and all of its fields.
/// The section tag must already have been consumed.
pub fn read_fields<R: Read>(r: &mut R) -> io::Result<Vec<Field>> {
    let count = r.read_u8()?;
    (0..count).map(|_| read_field(r)).collect()
}

/// Appends one section (tag, count, fields) to an output buffer.
/// The field count byte is patched on every `put`.
pub struct SectionWriter<'a> {
    out: &'a mut Vec<u8>,
    count_pos: usize,
    count: u8,
}

impl<'a> SectionWriter<'a> {
    pub fn begin(out: &'a mut Vec<u8>, tag: u8) -> Self {
        out.push(tag);
        out.push(0);
        let count_pos = out.len() - 1;
        Self { out, count_pos, count: 0 }
    }

    /// Append a raw field and return the offset of its value in the buffer.
    pub fn put(&mut self, field: FieldType, value: &[u8]) -> Result<usize, FieldError> {
        if value.len() > MAX_FIELD_LEN {
            return Err(FieldError::TooLong {
                code: fmt_code(field.code()),
                len: value.len(),
                max: MAX_FIELD_LEN,
            });
        }
        if self.count == u8::MAX {
            return Err(FieldError::TooManyFields { max: u8::MAX as usize });
        }
        self.out.push(value.len() as u8);
        self.out.push(field.code());
        let offset = self.out.len();
        self.out.extend_from_slice(value);
        self.count += 1;
        self.out[self.count_pos] = self.count;
        Ok(offset)
    }

    pub fn put_u8(&mut self, field: FieldType, v: u8) -> Result<usize, FieldError> {
        self.put(field, &[v])
    }

    pub fn put_u16(&mut self, field: FieldType, v: u16) -> Result<usize, FieldError> {
        self.put(field, &v.to_le_bytes())
    }

    pub fn put_u32(&mut self, field: FieldType, v: u32) -> Result<usize, FieldError> {
        self.put(field, &v.to_le_bytes())
    }

    pub fn put_u64(&mut self, field: FieldType, v: u64) -> Result<usize, FieldError> {
        self.put(field, &v.to_le_bytes())
    }

    pub fn put_f32(&mut self, field: FieldType, v: f32) -> Result<usize, FieldError> {
        self.put(field, &v.to_le_bytes())
    }

    pub fn put_flag(&mut self, field: FieldType) -> Result<usize, FieldError> {
        self.put_u8(field, 1)
    }

    pub fn put_text(&mut self, field: FieldType, s: &str) -> Result<usize, FieldError> {
        check_text(field.code(), s.as_bytes())?;
        self.put(field, s.as_bytes())
    }

    /// Number of fields written so far.
    pub fn finish(self) -> u8 {
        self.count
    }
}
