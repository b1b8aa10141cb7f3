//! telemetry/counters.rs
//! Mutable counters collected while frames are encoded or decoded.
//!
//! Converted into an immutable `TelemetrySnapshot` at the end of a run.

use std::ops::AddAssign;

use crate::constants::{NARROW_BITS, WIDE_BITS};

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryCounters {
    pub frames: u64,
    /// Frames packed at 8, 16, and any wider bit width.
    pub frames_8bit: u64,
    pub frames_16bit: u64,
    pub frames_wide: u64,
    /// Raw pixel bytes (2 per pixel).
    pub bytes_pixels: u64,
    /// Packed payload bytes, first residual included.
    pub bytes_payload: u64,
    /// Magic, section tags and fields: everything that is not payload.
    pub bytes_overhead: u64,
    /// Bytes on the far side of stream compression.
    pub bytes_stream: u64,
}

impl TelemetryCounters {
    /// Magic, version and header section.
    pub fn add_header(&mut self, header_len: usize) {
        self.bytes_overhead += header_len as u64;
    }

    /// One frame section.
    ///
    /// - `pixel_count`: pixels in the frame
    /// - `bits_per_pixel`: packing width chosen or found
    /// - `payload_len`: payload bytes
    /// - `section_len`: whole section, payload included
    pub fn add_frame(
        &mut self,
        pixel_count: usize,
        bits_per_pixel: u8,
        payload_len: usize,
        section_len: usize,
    ) {
        self.frames += 1;
        match bits_per_pixel {
            b if b <= NARROW_BITS => self.frames_8bit += 1,
            b if b <= WIDE_BITS => self.frames_16bit += 1,
            _ => self.frames_wide += 1,
        }
        self.bytes_pixels += pixel_count as u64 * 2;
        self.bytes_payload += payload_len as u64;
        self.bytes_overhead += section_len.saturating_sub(payload_len) as u64;
    }

    pub fn add_footer(&mut self, footer_len: usize) {
        self.bytes_overhead += footer_len as u64;
    }

    pub fn set_stream_bytes(&mut self, n: u64) {
        self.bytes_stream = n;
    }

    /// Uncompressed container size.
    pub fn container_bytes(&self) -> u64 {
        self.bytes_payload + self.bytes_overhead
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.frames += other.frames;
        self.frames_8bit += other.frames_8bit;
        self.frames_16bit += other.frames_16bit;
        self.frames_wide += other.frames_wide;
        self.bytes_pixels += other.bytes_pixels;
        self.bytes_payload += other.bytes_payload;
        self.bytes_overhead += other.bytes_overhead;
        self.bytes_stream += other.bytes_stream;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
