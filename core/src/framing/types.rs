//! framing/types.rs
//! Decoded frame model.

use std::ops::{Index, IndexMut};

use crate::types::CptvError;

/// One thermal image, row-major, `width * height` raw sensor values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl FrameData {
    /// Zero-filled image.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0; width * height] }
    }

    /// Wrap an existing row-major pixel buffer.
    pub fn from_pixels(width: usize, height: usize, data: Vec<u16>) -> Result<Self, CptvError> {
        if data.len() != width * height {
            return Err(CptvError::MalformedFrame(format!(
                "{} pixels do not fill a {}x{} frame",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    pub fn pixels(&self) -> &[u16] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    pub fn same_dimensions(&self, other: &FrameData) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Smallest and largest pixel, `None` for an empty image.
    pub fn min_max(&self) -> Option<(u16, u16)> {
        let first = *self.data.first()?;
        Some(
            self.data
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}

/// Row access: `frame[y][x]`.
impl Index<usize> for FrameData {
    type Output = [u16];

    fn index(&self, row: usize) -> &[u16] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }
}

impl IndexMut<usize> for FrameData {
    fn index_mut(&mut self, row: usize) -> &mut [u16] {
        let start = row * self.width;
        &mut self.data[start..start + self.width]
    }
}

/// One captured frame: pixels plus per-frame sensor telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct CptvFrame {
    /// Milliseconds since camera power-on.
    pub time_on: u32,
    /// `time_on` of the last flat-field correction.
    pub last_ffc_time: Option<u32>,
    pub frame_temp_c: Option<f32>,
    pub last_ffc_temp_c: Option<f32>,
    pub is_background_frame: bool,
    pub image_data: FrameData,
}

impl CptvFrame {
    pub fn new(time_on: u32, image_data: FrameData) -> Self {
        Self {
            time_on,
            last_ffc_time: None,
            frame_temp_c: None,
            last_ffc_temp_c: None,
            is_background_frame: false,
            image_data,
        }
    }

    pub fn width(&self) -> usize {
        self.image_data.width()
    }

    pub fn height(&self) -> usize {
        self.image_data.height()
    }
}
