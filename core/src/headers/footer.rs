//! headers/footer.rs
//! Trailing totals section and the running statistics that produce it.

use serde::{Deserialize, Serialize};

use crate::framing::types::CptvFrame;

/// Totals written after the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CptvFooter {
    pub num_frames: u32,
    /// Last `time_on` minus first `time_on`, saturating.
    pub duration_ms: u32,
    /// Pixel range over every written frame. `None` when no frames were written.
    pub min_value: Option<u16>,
    pub max_value: Option<u16>,
}

/// Incremental footer builder, fed one frame at a time by the writer.
#[derive(Debug, Clone, Default)]
pub struct FooterStats {
    num_frames: u32,
    first_time_on: Option<u32>,
    last_time_on: u32,
    range: Option<(u16, u16)>,
}

impl FooterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: &CptvFrame) {
        self.num_frames = self.num_frames.saturating_add(1);
        if self.first_time_on.is_none() {
            self.first_time_on = Some(frame.time_on);
        }
        self.last_time_on = frame.time_on;

        if let Some((lo, hi)) = frame.image_data.min_max() {
            self.range = Some(match self.range {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
    }

    pub fn num_frames(&self) -> u32 {
        self.num_frames
    }

    /// `time_on` of the most recent frame, `0` before any frame.
    pub fn last_time_on(&self) -> u32 {
        self.last_time_on
    }

    pub fn to_footer(&self) -> CptvFooter {
        let duration_ms = self
            .first_time_on
            .map(|first| self.last_time_on.saturating_sub(first))
            .unwrap_or(0);
        CptvFooter {
            num_frames: self.num_frames,
            duration_ms,
            min_value: self.range.map(|(lo, _)| lo),
            max_value: self.range.map(|(_, hi)| hi),
        }
    }
}
