//! telemetry/snapshot.rs
//!
//! Immutable telemetry snapshot.
//!
//! Design notes:
//! - Rates are derived once, at snapshot time, from counters and elapsed wall time.
//! - `compression_ratio` compares bytes on the wire with raw pixel bytes, so it
//!   covers both the frame codec and stream compression.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub frames: u64,
    pub frames_8bit: u64,
    pub frames_16bit: u64,
    pub frames_wide: u64,
    pub bytes_pixels: u64,
    pub bytes_payload: u64,
    pub bytes_overhead: u64,
    pub bytes_stream: u64,
    pub compression_ratio: f64,
    pub frames_per_sec: f64,
    pub pixel_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let secs = elapsed.as_secs_f64();

        let wire = if counters.bytes_stream > 0 {
            counters.bytes_stream
        } else {
            counters.container_bytes()
        };
        let compression_ratio = if counters.bytes_pixels > 0 {
            wire as f64 / counters.bytes_pixels as f64
        } else {
            0.0
        };

        let (frames_per_sec, pixel_bytes_per_sec) = if secs > 0.0 {
            (counters.frames as f64 / secs, counters.bytes_pixels as f64 / secs)
        } else {
            (0.0, 0.0)
        };

        Self {
            frames: counters.frames,
            frames_8bit: counters.frames_8bit,
            frames_16bit: counters.frames_16bit,
            frames_wide: counters.frames_wide,
            bytes_pixels: counters.bytes_pixels,
            bytes_payload: counters.bytes_payload,
            bytes_overhead: counters.bytes_overhead,
            bytes_stream: counters.bytes_stream,
            compression_ratio,
            frames_per_sec,
            pixel_bytes_per_sec,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Internal invariants:
    /// - every frame falls in exactly one bit-width class
    /// - stage times never exceed wall time
    pub fn sanity_check(&self) -> bool {
        self.frames == self.frames_8bit + self.frames_16bit + self.frames_wide
            && self.total_stage_time() <= self.elapsed
    }

    pub fn container_bytes(&self) -> u64 {
        self.bytes_payload + self.bytes_overhead
    }
}
