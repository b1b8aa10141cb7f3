//! headers/types.rs
//! Container header struct and validation.
//!
//! Notes:
//! - Field names follow the recording metadata; the JSON view keeps the key names
//!   used by existing CPTV metadata tooling (`deviceName`, `previewSecs`, ...).
//! - Timestamps are carried on the wire as microseconds since the Unix epoch.
//! - Optional fields are `None` (or an empty blob) when absent on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FRAME_RATE, LEPTON_HEIGHT, LEPTON_WIDTH, MAX_FIELD_LEN};
use crate::types::CptvError;

/// Largest accepted frame side. Bounds the allocation a header can request.
pub const MAX_DIMENSION: u32 = 8192;

/// File-level metadata, written once before any frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CptvHeader {
    /// Recording start.
    #[serde(rename = "timestamp", with = "chrono::serde::ts_microseconds")]
    pub capture_time: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    /// Frame payload scheme. `0` is the snake-order delta / bit-pack scheme.
    pub compression: u8,
    #[serde(rename = "fps")]
    pub frame_rate: u8,
    pub device_name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub device_id: Option<u32>,
    #[serde(rename = "serialNumber")]
    pub camera_serial: Option<u32>,
    #[serde(rename = "firmwareVersion")]
    pub firmware: Option<String>,
    /// Opaque motion-detection parameters. Empty when absent.
    #[serde(with = "blob_text")]
    pub motion_config: Vec<u8>,
    pub preview_secs: Option<u8>,
    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
    #[serde(default, rename = "locTimestamp", with = "chrono::serde::ts_microseconds_option")]
    pub location_timestamp: Option<DateTime<Utc>>,
    pub altitude: Option<f32>,
    #[serde(rename = "accuracy")]
    pub location_accuracy: Option<f32>,
    pub has_background_frame: bool,
}

impl Default for CptvHeader {
    /// Epoch capture time, Lepton 3 resolution, default frame rate, everything
    /// optional absent.
    fn default() -> Self {
        Self {
            capture_time: DateTime::<Utc>::default(),
            width: LEPTON_WIDTH,
            height: LEPTON_HEIGHT,
            compression: 0,
            frame_rate: DEFAULT_FRAME_RATE,
            device_name: String::new(),
            brand: None,
            model: None,
            device_id: None,
            camera_serial: None,
            firmware: None,
            motion_config: Vec::new(),
            preview_secs: None,
            latitude: None,
            longitude: None,
            location_timestamp: None,
            altitude: None,
            location_accuracy: None,
            has_background_frame: false,
        }
    }
}

impl CptvHeader {
    /// Header with the given frame size and defaults elsewhere.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self { width, height, ..Default::default() }
    }

    /// Pixels per frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check everything the wire format cannot represent.
    pub fn validate(&self) -> Result<(), CptvError> {
        for (name, side) in [("width", self.width), ("height", self.height)] {
            if side == 0 || side > MAX_DIMENSION {
                return Err(CptvError::MalformedHeader(format!(
                    "{} {} outside 1..={}",
                    name, side, MAX_DIMENSION
                )));
            }
        }

        if self.capture_time.timestamp_micros() < 0 {
            return Err(CptvError::MalformedHeader(format!(
                "capture time {} predates the epoch",
                self.capture_time
            )));
        }
        if let Some(ts) = self.location_timestamp {
            if ts.timestamp_micros() < 0 {
                return Err(CptvError::MalformedHeader(format!(
                    "location timestamp {} predates the epoch",
                    ts
                )));
            }
        }

        let texts = [
            ("device_name", Some(self.device_name.as_str())),
            ("brand", self.brand.as_deref()),
            ("model", self.model.as_deref()),
            ("firmware", self.firmware.as_deref()),
        ];
        for (name, text) in texts {
            let Some(text) = text else { continue };
            if text.len() > MAX_FIELD_LEN {
                return Err(CptvError::MalformedHeader(format!(
                    "{} is {} bytes, limit is {}",
                    name,
                    text.len(),
                    MAX_FIELD_LEN
                )));
            }
            if text.as_bytes().contains(&0) {
                return Err(CptvError::MalformedHeader(format!("{} contains a NUL byte", name)));
            }
        }

        if self.motion_config.len() > MAX_FIELD_LEN {
            return Err(CptvError::MalformedHeader(format!(
                "motion_config is {} bytes, limit is {}",
                self.motion_config.len(),
                MAX_FIELD_LEN
            )));
        }

        Ok(())
    }

    /// Metadata view as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Motion config travels as bytes but reads as text in the JSON view.
mod blob_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(blob: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&String::from_utf8_lossy(blob))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(d).map(String::into_bytes)
    }
}
