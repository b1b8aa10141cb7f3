//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use cptv_core::config::CodecConfig;
use cptv_core::framing::{CptvFrame, FrameData};
use cptv_core::headers::CptvHeader;
use cptv_core::stream::CptvWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness. `RUST_LOG` selects levels.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn capture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 2, 14, 6, 30, 12).unwrap()
}

/// The reference recording header: foo42, lat 142.2, lon -39.2, 30 fps, serial 221.
pub fn foo42_header() -> CptvHeader {
    CptvHeader {
        capture_time: capture_time(),
        device_name: "foo42".into(),
        latitude: Some(142.2),
        longitude: Some(-39.2),
        frame_rate: 30,
        camera_serial: Some(221),
        ..CptvHeader::default()
    }
}

/// Every optional field present.
pub fn full_header() -> CptvHeader {
    CptvHeader {
        capture_time: capture_time(),
        width: 160,
        height: 120,
        compression: 0,
        frame_rate: 9,
        device_name: "grizzly-3".into(),
        brand: Some("flir".into()),
        model: Some("lepton3.5".into()),
        device_id: Some(1789),
        camera_serial: Some(500_123),
        firmware: Some("3.4.1".into()),
        motion_config: b"temp-thresh: 2900\ndelta-thresh: 30".to_vec(),
        preview_secs: Some(5),
        latitude: Some(-43.5321),
        longitude: Some(172.6362),
        location_timestamp: Some(Utc.with_ymd_and_hms(2023, 2, 14, 6, 0, 0).unwrap()),
        altitude: Some(12.5),
        location_accuracy: Some(3.0),
        has_background_frame: true,
    }
}

/// Smooth thermal-looking image with a warm blob that moves with `seed`.
pub fn thermal_image(width: usize, height: usize, seed: u32) -> FrameData {
    let mut img = FrameData::new(width, height);
    let cx = (seed as usize * 7) % width;
    let cy = (seed as usize * 3) % height;
    for y in 0..height {
        for x in 0..width {
            let dx = x.abs_diff(cx);
            let dy = y.abs_diff(cy);
            let blob = 600usize.saturating_sub((dx * dx + dy * dy) * 4);
            img[y][x] = (3000 + (x + y) % 17 + blob) as u16;
        }
    }
    img
}

/// Uniform noise over the full `u16` range; forces wide packing.
pub fn noise_image(width: usize, height: usize, seed: u64) -> FrameData {
    let mut rng = StdRng::seed_from_u64(seed);
    let pixels = (0..width * height).map(|_| rng.gen()).collect();
    FrameData::from_pixels(width, height, pixels).unwrap()
}

pub fn thermal_frames(width: usize, height: usize, count: u32) -> Vec<CptvFrame> {
    (0..count)
        .map(|i| {
            let mut f = CptvFrame::new(10_000 + i * 111, thermal_image(width, height, i));
            f.last_ffc_time = Some(9_000);
            f.frame_temp_c = Some(31.5 + i as f32 * 0.01);
            f.last_ffc_temp_c = Some(31.0);
            f
        })
        .collect()
}

/// Encode a complete file into memory.
pub fn write_file(header: &CptvHeader, frames: &[CptvFrame], config: CodecConfig) -> Vec<u8> {
    let mut w = CptvWriter::with_config(Vec::new(), config).unwrap();
    w.set_header(header.clone()).unwrap();
    w.write_header().unwrap();
    for f in frames {
        w.write_frame(f).unwrap();
    }
    w.close().unwrap();
    w.into_inner().unwrap()
}
