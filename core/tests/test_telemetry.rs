// Telemetry suite: counters, stage timers, snapshot rates and the reencode report.

mod common;

#[cfg(test)]
mod tests {

use std::time::Duration;

use cptv_core::config::CodecConfig;
use cptv_core::framing::{CptvFrame, FrameData};
use cptv_core::headers::CptvHeader;
use cptv_core::stream::{reencode, reencode_stream, CptvReader, CptvWriter, InputSource, OutputSink};
use cptv_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

use crate::common::{foo42_header, init_tracing, noise_image, thermal_frames, write_file};

// ## 1. Counters

    #[test]
    fn counters_classify_bit_widths() {
        let mut c = TelemetryCounters::default();
        c.add_header(40);
        c.add_frame(100, 8, 103, 130);
        c.add_frame(100, 16, 202, 229);
        c.add_frame(100, 18, 227, 254);
        c.add_footer(16);

        assert_eq!(c.frames, 3);
        assert_eq!((c.frames_8bit, c.frames_16bit, c.frames_wide), (1, 1, 1));
        assert_eq!(c.bytes_pixels, 600);
        assert_eq!(c.bytes_payload, 103 + 202 + 227);
        assert_eq!(c.bytes_overhead, 40 + 27 * 3 + 16);
        assert_eq!(c.container_bytes(), 103 + 202 + 227 + 40 + 81 + 16);
    }

    #[test]
    fn counters_merge() {
        let mut a = TelemetryCounters::default();
        a.add_frame(10, 8, 13, 30);
        let mut b = a.clone();
        b.set_stream_bytes(99);
        a += b;
        assert_eq!(a.frames, 2);
        assert_eq!(a.bytes_stream, 99);
    }

// ## 2. Timers

    #[test]
    fn stage_times_accumulate() {
        let mut t = StageTimes::default();
        t.add(Stage::Encode, Duration::from_micros(300));
        t.add(Stage::Encode, Duration::from_micros(200));
        t.add(Stage::Write, Duration::from_micros(100));
        assert_eq!(t.get(Stage::Encode), Duration::from_micros(500));
        assert_eq!(t.total(), Duration::from_micros(600));
        assert!(t.has_all(&[Stage::Encode, Stage::Write]));
        assert!(!t.has_all(&[Stage::Decode]));
        assert_eq!(Stage::Compress.to_string(), "compress");
    }

    #[test]
    fn timer_charges_closure_to_stage() {
        let mut timer = TelemetryTimer::new();
        let v = timer.time(Stage::Decode, || 41 + 1);
        assert_eq!(v, 42);
        assert!(timer.stage_times.has_all(&[Stage::Decode]));
        timer.finish();
        assert!(timer.stage_times.total() <= timer.elapsed());
    }

// ## 3. Snapshots

    #[test]
    fn writer_snapshot_reports_throughput() {
        init_tracing();
        let frames = thermal_frames(160, 120, 10);
        let mut w = CptvWriter::new(Vec::new());
        w.set_header(foo42_header()).unwrap();
        w.write_header().unwrap();
        for f in &frames {
            w.write_frame(f).unwrap();
        }
        let snap = w.close().unwrap();
        let bytes = w.into_inner().unwrap();

        assert_eq!(snap.frames, 10);
        assert_eq!(snap.bytes_pixels, 10 * 160 * 120 * 2);
        assert_eq!(snap.bytes_stream, bytes.len() as u64);
        assert!(snap.compression_ratio > 0.0 && snap.compression_ratio < 1.0);
        assert!(snap.frames_per_sec > 0.0);
        assert!(snap.pixel_bytes_per_sec > 0.0);
        assert!(snap.has_all_stages(&[Stage::Encode, Stage::Write, Stage::Compress]));
        assert!(snap.sanity_check());
    }

    #[test]
    fn identity_container_bytes_match_output() {
        let frames = thermal_frames(32, 24, 3);
        let header = CptvHeader { width: 32, height: 24, ..foo42_header() };
        let mut w = CptvWriter::with_config(Vec::new(), CodecConfig::identity()).unwrap();
        w.set_header(header).unwrap();
        w.write_header().unwrap();
        for f in &frames {
            w.write_frame(f).unwrap();
        }
        let snap = w.close().unwrap();
        let bytes = w.into_inner().unwrap();
        assert_eq!(snap.container_bytes(), bytes.len() as u64);
        assert_eq!(snap.bytes_stream, bytes.len() as u64);
    }

    #[test]
    fn noise_frames_pack_wide() {
        let header = CptvHeader { width: 16, height: 16, ..foo42_header() };
        let frames: Vec<CptvFrame> = (0..3).map(|i| CptvFrame::new(i, noise_image(16, 16, i as u64))).collect();
        let bytes = write_file(&header, &frames, CodecConfig::identity());
        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        while reader.next_frame().unwrap().is_some() {}
        let snap = reader.telemetry();
        assert_eq!(snap.frames_wide, 3);
        assert_eq!(snap.frames_8bit + snap.frames_16bit, 0);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut c = TelemetryCounters::default();
        c.add_frame(4, 8, 7, 20);
        let mut timer = TelemetryTimer::new();
        timer.add_stage_time(Stage::Encode, Duration::from_micros(5));
        timer.finish();
        let snap = TelemetrySnapshot::from(&c, &timer);
        let json = serde_json::to_string(&snap).unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frames, 1);
        assert_eq!(back.stage_times.get(Stage::Encode), Duration::from_micros(5));
    }

// ## 4. Reencode

    #[test]
    fn reencode_applies_new_header_and_keeps_frames() {
        init_tracing();
        let source_header = CptvHeader { width: 40, height: 30, ..foo42_header() };
        let frames = thermal_frames(40, 30, 6);
        let source = write_file(&source_header, &frames, CodecConfig::default());

        let fresh = CptvHeader {
            device_name: "reencoded".into(),
            width: 1,
            height: 1,
            frame_rate: 9,
            ..CptvHeader::default()
        };
        let (out, report) = reencode(&source[..], Vec::new(), fresh, &CodecConfig::default()).unwrap();

        assert_eq!(report.frames, 6);
        assert_eq!(report.header.device_name, "reencoded");
        assert_eq!((report.header.width, report.header.height), (40, 30));
        assert_eq!(report.source_footer.map(|f| f.num_frames), Some(6));
        assert_eq!(report.telemetry.frames, 6);

        let mut reader = CptvReader::new(&out[..]).unwrap();
        assert_eq!(reader.header(), &report.header);
        let back = reader.by_ref().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(back, frames);
    }

    #[test]
    fn reencode_stream_over_memory() {
        let header = CptvHeader { width: 8, height: 8, ..foo42_header() };
        let frames = vec![CptvFrame::new(0, FrameData::new(8, 8))];
        let source = write_file(&header, &frames, CodecConfig::identity());

        let (out, report) = reencode_stream(
            InputSource::Memory(source),
            OutputSink::Memory,
            foo42_header(),
            &CodecConfig::identity(),
        )
        .unwrap();
        let out = out.unwrap();
        assert_eq!(report.frames, 1);
        assert_eq!(report.telemetry.bytes_stream, out.len() as u64);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"deviceName\":\"foo42\""));
    }

    #[test]
    fn reencode_stream_into_caller_writer() {
        let header = CptvHeader { width: 8, height: 8, ..foo42_header() };
        let source = write_file(&header, &[], CodecConfig::default());
        let (out, report) = reencode_stream(
            InputSource::Reader(Box::new(std::io::Cursor::new(source))),
            OutputSink::Writer(Box::new(std::io::sink())),
            foo42_header(),
            &CodecConfig::default(),
        )
        .unwrap();
        assert!(out.is_none());
        assert_eq!(report.frames, 0);
    }
}
