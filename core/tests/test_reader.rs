// Reader suite: lazy sequence, end-of-stream handling, footer checks.

mod common;

#[cfg(test)]
mod tests {

use cptv_core::compression::StreamCompression;
use cptv_core::config::CodecConfig;
use cptv_core::framing::{encode_frame, CptvFrame, FrameData};
use cptv_core::headers::{encode_footer, encode_header, CptvFooter, CptvHeader};
use cptv_core::stream::CptvReader;
use cptv_core::telemetry::Stage;
use cptv_core::types::CptvError;

use crate::common::{foo42_header, init_tracing, thermal_frames, write_file};

fn no_footer() -> CodecConfig {
    CodecConfig { write_footer: false, ..CodecConfig::identity() }
}

fn small_header() -> CptvHeader {
    CptvHeader { width: 12, height: 9, ..foo42_header() }
}

// ## 1. Reference recording

    #[test]
    fn foo42_two_frames() {
        init_tracing();
        let header = foo42_header();
        let frames = thermal_frames(160, 120, 2);
        let bytes = write_file(&header, &frames, CodecConfig::default());

        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.stream_compression(), StreamCompression::Gzip);
        let h = reader.header();
        assert_eq!(h.device_name, "foo42");
        assert_eq!(h.latitude, Some(142.2));
        assert_eq!(h.longitude, Some(-39.2));
        assert_eq!(h.frame_rate, 30);
        assert_eq!(h.camera_serial, Some(221));

        let decoded: Vec<CptvFrame> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(decoded, frames);
        assert_eq!(reader.frames_read(), 2);
        assert_eq!(reader.footer().map(|f| f.num_frames), Some(2));
    }

    #[test]
    fn header_is_available_before_any_frame() {
        let bytes = write_file(&small_header(), &thermal_frames(12, 9, 3), no_footer());
        let reader = CptvReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.header(), &small_header());
        assert_eq!(reader.frames_read(), 0);
    }

// ## 2. End of stream

    #[test]
    fn clean_end_without_footer() {
        let frames = thermal_frames(12, 9, 3);
        let bytes = write_file(&small_header(), &frames, no_footer());
        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        for f in &frames {
            assert_eq!(&reader.next_frame().unwrap().unwrap(), f);
        }
        assert!(reader.next_frame().unwrap().is_none());
        assert!(reader.next_frame().unwrap().is_none());
        assert!(reader.footer().is_none());
    }

    #[test]
    fn truncated_last_frame() {
        let frames = thermal_frames(12, 9, 4);
        let mut bytes = write_file(&small_header(), &frames, no_footer());
        bytes.pop();

        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        for f in &frames[..3] {
            assert_eq!(&reader.next().unwrap().unwrap(), f);
        }
        assert!(matches!(reader.next(), Some(Err(CptvError::TruncatedFrame(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn header_only_file_yields_nothing() {
        let bytes = write_file(&small_header(), &[], no_footer());
        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        assert!(reader.next().is_none());
    }

// ## 3. Header failures surface at open

    #[test]
    fn empty_or_garbage_source_is_malformed_header() {
        for src in [&b""[..], &b"RIFF\x00\x00\x00\x00WAVE"[..], &b"CPTV\x01H\x00"[..]] {
            assert!(matches!(CptvReader::new(src), Err(CptvError::MalformedHeader(_))));
        }
    }

// ## 4. Footer

    fn stream_with_footer(frames: &[CptvFrame], footer: &CptvFooter) -> Vec<u8> {
        let mut bytes = encode_header(&small_header()).unwrap();
        let mut prev: Option<&FrameData> = None;
        for f in frames {
            bytes.extend(encode_frame(f, prev).unwrap());
            prev = Some(&f.image_data);
        }
        bytes.extend(encode_footer(footer).unwrap());
        bytes
    }

    #[test]
    fn footer_frame_count_must_match() {
        let frames = thermal_frames(12, 9, 2);
        let bytes = stream_with_footer(&frames, &CptvFooter { num_frames: 5, ..CptvFooter::default() });
        let results: Vec<_> = CptvReader::new(&bytes[..]).unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok() && results[1].is_ok());
        assert!(matches!(results[2], Err(CptvError::MalformedFooter(_))));
    }

    #[test]
    fn bytes_after_footer_are_rejected() {
        let frames = thermal_frames(12, 9, 1);
        let mut bytes = stream_with_footer(&frames, &CptvFooter { num_frames: 1, ..CptvFooter::default() });
        bytes.push(b'F');
        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(CptvError::MalformedFooter(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn written_footer_is_exposed() {
        let frames = thermal_frames(12, 9, 3);
        let bytes = write_file(&small_header(), &frames, CodecConfig::identity());
        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        assert!(reader.footer().is_none());
        while reader.next_frame().unwrap().is_some() {}
        let footer = reader.footer().unwrap();
        assert_eq!(footer.num_frames, 3);
        assert_eq!(footer.duration_ms, 222);
    }

// ## 5. Structural errors are fatal

    #[test]
    fn unknown_section_is_malformed_frame() {
        let frames = thermal_frames(12, 9, 1);
        let mut bytes = write_file(&small_header(), &frames, no_footer());
        bytes.extend_from_slice(&[b'Q', 0]);
        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(CptvError::MalformedFrame(_)))));
        assert!(reader.next().is_none());
    }

// ## 6. Telemetry

    #[test]
    fn decode_telemetry_counts_frames() {
        let frames = thermal_frames(12, 9, 5);
        let bytes = write_file(&small_header(), &frames, CodecConfig::default());
        let mut reader = CptvReader::new(&bytes[..]).unwrap();
        while reader.next_frame().unwrap().is_some() {}

        let snap = reader.telemetry();
        assert_eq!(snap.frames, 5);
        assert_eq!(snap.bytes_pixels, 5 * 12 * 9 * 2);
        assert_eq!(snap.bytes_stream, bytes.len() as u64);
        assert!(snap.has_all_stages(&[Stage::Read, Stage::Decode]));
        assert!(snap.sanity_check());
    }

// ## 7. Damaged compressed streams

    fn gzip_file(config: CodecConfig) -> (Vec<CptvFrame>, Vec<u8>) {
        let frames = thermal_frames(12, 9, 4);
        let bytes = write_file(&small_header(), &frames, config);
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        (frames, bytes)
    }

    fn gzip_configs() -> [CodecConfig; 2] {
        [CodecConfig::default(), CodecConfig { write_footer: false, ..CodecConfig::default() }]
    }

    #[test]
    fn corrupt_gzip_header_is_malformed_header() {
        let src = [0x1f, 0x8b, 0xff, 0xff, 0, 0, 0, 0, 0, 0, b'C', b'P', b'T', b'V'];
        assert!(matches!(CptvReader::new(&src[..]), Err(CptvError::MalformedHeader(_))));
    }

    #[test]
    fn gzip_checksum_mismatch_is_malformed_frame() {
        for config in gzip_configs() {
            let (frames, mut bytes) = gzip_file(config);
            let crc_pos = bytes.len() - 8;
            bytes[crc_pos] ^= 0xff;

            let results: Vec<_> = CptvReader::new(&bytes[..]).unwrap().collect();
            assert_eq!(results.len(), frames.len() + 1);
            for (got, want) in results.iter().zip(&frames) {
                assert_eq!(got.as_ref().unwrap(), want);
            }
            assert!(matches!(results.last(), Some(Err(CptvError::MalformedFrame(_)))));
        }
    }

    #[test]
    fn gzip_missing_trailer_is_truncated() {
        for config in gzip_configs() {
            for cut in [1, 4, 8] {
                let (frames, mut bytes) = gzip_file(config.clone());
                bytes.truncate(bytes.len() - cut);

                let results: Vec<_> = CptvReader::new(&bytes[..]).unwrap().collect();
                assert_eq!(results.len(), frames.len() + 1, "cut {} bytes", cut);
                assert!(results[..frames.len()].iter().all(Result::is_ok));
                assert!(
                    matches!(results.last(), Some(Err(CptvError::TruncatedFrame(_)))),
                    "cut {} bytes",
                    cut
                );
            }
        }
    }

    #[test]
    fn intact_gzip_file_ends_cleanly() {
        for config in gzip_configs() {
            let (frames, bytes) = gzip_file(config);
            let decoded: Vec<CptvFrame> =
                CptvReader::new(&bytes[..]).unwrap().collect::<Result<_, _>>().unwrap();
            assert_eq!(decoded, frames);
        }
    }
}
