// Codec configuration suite.

#[cfg(test)]
mod tests {

use cptv_core::compression::{resolve, CompressionError, StreamCompression};
use cptv_core::config::{CodecConfig, HeaderOnlyClose};
use cptv_core::types::CptvError;

    #[test]
    fn defaults_match_recorder_output() {
        let c = CodecConfig::default();
        assert_eq!(c.compression, StreamCompression::Gzip);
        assert_eq!(c.compression_level, 6);
        assert!(c.write_footer);
        assert_eq!(c.header_only_close, HeaderOnlyClose::Reject);
        c.validate().unwrap();
    }

    #[test]
    fn json_missing_keys_take_defaults() {
        let c = CodecConfig::from_json_str(r#"{ "compression": "identity" }"#).unwrap();
        assert_eq!(c, CodecConfig::identity());

        let c = CodecConfig::from_json_str(
            r#"{ "compression_level": 9, "write_footer": false, "header_only_close": "write_header" }"#,
        )
        .unwrap();
        assert_eq!(c.compression, StreamCompression::Gzip);
        assert_eq!(c.compression_level, 9);
        assert!(!c.write_footer);
        assert_eq!(c.header_only_close, HeaderOnlyClose::WriteHeader);

        assert_eq!(CodecConfig::from_json_str("{}").unwrap(), CodecConfig::default());
    }

    #[test]
    fn json_round_trips() {
        let c = CodecConfig { compression_level: 1, ..CodecConfig::identity() };
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(CodecConfig::from_json_str(&json).unwrap(), c);
    }

    #[test]
    fn bad_json_is_invalid_config() {
        assert!(matches!(
            CodecConfig::from_json_str(r#"{ "compression": "zstd" }"#),
            Err(CptvError::InvalidConfig(_))
        ));
        assert!(matches!(CodecConfig::from_json_str("not json"), Err(CptvError::InvalidConfig(_))));
    }

    #[test]
    fn level_is_checked() {
        assert!(matches!(
            CodecConfig::from_json_str(r#"{ "compression_level": 10 }"#),
            Err(CptvError::Compression(CompressionError::InvalidLevel { level: 10, max: 9, .. }))
        ));
        // Identity ignores the level.
        CodecConfig { compression_level: 10, ..CodecConfig::identity() }.validate().unwrap();
    }

    #[test]
    fn codec_ids_are_stable() {
        assert_eq!(StreamCompression::Identity.id(), 0);
        assert_eq!(StreamCompression::Gzip.id(), 1);
        assert_eq!(StreamCompression::from_id(1).unwrap(), StreamCompression::Gzip);
        let err = StreamCompression::from_id(7).unwrap_err();
        assert_eq!(err, CompressionError::UnknownCodec { raw: 7 });
        assert_eq!(err.to_string(), "unknown stream compression: 0x7");
        assert_eq!(resolve(StreamCompression::Gzip).max_level, 9);
    }
}
