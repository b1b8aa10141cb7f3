/// Magic number at the start of every uncompressed container stream.
// Protocol magic is a fixed `[u8; 4]` so the type enforces "exactly 4 bytes".
pub const MAGIC_CPTV: [u8; 4] = *b"CPTV";
/// Container format version written and accepted by this crate.
pub const CPTV_VERSION: u8 = 2;

/// Section tags. Every section starts with its tag and a one-byte field count.
pub mod section_tags {
    pub const HEADER: u8 = b'H';
    pub const FRAME: u8 = b'F';
    pub const FOOTER: u8 = b'W';
}

/// Field codes (mirrored in `fields::FieldType`).
pub mod field_codes {
    // Header
    pub const TIMESTAMP: u8 = b'T';
    pub const WIDTH: u8 = b'X';
    pub const HEIGHT: u8 = b'Y';
    pub const COMPRESSION: u8 = b'C';
    pub const DEVICE_NAME: u8 = b'D';
    pub const MOTION_CONFIG: u8 = b'M';
    pub const PREVIEW_SECS: u8 = b'P';
    pub const LATITUDE: u8 = b'L';
    pub const LONGITUDE: u8 = b'O';
    pub const LOC_TIMESTAMP: u8 = b'S';
    pub const ALTITUDE: u8 = b'A';
    pub const ACCURACY: u8 = b'U';
    pub const MODEL: u8 = b'E';
    pub const BRAND: u8 = b'B';
    pub const DEVICE_ID: u8 = b'I';
    pub const FIRMWARE_VERSION: u8 = b'V';
    pub const CAMERA_SERIAL: u8 = b'N';
    pub const FRAME_RATE: u8 = b'Z';
    pub const BACKGROUND_FRAME: u8 = b'g';

    // Footer
    pub const NUM_FRAMES: u8 = b'J';
    pub const DURATION_MS: u8 = b'd';
    pub const MIN_VALUE: u8 = b'Q';
    pub const MAX_VALUE: u8 = b'K';

    // Frame
    pub const BITS_PER_PIXEL: u8 = b'w';
    pub const FRAME_SIZE: u8 = b'f';
    pub const LAST_FFC_TIME: u8 = b'c';
    pub const FRAME_TEMP_C: u8 = b'a';
    pub const LAST_FFC_TEMP_C: u8 = b'b';
    pub const TIME_ON: u8 = b't';
}

/// Lepton 3 sensor resolution, used as the default frame size.
pub const LEPTON_WIDTH: u32 = 160;
pub const LEPTON_HEIGHT: u32 = 120;

/// Frame rate assumed when a header carries none (older recordings).
pub const DEFAULT_FRAME_RATE: u8 = 9;

/// Field values are length-prefixed with a single byte.
pub const MAX_FIELD_LEN: usize = u8::MAX as usize;

/// First residual of every frame is stored as a literal 32-bit value.
pub const FIRST_PIXEL_LEN: usize = 4;

/// Packing widths chosen by the frame encoder.
pub const NARROW_BITS: u8 = 8;
pub const WIDE_BITS: u8 = 16;
pub const MAX_BITS_PER_PIXEL: u8 = 32;
