//! JPEG marker codes.
//!
//! Markers are handled as big-endian `u16` values (`0xFFD8` rather than the
//! byte pair), which is how they are read off the stream.

// =============================================================================
// JPEG Markers
// =============================================================================

/// Start Of Image marker
pub const SOI: u16 = 0xFFD8;

/// Application segment 0 (JFIF) marker
pub const APP0: u16 = 0xFFE0;

/// Application segment 1 (Exif / XMP) marker
pub const APP1: u16 = 0xFFE1;

/// Application segment 2 (Flashpix / ICC) marker
pub const APP2: u16 = 0xFFE2;

/// Comment marker
pub const COM: u16 = 0xFFFE;

/// Define Quantization Table marker
pub const DQT: u16 = 0xFFDB;

/// Define Huffman Table marker
pub const DHT: u16 = 0xFFC4;

/// Define Restart Interval marker
pub const DRI: u16 = 0xFFDD;

/// Start Of Frame (baseline DCT) marker
pub const SOF: u16 = 0xFFC0;

/// Start Of Scan marker
pub const SOS: u16 = 0xFFDA;

/// End Of Image marker
pub const EOI: u16 = 0xFFD9;

/// Sentinel for the entropy-coded region between SOS and EOI.
///
/// Not a real marker: `0xFF01` would be TEM, so a value without the `0xFF`
/// prefix is used.
pub const DATA: u16 = 0x0001;

/// EOI as it appears in the byte stream
pub const EOI_BYTES: [u8; 2] = [0xFF, 0xD9];

/// Display name of a marker.
///
/// Returns `None` for markers outside the known set; callers render those as
/// four hex digits.
pub const fn marker_name(marker: u16) -> Option<&'static str> {
    match marker {
        SOI => Some("SOI"),
        APP0 => Some("APP0"),
        APP1 => Some("APP1"),
        APP2 => Some("APP2"),
        COM => Some("COM"),
        DQT => Some("DQT"),
        DHT => Some("DHT"),
        DRI => Some("DRI"),
        SOF => Some("SOF"),
        SOS => Some("SOS"),
        DATA => Some("Data"),
        EOI => Some("EOI"),
        _ => None,
    }
}

/// Whether a marker stands alone with no length field.
#[inline]
pub const fn is_standalone(marker: u16) -> bool {
    matches!(marker, SOI | EOI)
}
