//! TIFF tag and field type definitions.
//!
//! This module defines the vocabulary for Exif directory decoding:
//! - Field types that determine how values are encoded
//! - Tag IDs for the common Exif/TIFF fields shown in dumps

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
///
/// The element size decides whether `count` values fit in the 4-byte slot of
/// an IFD entry or live out of line. RATIONAL and SRATIONAL are recognised for
/// sizing but their values are never decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character, NUL terminated (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Two LONGs: numerator and denominator (8 bytes, not decoded)
    Rational = 5,

    /// Signed 8-bit integer (1 byte)
    SByte = 6,

    /// Undefined byte data (1 byte per element)
    Undefined = 7,

    /// Signed 16-bit integer (2 bytes)
    SShort = 8,

    /// Signed 32-bit integer (4 bytes)
    SLong = 9,

    /// Two SLONGs: numerator and denominator (8 bytes, not decoded)
    SRational = 10,
}

impl FieldType {
    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong => 4,
            FieldType::Rational | FieldType::SRational => 8,
        }
    }

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for unknown type values.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            _ => None,
        }
    }

    /// Whether values of this type can be decoded.
    #[inline]
    pub const fn is_supported(self) -> bool {
        !matches!(self, FieldType::Rational | FieldType::SRational)
    }

    /// Maximum bytes that can be stored inline in an IFD entry.
    pub const INLINE_THRESHOLD: u64 = 4;

    /// Check if `count` values of this type fit in the 4-byte slot.
    #[inline]
    pub fn fits_inline(self, count: u32) -> bool {
        self.size_in_bytes() as u64 * count as u64 <= Self::INLINE_THRESHOLD
    }

    /// Upper-case TIFF name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Byte => "BYTE",
            FieldType::Ascii => "ASCII",
            FieldType::Short => "SHORT",
            FieldType::Long => "LONG",
            FieldType::Rational => "RATIONAL",
            FieldType::SByte => "SBYTE",
            FieldType::Undefined => "UNDEFINED",
            FieldType::SShort => "SSHORT",
            FieldType::SLong => "SLONG",
            FieldType::SRational => "SRATIONAL",
        }
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

/// Tag IDs commonly found in the 0th/1st IFD of an Exif APP1 segment.
///
/// Tags not listed here are kept with their raw id and shown in hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    ImageWidth = 0x0100,
    ImageLength = 0x0101,
    Compression = 0x0103,
    ImageDescription = 0x010E,
    Make = 0x010F,
    Model = 0x0110,
    Orientation = 0x0112,
    XResolution = 0x011A,
    YResolution = 0x011B,
    ResolutionUnit = 0x0128,
    Software = 0x0131,
    DateTime = 0x0132,

    /// Offset of the JPEG thumbnail in the 1st IFD
    JpegInterchangeFormat = 0x0201,

    /// Length of the JPEG thumbnail in the 1st IFD
    JpegInterchangeFormatLength = 0x0202,

    YCbCrPositioning = 0x0213,

    /// Pointer to the Exif private IFD
    ExifIfdPointer = 0x8769,

    /// Pointer to the GPS IFD
    GpsInfoIfdPointer = 0x8825,
}

impl TiffTag {
    /// Create a TiffTag from its numeric value.
    ///
    /// Returns `None` for unrecognized tags. Unknown tags are not an error.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0100 => Some(TiffTag::ImageWidth),
            0x0101 => Some(TiffTag::ImageLength),
            0x0103 => Some(TiffTag::Compression),
            0x010E => Some(TiffTag::ImageDescription),
            0x010F => Some(TiffTag::Make),
            0x0110 => Some(TiffTag::Model),
            0x0112 => Some(TiffTag::Orientation),
            0x011A => Some(TiffTag::XResolution),
            0x011B => Some(TiffTag::YResolution),
            0x0128 => Some(TiffTag::ResolutionUnit),
            0x0131 => Some(TiffTag::Software),
            0x0132 => Some(TiffTag::DateTime),
            0x0201 => Some(TiffTag::JpegInterchangeFormat),
            0x0202 => Some(TiffTag::JpegInterchangeFormatLength),
            0x0213 => Some(TiffTag::YCbCrPositioning),
            0x8769 => Some(TiffTag::ExifIfdPointer),
            0x8825 => Some(TiffTag::GpsInfoIfdPointer),
            _ => None,
        }
    }

    /// Get the numeric tag ID.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Human-readable tag name.
    pub const fn name(self) -> &'static str {
        match self {
            TiffTag::ImageWidth => "ImageWidth",
            TiffTag::ImageLength => "ImageLength",
            TiffTag::Compression => "Compression",
            TiffTag::ImageDescription => "ImageDescription",
            TiffTag::Make => "Make",
            TiffTag::Model => "Model",
            TiffTag::Orientation => "Orientation",
            TiffTag::XResolution => "XResolution",
            TiffTag::YResolution => "YResolution",
            TiffTag::ResolutionUnit => "ResolutionUnit",
            TiffTag::Software => "Software",
            TiffTag::DateTime => "DateTime",
            TiffTag::JpegInterchangeFormat => "JPEGInterchangeFormat",
            TiffTag::JpegInterchangeFormatLength => "JPEGInterchangeFormatLength",
            TiffTag::YCbCrPositioning => "YCbCrPositioning",
            TiffTag::ExifIfdPointer => "ExifIFDPointer",
            TiffTag::GpsInfoIfdPointer => "GPSInfoIFDPointer",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
