//! Segment payload decoding.
//!
//! Each segment's payload is classified once into a closed set of variants:
//!
//! - APP0 starting with `JFIF\0` is a [`JfifHeader`]
//! - APP1 starting with `Exif\0\0` is a TIFF stream ([`TiffFile`])
//! - APP1 starting with a NUL-terminated XMP namespace is a standard or
//!   extended XMP chunk
//! - everything else is [`SegmentPayload::Generic`]

use std::fmt;

use bytes::Bytes;

use crate::error::{PayloadError, XmpError};
use crate::format::tiff::TiffFile;
use crate::format::xmp::{ChunkKind, ExtendedHeader, XmpChunk, XMP_EXTENSION_ID, XMP_STANDARD_ID};
use crate::io::{read_u32_be, ByteSource};

use super::framer::Segment;
use super::markers::{APP0, APP1};

/// Identifier that introduces an Exif APP1 payload
pub const EXIF_IDENTIFIER: [u8; 6] = *b"Exif\0\0";

/// Identifier that introduces a JFIF APP0 payload
pub const JFIF_IDENTIFIER: [u8; 5] = *b"JFIF\0";

// =============================================================================
// JfifHeader
// =============================================================================

/// Fixed fields of a JFIF APP0 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct JfifHeader {
    /// Major/minor version, e.g. 0x0102
    pub version: u16,

    /// Density units (0 = aspect ratio, 1 = dpi, 2 = dpcm)
    pub units: u8,

    pub x_density: u16,
    pub y_density: u16,

    /// Embedded thumbnail width in pixels
    pub x_thumbnail: u8,

    /// Embedded thumbnail height in pixels
    pub y_thumbnail: u8,
}

impl JfifHeader {
    /// Decode a JFIF header, or `None` if the payload is not JFIF.
    pub fn decode(payload: &ByteSource) -> Result<Option<Self>, PayloadError> {
        let mut cursor = payload.cursor();
        if payload.len() < JFIF_IDENTIFIER.len() as u64
            || cursor.read_array::<5>()? != JFIF_IDENTIFIER
        {
            return Ok(None);
        }

        let version = cursor.read_u16_be()?;
        let units = cursor.read_u8()?;
        let x_density = cursor.read_u16_be()?;
        let y_density = cursor.read_u16_be()?;
        let x_thumbnail = cursor.read_u8()?;
        let y_thumbnail = cursor.read_u8()?;

        Ok(Some(JfifHeader {
            version,
            units,
            x_density,
            y_density,
            x_thumbnail,
            y_thumbnail,
        }))
    }
}

impl fmt::Display for JfifHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  identifier: JFIF")?;
        writeln!(f, "  version: {:04x}", self.version)?;
        writeln!(f, "  units: {}", self.units)?;
        writeln!(f, "  Density WxH: {}x{}", self.x_density, self.y_density)?;
        writeln!(f, "  Thumbnail WxH: {}x{}", self.x_thumbnail, self.y_thumbnail)
    }
}

// =============================================================================
// SegmentPayload
// =============================================================================

/// Decoded content of a segment.
#[derive(Debug, Clone)]
pub enum SegmentPayload {
    /// JFIF header from APP0
    Jfif(JfifHeader),

    /// Exif TIFF stream from APP1
    Exif(TiffFile),

    /// A complete standard XMP packet
    XmpStandard(Bytes),

    /// One portion of an extended XMP packet
    XmpExtended {
        header: ExtendedHeader,
        payload: Bytes,
    },

    /// Anything else, kept only as the raw payload view
    Generic,
}

impl SegmentPayload {
    /// Decode the payload of `segment` according to its marker.
    pub fn decode(segment: &Segment) -> Result<Self, PayloadError> {
        match segment.marker {
            APP0 => Ok(JfifHeader::decode(&segment.payload)?
                .map(SegmentPayload::Jfif)
                .unwrap_or(SegmentPayload::Generic)),
            APP1 => decode_app1(&segment.payload),
            _ => Ok(SegmentPayload::Generic),
        }
    }

    /// The XMP chunk this payload carries, if any.
    pub fn xmp_chunk(&self, file_offset: u64) -> Option<XmpChunk> {
        match self {
            SegmentPayload::XmpStandard(payload) => Some(XmpChunk {
                kind: ChunkKind::Standard,
                payload: payload.clone(),
                file_offset,
            }),
            SegmentPayload::XmpExtended { header, payload } => Some(XmpChunk {
                kind: ChunkKind::Extended(*header),
                payload: payload.clone(),
                file_offset,
            }),
            _ => None,
        }
    }

    /// Short label for reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SegmentPayload::Jfif(_) => "jfif",
            SegmentPayload::Exif(_) => "exif",
            SegmentPayload::XmpStandard(_) => "xmp",
            SegmentPayload::XmpExtended { .. } => "xmp-extended",
            SegmentPayload::Generic => "generic",
        }
    }
}

impl fmt::Display for SegmentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentPayload::Jfif(jfif) => write!(f, "{}", jfif),
            SegmentPayload::Exif(tiff) => {
                writeln!(f, "  identifier: Exif")?;
                write!(f, "{}", tiff)
            }
            SegmentPayload::XmpStandard(payload) => {
                writeln!(f, "  identifier: {}", XMP_STANDARD_ID)?;
                writeln!(f, "  XMP packet: standard, {}[bytes]", payload.len())
            }
            SegmentPayload::XmpExtended { header, payload } => {
                writeln!(f, "  identifier: {}", XMP_EXTENSION_ID)?;
                writeln!(
                    f,
                    "  XMP packet: {}, {}/{}, {}[bytes]",
                    header.digest_str(),
                    header.offset,
                    header.full_length,
                    payload.len()
                )
            }
            SegmentPayload::Generic => Ok(()),
        }
    }
}

/// Classify and decode an APP1 payload.
fn decode_app1(payload: &ByteSource) -> Result<SegmentPayload, PayloadError> {
    let mut cursor = payload.cursor();
    let ident = cursor.read_array::<6>()?;

    if ident == EXIF_IDENTIFIER {
        let offset = EXIF_IDENTIFIER.len() as u64;
        let tiff = TiffFile::decode(payload.slice_from(offset)?, payload.file_offset() + offset)?;
        return Ok(SegmentPayload::Exif(tiff));
    }

    // The six bytes already read are kept as they are, NULs included; the
    // identifier runs on to the next NUL or the end of the payload
    let mut raw = ident.to_vec();
    raw.extend(cursor.read_until_nul()?);
    let identifier = String::from_utf8_lossy(&raw).into_owned();

    match identifier.as_str() {
        XMP_STANDARD_ID => Ok(SegmentPayload::XmpStandard(cursor.read_to_end()?)),
        XMP_EXTENSION_ID => {
            let digest = cursor.read_array::<32>()?;
            let full_length = read_u32_be(&cursor.read_array::<4>()?);
            let offset = read_u32_be(&cursor.read_array::<4>()?);
            Ok(SegmentPayload::XmpExtended {
                header: ExtendedHeader {
                    digest,
                    full_length,
                    offset,
                },
                payload: cursor.read_to_end()?,
            })
        }
        _ => Err(XmpError::UnrecognizedIdentifier {
            identifier,
            offset: payload.file_offset(),
        }
        .into()),
    }
}

// =============================================================================
// Tests
// =============================================================================
