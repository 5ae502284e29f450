//! Marker-segment framing.
//!
//! The framer makes a single forward pass over the stream:
//!
//! ```text
//! SOI
//! APP0 | APP1                      (first segment must be one of these)
//! <marker> <length> <payload> ...  (until and including SOS)
//! Data                             (everything up to the last 2 bytes)
//! EOI                              (the last 2 bytes)
//! ```
//!
//! The scan data is not searched for markers. Its extent is inferred from the
//! file size, so the last two bytes of the file must be EOI.

use std::fmt;

use tracing::debug;

use crate::error::FramingError;
use crate::io::{ByteSource, SourceCursor};

use super::markers::{is_standalone, marker_name, APP0, APP1, DATA, EOI, SOI, SOS};

// =============================================================================
// Segment
// =============================================================================

/// One marker segment, or the synthetic Data segment.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Marker code (`DATA` for the scan region)
    pub marker: u16,

    /// Payload length, excluding the marker and the length field
    pub length: u64,

    /// Absolute offset of the marker's 0xFF byte (of the region for Data)
    pub marker_offset: u64,

    /// Absolute offset of the first payload byte
    pub file_offset: u64,

    /// View over exactly the payload bytes
    pub payload: ByteSource,
}

impl Segment {
    /// Display name, or four hex digits for markers outside the known set.
    pub fn name(&self) -> String {
        match marker_name(self.marker) {
            Some(name) => name.to_string(),
            None => format!("{:04x}", self.marker),
        }
    }

    /// Absolute offset just past the payload.
    #[inline]
    pub fn end_offset(&self) -> u64 {
        self.file_offset + self.length
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<4}: {:08x}, {}[bytes]",
            self.name(),
            self.file_offset,
            self.length
        )
    }
}

// =============================================================================
// Framing
// =============================================================================

/// Walk `source` into its ordered list of segments.
///
/// The first two segments are always SOI and APP0/APP1; the last two are
/// always Data and EOI.
///
/// # Errors
/// Any short read, unexpected marker, bad length or empty scan region aborts
/// framing. There is no partial result.
pub fn frame(source: &ByteSource) -> Result<Vec<Segment>, FramingError> {
    let mut cursor = source.cursor();
    let mut segments = Vec::new();

    // SOI
    segments.push(read_standalone(&mut cursor, SOI, "SOI")?);

    // APP0 or APP1
    let first = read_length_segment(&mut cursor)?;
    if first.marker != APP0 && first.marker != APP1 {
        return Err(FramingError::UnexpectedMarker {
            expected: "APP0 or APP1",
            found: first.marker,
            offset: first.marker_offset,
        });
    }
    segments.push(first);

    // Header segments, up to and including SOS
    loop {
        let segment = read_length_segment(&mut cursor)?;
        let is_sos = segment.marker == SOS;
        segments.push(segment);
        if is_sos {
            break;
        }
    }

    // Data: from the end of SOS to two bytes before the end of the file
    let start = cursor.position();
    let trailer = source.len().checked_sub(2).filter(|&t| t > start).ok_or(
        FramingError::EmptyScanData {
            start: source.file_offset() + start,
            trailer: (source.file_offset() + source.len()).saturating_sub(2),
        },
    )?;
    let length = trailer - start;
    segments.push(Segment {
        marker: DATA,
        length,
        marker_offset: source.file_offset() + start,
        file_offset: source.file_offset() + start,
        payload: source.slice(start, length)?,
    });
    debug!(
        offset = source.file_offset() + start,
        length, "Scan data located"
    );

    // EOI
    cursor.seek(trailer);
    segments.push(read_standalone(&mut cursor, EOI, "EOI")?);

    debug!(
        source = source.identifier(),
        segments = segments.len(),
        "Framed JPEG stream"
    );
    Ok(segments)
}

/// Read a marker that carries no length field.
fn read_standalone(
    cursor: &mut SourceCursor,
    expected: u16,
    expected_name: &'static str,
) -> Result<Segment, FramingError> {
    let marker_offset = cursor.file_position();
    let marker = cursor.read_u16_be()?;
    if marker != expected {
        return Err(FramingError::UnexpectedMarker {
            expected: expected_name,
            found: marker,
            offset: marker_offset,
        });
    }

    let payload = cursor.source().slice(cursor.position(), 0)?;
    Ok(Segment {
        marker,
        length: 0,
        marker_offset,
        file_offset: cursor.file_position(),
        payload,
    })
}

/// Read a marker, its length field and its payload, leaving the cursor just
/// past the payload.
fn read_length_segment(cursor: &mut SourceCursor) -> Result<Segment, FramingError> {
    let marker_offset = cursor.file_position();
    let marker = cursor.read_u16_be()?;
    if is_standalone(marker) {
        return Err(FramingError::UnexpectedMarker {
            expected: "a length-bearing marker",
            found: marker,
            offset: marker_offset,
        });
    }

    let length_field = cursor.read_u16_be()?;
    if length_field < 2 {
        return Err(FramingError::InvalidLength {
            marker,
            length: length_field,
            offset: marker_offset,
        });
    }

    // The length field counts itself
    let length = (length_field - 2) as u64;
    let start = cursor.position();
    let payload = cursor
        .source()
        .slice(start, length)
        .map_err(|_| FramingError::SegmentOverrun {
            marker,
            offset: marker_offset,
            length,
            size: cursor.source().file_offset() + cursor.source().len(),
        })?;
    cursor.seek(start + length);

    Ok(Segment {
        marker,
        length,
        marker_offset,
        file_offset: payload.file_offset(),
        payload,
    })
}

// =============================================================================
// Tests
// =============================================================================
