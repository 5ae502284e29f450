//! A framed and decoded JPEG file.

use std::fmt;

use tracing::{debug, warn};

use crate::error::{FramingError, PayloadError};
use crate::format::tiff::TiffFile;
use crate::format::xmp::{ReassembledXmp, XmpReassembler};
use crate::io::ByteSource;

use super::framer::{frame, Segment};
use super::markers::DATA;
use super::payload::SegmentPayload;

/// A segment together with its decoded payload.
#[derive(Debug, Clone)]
pub struct DecodedSegment {
    pub segment: Segment,

    /// Decoded payload, or why decoding it failed
    pub payload: Result<SegmentPayload, PayloadError>,
}

impl fmt::Display for DecodedSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.segment)?;
        match &self.payload {
            Ok(payload) => write!(f, "{}", payload),
            Err(e) => writeln!(f, "  error: {}", e),
        }
    }
}

/// A JPEG file: its segments, their decoded payloads and the reassembled XMP.
#[derive(Debug, Clone)]
pub struct JpegFile {
    source: ByteSource,
    segments: Vec<DecodedSegment>,
    data_index: usize,
    xmp: ReassembledXmp,
}

impl JpegFile {
    /// Frame `source` and decode every segment payload.
    ///
    /// Framing errors are fatal. A payload that fails to decode is recorded
    /// on its segment and logged; the remaining segments are still decoded.
    pub fn decode(source: ByteSource) -> Result<Self, FramingError> {
        let framed = frame(&source)?;

        let mut reassembler = XmpReassembler::new();
        let mut segments = Vec::with_capacity(framed.len());
        for segment in framed {
            let payload = SegmentPayload::decode(&segment);
            match &payload {
                Ok(decoded) => {
                    if let Some(chunk) = decoded.xmp_chunk(segment.file_offset) {
                        debug!(offset = segment.file_offset, "{}", chunk);
                        reassembler.push(chunk);
                    }
                }
                Err(e) => warn!(
                    source = source.identifier(),
                    segment = %segment,
                    error = %e,
                    "Failed to decode segment payload"
                ),
            }
            segments.push(DecodedSegment { segment, payload });
        }

        // The framer always emits Data second to last
        let data_index = segments.len().saturating_sub(2);
        debug_assert_eq!(segments[data_index].segment.marker, DATA);

        Ok(JpegFile {
            source,
            segments,
            data_index,
            xmp: reassembler.finish(),
        })
    }

    /// The whole file.
    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// All segments in file order.
    pub fn segments(&self) -> &[DecodedSegment] {
        &self.segments
    }

    /// The synthetic segment spanning the scan data.
    pub fn data_segment(&self) -> &Segment {
        &self.segments[self.data_index].segment
    }

    /// The reassembled XMP stream (empty if the file has none).
    pub fn xmp(&self) -> &ReassembledXmp {
        &self.xmp
    }

    /// The first Exif TIFF stream, if any.
    pub fn exif(&self) -> Option<&TiffFile> {
        self.segments.iter().find_map(|s| match &s.payload {
            Ok(SegmentPayload::Exif(tiff)) => Some(tiff),
            _ => None,
        })
    }

    /// Segments whose payload failed to decode.
    pub fn payload_errors(&self) -> impl Iterator<Item = (&Segment, &PayloadError)> {
        self.segments
            .iter()
            .filter_map(|s| s.payload.as_ref().err().map(|e| (&s.segment, e)))
    }
}

impl fmt::Display for JpegFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
