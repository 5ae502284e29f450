//! JPEG container decoding.
//!
//! [`frame`] walks the marker segments of a file; [`SegmentPayload`]
//! classifies each payload (JFIF, Exif, standard/extended XMP); [`JpegFile`]
//! ties the two together and reassembles the XMP stream.

mod file;
mod framer;
pub mod markers;
mod payload;

pub use file::{DecodedSegment, JpegFile};
pub use framer::{frame, Segment};
pub use markers::marker_name;
pub use payload::{JfifHeader, SegmentPayload, EXIF_IDENTIFIER, JFIF_IDENTIFIER};
