//! Parsers for the formats found inside a camera JPEG.
//!
//! - [`jpeg`]: marker-segment framing and payload classification
//! - [`tiff`]: the Exif directory chain carried in APP1
//! - [`xmp`]: XMP chunk reassembly and document decoding

pub mod jpeg;
pub mod tiff;
pub mod xmp;

pub use jpeg::{JpegFile, Segment, SegmentPayload};
pub use tiff::TiffFile;
pub use xmp::{ReassembledXmp, XmpDocument};
