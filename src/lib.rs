//! # XMP Carver
//!
//! A JPEG decoder for camera images that embed extra pictures through XMP.
//!
//! The library frames a JPEG into its marker segments, decodes the Exif TIFF
//! directories and the standard / extended XMP packets carried in APP1, and
//! carves out the images the XMP describes: the original image, depth map and
//! confidence map of a resource container, or the base64 depth map and image
//! of the legacy depth schema.
//!
//! ## Architecture
//!
//! - [`io`] - Range readers, block caching and bounded byte views
//! - [`mod@format`] - JPEG framing, TIFF directories and XMP reassembly
//! - [`extract`] - Schema selection and asset extraction
//! - [`report`] - Serializable per-file reports
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use xmp_carver::{AssetExtractor, ByteSource, FileReader, JpegFile};
//!
//! let reader = FileReader::open("IMG_0001.jpg").unwrap();
//! let jpeg = JpegFile::decode(ByteSource::new(reader)).unwrap();
//! print!("{}", jpeg);
//!
//! let outcome = AssetExtractor::new(&jpeg).extract().unwrap();
//! for asset in outcome.assets() {
//!     println!("{}: {} bytes", asset.file_suffix(), asset.data.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod io;
pub mod report;

// Re-export commonly used types
pub use config::{Config, ReportFormat};
pub use error::{Error, FramingError, IoError, PayloadError, SchemaError, TiffError, XmpError};
pub use extract::{
    Asset, AssetExtractor, AssetKind, ContainerExtraction, ContainerItem, DepthMetadata,
    ExtractionOutcome, LegacyExtraction,
};
pub use format::jpeg::{frame, DecodedSegment, JfifHeader, JpegFile, Segment, SegmentPayload};
pub use format::tiff::{ByteOrder, FieldType, Ifd, IfdEntry, TiffFile, TiffTag, TypedValue};
pub use format::xmp::{
    ChunkKind, ExtendedGroup, ExtendedHeader, ReassembledXmp, XmpChunk, XmpDocument,
    XmpReassembler,
};
pub use io::{BlockCache, ByteSource, FileReader, MemoryReader, RangeReader, SourceCursor};
pub use report::FileReport;
