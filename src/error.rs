use thiserror::Error;

/// I/O errors that can occur when reading from a byte source
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Error from the local filesystem
    #[error("File error on {path}: {message}")]
    File { path: String, message: String },
}

/// Structural violations of the JPEG marker-segment layout.
///
/// Any of these aborts the whole file; there is no partial result.
#[derive(Debug, Clone, Error)]
pub enum FramingError {
    /// I/O error while reading a marker or length
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A specific marker was required at this position
    #[error("Expected {expected} at offset 0x{offset:08x}, found marker 0x{found:04X}")]
    UnexpectedMarker {
        expected: &'static str,
        found: u16,
        offset: u64,
    },

    /// Length field smaller than the 2 bytes it occupies
    #[error("Invalid length {length} for marker 0x{marker:04X} at offset 0x{offset:08x}")]
    InvalidLength { marker: u16, length: u16, offset: u64 },

    /// Segment payload runs past the end of the file
    #[error("Segment 0x{marker:04X} at offset 0x{offset:08x} needs {length} bytes, file is {size} bytes")]
    SegmentOverrun {
        marker: u16,
        offset: u64,
        length: u64,
        size: u64,
    },

    /// The entropy-coded region between SOS and EOI is empty or negative
    #[error("Invalid length of scan data: starts at 0x{start:08x}, trailer at 0x{trailer:08x}")]
    EmptyScanData { start: u64, trailer: u64 },
}

/// Errors that can occur when decoding a TIFF (Exif) directory chain
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the directory
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF byte-order bytes (not II or MM)
    #[error("Invalid TIFF byte order at 0x{offset:08x}: expected 0x4949 (II) or 0x4D4D (MM), got 0x{found:04X}")]
    InvalidByteOrder { found: u16, offset: u64 },

    /// Invalid TIFF magic number
    #[error("Invalid TIFF version at 0x{offset:08x}: expected 42, got {found}")]
    InvalidVersion { found: u16, offset: u64 },

    /// The IFD chain links back to a directory already visited
    #[error("IFD chain cycles back to offset {0}")]
    IfdCycle(u64),

    /// Field type that cannot be decoded into values
    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(u16),
}

/// Errors produced while decoding an APP1/XMP payload or an XML document
#[derive(Debug, Clone, Error)]
pub enum XmpError {
    /// I/O error while reading the segment payload
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// APP1 identifier is neither Exif nor a known XMP namespace
    #[error("Unrecognized APP1 payload at 0x{offset:08x}: identifier {identifier:?}")]
    UnrecognizedIdentifier { identifier: String, offset: u64 },

    /// XML is malformed or does not have the expected shape
    #[error("Malformed XMP document at byte {position}: {message}")]
    Malformed { position: u64, message: String },
}

/// Failure to decode a single segment's payload.
///
/// Recorded on the segment it belongs to; the rest of the file is still
/// decoded.
#[derive(Debug, Clone, Error)]
pub enum PayloadError {
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    #[error("Exif error: {0}")]
    Tiff(#[from] TiffError),

    #[error("XMP error: {0}")]
    Xmp(#[from] XmpError),
}

/// Errors from matching decoded XMP against a known embedding schema
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The resource container directory does not have the expected items
    #[error("Unknown container format: {0}")]
    UnknownContainerFormat(String),

    /// The legacy depth schema needs a main and an extended document
    #[error("Insufficient XMP documents: expected 2, found {0}")]
    InsufficientDocuments(usize),

    /// The legacy depth schema is missing a required field
    #[error("Unknown depth XMP format: {0}")]
    UnknownDepthFormat(String),

    /// Embedded payload is not valid base64
    #[error("Invalid base64 in {field}: {message}")]
    InvalidBase64 { field: &'static str, message: String },

    /// Computed byte range falls outside the scan data
    #[error("Item {uri} range [{offset}, {end}) is outside the scan data of {available} bytes")]
    RangeOutsideData {
        uri: String,
        offset: i64,
        end: i64,
        available: u64,
    },

    /// I/O error while copying an embedded image
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

/// Top-level error for processing one input file
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}
