//! XMP chunks carried by APP1 segments.

use std::fmt;

use bytes::Bytes;

/// Identifier of a standard XMP packet
pub const XMP_STANDARD_ID: &str = "http://ns.adobe.com/xap/1.0/";

/// Identifier of an ExtendedXMP portion
pub const XMP_EXTENSION_ID: &str = "http://ns.adobe.com/xmp/extension/";

/// Header fields of an ExtendedXMP portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtendedHeader {
    /// MD5 of the full extended packet as 32 uppercase hex characters
    pub digest: [u8; 32],

    /// Length of the full extended packet
    pub full_length: u32,

    /// Offset of this portion within the full packet
    pub offset: u32,
}

impl ExtendedHeader {
    /// The digest as text.
    pub fn digest_str(&self) -> String {
        String::from_utf8_lossy(&self.digest).into_owned()
    }
}

/// Whether a chunk is a whole standard packet or a portion of an extended one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Standard,
    Extended(ExtendedHeader),
}

/// One XMP payload as found in a single APP1 segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpChunk {
    pub kind: ChunkKind,

    /// Bytes following the identifier (and extended header, if any)
    pub payload: Bytes,

    /// Absolute offset of the APP1 payload this chunk came from
    pub file_offset: u64,
}

impl XmpChunk {
    /// The APP1 identifier this chunk was declared with.
    pub fn identifier(&self) -> &'static str {
        match self.kind {
            ChunkKind::Standard => XMP_STANDARD_ID,
            ChunkKind::Extended(_) => XMP_EXTENSION_ID,
        }
    }
}

impl fmt::Display for XmpChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChunkKind::Standard => write!(f, "XMP packet: standard, {}[bytes]", self.payload.len()),
            ChunkKind::Extended(header) => write!(
                f,
                "XMP packet: {}, {}/{}, {}[bytes]",
                header.digest_str(),
                header.offset,
                header.full_length,
                self.payload.len()
            ),
        }
    }
}
