//! Reassembly of standard and extended XMP chunks into one stream.
//!
//! Standard packets are taken whole, in file order. Extended portions are
//! grouped by digest (groups ordered by first appearance), each group's
//! portions are sorted by their declared offset, and the payloads are
//! concatenated. The final stream is the standard packets followed by each
//! reconstructed group.

use bytes::{Bytes, BytesMut};
use md5::{Digest, Md5};
use tracing::{debug, warn};

use super::chunk::{ChunkKind, XmpChunk};
use super::document::{decode_documents, DecodedDocuments, XmpDocument};

// =============================================================================
// ExtendedGroup
// =============================================================================

/// Summary of one reconstructed extended XMP packet.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExtendedGroup {
    /// Digest as declared by the chunks
    pub digest: String,

    /// Declared full length
    pub full_length: u32,

    /// Number of bytes actually reassembled
    pub assembled_length: u64,

    /// Number of portions in the group
    pub chunks: usize,

    /// Whether `assembled_length == full_length`
    pub length_matches: bool,

    /// Whether the MD5 of the reassembled bytes equals the declared digest
    pub digest_matches: bool,
}

struct GroupBuilder {
    digest: [u8; 32],
    full_length: u32,
    portions: Vec<(u32, Bytes)>,
}

// =============================================================================
// XmpReassembler
// =============================================================================

/// Collects XMP chunks in file order.
#[derive(Default)]
pub struct XmpReassembler {
    standard: Vec<Bytes>,
    groups: Vec<GroupBuilder>,
}

impl XmpReassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next chunk in file order.
    pub fn push(&mut self, chunk: XmpChunk) {
        match chunk.kind {
            ChunkKind::Standard => self.standard.push(chunk.payload),
            ChunkKind::Extended(header) => {
                match self.groups.iter_mut().find(|g| g.digest == header.digest) {
                    Some(group) => group.portions.push((header.offset, chunk.payload)),
                    None => self.groups.push(GroupBuilder {
                        digest: header.digest,
                        full_length: header.full_length,
                        portions: vec![(header.offset, chunk.payload)],
                    }),
                }
            }
        }
    }

    /// Whether no chunk has been pushed.
    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.groups.is_empty()
    }

    /// Concatenate everything pushed so far.
    pub fn finish(self) -> ReassembledXmp {
        let mut stream = BytesMut::new();
        for packet in &self.standard {
            stream.extend_from_slice(packet);
        }

        let mut groups = Vec::with_capacity(self.groups.len());
        for mut group in self.groups {
            // Stable: equal offsets keep file order
            group.portions.sort_by_key(|(offset, _)| *offset);

            let start = stream.len();
            for (_, payload) in &group.portions {
                stream.extend_from_slice(payload);
            }
            let assembled = &stream[start..];

            let digest = String::from_utf8_lossy(&group.digest).into_owned();
            let computed = hex::encode_upper(Md5::digest(assembled));
            let summary = ExtendedGroup {
                length_matches: assembled.len() as u64 == group.full_length as u64,
                digest_matches: computed.eq_ignore_ascii_case(&digest),
                digest,
                full_length: group.full_length,
                assembled_length: assembled.len() as u64,
                chunks: group.portions.len(),
            };

            if !summary.length_matches {
                warn!(
                    digest = %summary.digest,
                    declared = summary.full_length,
                    assembled = summary.assembled_length,
                    "Extended XMP length mismatch"
                );
            }
            if !summary.digest_matches {
                warn!(
                    digest = %summary.digest,
                    computed = %computed,
                    "Extended XMP digest mismatch"
                );
            }
            debug!(
                digest = %summary.digest,
                chunks = summary.chunks,
                length = summary.assembled_length,
                "Reassembled extended XMP"
            );
            groups.push(summary);
        }

        ReassembledXmp {
            stream: stream.freeze(),
            standard_chunks: self.standard.len(),
            groups,
        }
    }
}

// =============================================================================
// ReassembledXmp
// =============================================================================

/// The complete XMP byte stream of a file.
#[derive(Debug, Clone, Default)]
pub struct ReassembledXmp {
    stream: Bytes,
    standard_chunks: usize,
    groups: Vec<ExtendedGroup>,
}

impl ReassembledXmp {
    /// Raw concatenated stream, as written to a `.xmp` dump.
    pub fn stream(&self) -> &Bytes {
        &self.stream
    }

    /// Whether the file carried no XMP at all.
    pub fn is_empty(&self) -> bool {
        self.standard_chunks == 0 && self.groups.is_empty()
    }

    /// Number of standard packets.
    pub fn standard_chunks(&self) -> usize {
        self.standard_chunks
    }

    /// Extended groups in first-appearance order.
    pub fn groups(&self) -> &[ExtendedGroup] {
        &self.groups
    }

    /// Decode the stream into documents, keeping the reason decoding stopped.
    pub fn decode(&self) -> DecodedDocuments {
        decode_documents(&self.stream)
    }

    /// Decode the stream into documents.
    pub fn documents(&self) -> Vec<XmpDocument> {
        self.decode().documents
    }
}

// =============================================================================
// Tests
// =============================================================================
