//! XMP chunk reassembly and document decoding.
//!
//! APP1 segments carry XMP either as one standard packet or as portions of
//! an ExtendedXMP packet keyed by an MD5 digest. [`XmpReassembler`] collects
//! both kinds in file order and yields a [`ReassembledXmp`] stream, which is
//! then split into independent [`XmpDocument`]s.

mod chunk;
mod document;
mod reassembly;

pub use chunk::{ChunkKind, ExtendedHeader, XmpChunk, XMP_EXTENSION_ID, XMP_STANDARD_ID};
pub use document::{
    decode_documents, DecodedDocuments, DirectoryItem, XmpDocument, NS_CONTAINER, NS_DEVICE,
    NS_GDEPTH, NS_GIMAGE, NS_ITEM, NS_META, NS_RDF,
};
pub use reassembly::{ExtendedGroup, ReassembledXmp, XmpReassembler};
