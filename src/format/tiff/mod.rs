//! TIFF directory decoder for Exif payloads.
//!
//! # Key Concepts
//!
//! - **Byte order**: the stream declares its endianness (II = little-endian,
//!   MM = big-endian) in the header. All multi-byte values must be read
//!   respecting this order.
//!
//! - **IFD chain**: directories form a singly linked list over header-relative
//!   offsets. The decoder stores them in one vector and refuses to revisit an
//!   offset, so a corrupt link cannot loop forever.
//!
//! - **Inline vs offset values**: values of up to 4 bytes are stored in the
//!   entry's slot and decoded immediately; larger values are stored at an
//!   offset and resolved on demand through [`ValueReader`].

mod parser;
mod tags;
mod values;

pub use parser::{ByteOrder, Ifd, IfdEntry, TiffFile, TiffHeader, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE};
pub use tags::{FieldType, TiffTag};
pub use values::{decode_values, TypedValue, ValueReader};
