//! TIFF header and directory-chain decoding.
//!
//! An Exif APP1 segment embeds a classic TIFF stream: an 8-byte header
//! followed by a singly linked chain of Image File Directories. Every offset
//! inside the stream is relative to the first byte of the header, so the
//! decoder works on a [`ByteSource`] view that starts there.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes, header-relative)
//! ```
//!
//! # IFD Structure
//!
//! ```text
//! Bytes 0-1:   Entry count N
//! N x 12:      tag:2, type:2, count:4, value-or-offset:4
//! Bytes 4:     Offset of the next IFD (0 terminates the chain)
//! ```

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::error::TiffError;
use crate::io::{read_u16_be, read_u16_le, read_u32_be, read_u32_le, ByteSource};

use super::tags::{FieldType, TiffTag};
use super::values::{decode_values, TypedValue, ValueReader};

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
const VERSION_TIFF: u16 = 42;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of one IFD entry in bytes
pub const IFD_ENTRY_SIZE: u64 = 12;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF stream.
///
/// TIFF streams declare their byte order in the first two bytes of the header.
/// All multi-byte values in the stream must be read respecting this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::LittleEndian => f.write_str("little-endian"),
            ByteOrder::BigEndian => f.write_str("big-endian"),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the stream
    pub byte_order: ByteOrder,

    /// Header-relative offset of the first IFD
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Parse a TIFF header from its 8 raw bytes.
    ///
    /// `base_offset` is the absolute file offset of the header and only
    /// appears in error messages.
    ///
    /// # Errors
    /// - `InvalidByteOrder` if the first two bytes are not II or MM
    /// - `InvalidVersion` if the version is not 42
    pub fn parse(bytes: &[u8; TIFF_HEADER_SIZE], base_offset: u64) -> Result<Self, TiffError> {
        // The byte-order marker reads the same either way round
        let magic = read_u16_be(&bytes[0..2]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => {
                return Err(TiffError::InvalidByteOrder {
                    found: magic,
                    offset: base_offset,
                })
            }
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        if version != VERSION_TIFF {
            return Err(TiffError::InvalidVersion {
                found: version,
                offset: base_offset + 2,
            });
        }

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset: byte_order.read_u32(&bytes[4..8]),
        })
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// A single tagged entry of an IFD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEntry {
    /// Tag ID
    pub tag: u16,

    /// Field type, `None` if the raw type is not one of the ten TIFF types
    pub field_type: Option<FieldType>,

    /// Raw field type value as stored in the entry
    pub field_type_raw: u16,

    /// Number of values
    pub count: u32,

    /// The 4-byte value-or-offset slot exactly as stored
    pub value_offset_bytes: [u8; 4],

    /// Whether the value fits in the slot
    pub is_inline: bool,

    /// Values decoded in place from the slot.
    ///
    /// `None` for out-of-line values, RATIONAL/SRATIONAL and unknown types.
    pub values: Option<Vec<TypedValue>>,
}

impl IfdEntry {
    /// Decode an entry from its 12 raw bytes.
    pub fn parse(bytes: &[u8; IFD_ENTRY_SIZE as usize], byte_order: ByteOrder) -> Self {
        let tag = byte_order.read_u16(&bytes[0..2]);
        let field_type_raw = byte_order.read_u16(&bytes[2..4]);
        let count = byte_order.read_u32(&bytes[4..8]);

        let mut value_offset_bytes = [0u8; 4];
        value_offset_bytes.copy_from_slice(&bytes[8..12]);

        let field_type = FieldType::from_u16(field_type_raw);

        // Unknown types have no element size, so nothing ever spills out of line
        let is_inline = field_type.map_or(true, |ft| ft.fits_inline(count));

        let values = match field_type {
            Some(ft) if is_inline => {
                decode_values(ft, count as usize, &value_offset_bytes, byte_order)
            }
            _ => None,
        };

        IfdEntry {
            tag,
            field_type,
            field_type_raw,
            count,
            value_offset_bytes,
            is_inline,
            values,
        }
    }

    /// The slot interpreted as a header-relative offset.
    ///
    /// Only meaningful when `is_inline` is false.
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(&self.value_offset_bytes)
    }

    /// Total size of the value in bytes, `None` for unknown types.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type
            .map(|ft| ft.size_in_bytes() as u64 * self.count as u64)
    }

    /// Known tag, if this entry's ID is part of the vocabulary.
    pub fn known_tag(&self) -> Option<TiffTag> {
        TiffTag::from_u16(self.tag)
    }

    /// Tag name for display, hex ID for unknown tags.
    pub fn tag_name(&self) -> String {
        match self.known_tag() {
            Some(tag) => tag.name().to_string(),
            None => format!("0x{:04X}", self.tag),
        }
    }

    /// Type name for display.
    pub fn type_name(&self) -> String {
        match self.field_type {
            Some(ft) => ft.name().to_string(),
            None => format!("TYPE({})", self.field_type_raw),
        }
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// One directory of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    /// Header-relative offset of this IFD
    pub offset: u64,

    /// Entries in on-disk order
    pub entries: Vec<IfdEntry>,

    /// Raw header-relative offset of the next IFD (0 = terminal)
    pub next_ifd_offset: u32,

    /// Index of the next IFD in [`TiffFile::ifds`]
    pub next: Option<usize>,
}

impl Ifd {
    /// Find an entry by tag.
    pub fn get(&self, tag: TiffTag) -> Option<&IfdEntry> {
        self.get_by_id(tag.as_u16())
    }

    /// Find an entry by raw tag ID.
    pub fn get_by_id(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Header-relative offset of the `index`th entry.
    #[inline]
    pub fn entry_offset(&self, index: usize) -> u64 {
        self.offset + 2 + index as u64 * IFD_ENTRY_SIZE
    }

    /// Whether this is the last IFD of the chain.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.next_ifd_offset == 0
    }
}

// =============================================================================
// TiffFile
// =============================================================================

/// A decoded TIFF stream: header plus every IFD of the chain.
///
/// IFDs are stored in chain order in one vector; `Ifd::next` links them by
/// index.
#[derive(Debug, Clone)]
pub struct TiffFile {
    /// Parsed header
    pub header: TiffHeader,

    /// IFDs in chain order
    pub ifds: Vec<Ifd>,

    /// Absolute file offset of the header, for diagnostics
    pub base_offset: u64,

    /// View starting at the header
    source: ByteSource,
}

impl TiffFile {
    /// Decode the header and follow the IFD chain.
    ///
    /// `source` must start at the TIFF header. `base_offset` is the header's
    /// absolute file offset and is only used for diagnostics.
    ///
    /// # Errors
    /// - `InvalidByteOrder` / `InvalidVersion` for a bad header
    /// - `IfdCycle` if a next-IFD link points at a directory already visited
    /// - `Io` if any directory runs past the end of the stream
    pub fn decode(source: ByteSource, base_offset: u64) -> Result<Self, TiffError> {
        let mut cursor = source.cursor();
        let header = TiffHeader::parse(&cursor.read_array::<TIFF_HEADER_SIZE>()?, base_offset)?;
        let byte_order = header.byte_order;

        let mut ifds: Vec<Ifd> = Vec::new();
        let mut visited = HashSet::new();
        let mut offset = header.first_ifd_offset as u64;

        cursor.seek(offset);
        loop {
            if !visited.insert(offset) {
                return Err(TiffError::IfdCycle(offset));
            }

            let entry_count = byte_order.read_u16(&cursor.read_array::<2>()?);
            let mut entries = Vec::with_capacity(entry_count as usize);
            for _ in 0..entry_count {
                // The slot is always consumed whole, whatever the value size
                let raw = cursor.read_array::<{ IFD_ENTRY_SIZE as usize }>()?;
                entries.push(IfdEntry::parse(&raw, byte_order));
            }

            let next_ifd_offset = byte_order.read_u32(&cursor.read_array::<4>()?);
            debug!(
                ifd = ifds.len(),
                offset = base_offset + offset,
                entries = entry_count,
                next = next_ifd_offset,
                "Decoded IFD"
            );

            ifds.push(Ifd {
                offset,
                entries,
                next_ifd_offset,
                next: None,
            });

            if next_ifd_offset == 0 {
                break;
            }

            let index = ifds.len() - 1;
            ifds[index].next = Some(index + 1);
            offset = next_ifd_offset as u64;
            cursor.seek(offset);
        }

        Ok(TiffFile {
            header,
            ifds,
            base_offset,
            source,
        })
    }

    /// Byte order of the stream.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    /// View starting at the TIFF header.
    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// A reader for out-of-line values of this stream.
    pub fn value_reader(&self) -> ValueReader<'_> {
        ValueReader::new(&self.source, self.header.byte_order)
    }

    /// Walk the chain from the first IFD by following `next` indices.
    pub fn chain(&self) -> impl Iterator<Item = &Ifd> {
        let mut index = if self.ifds.is_empty() { None } else { Some(0) };
        std::iter::from_fn(move || {
            let ifd = self.ifds.get(index?)?;
            index = ifd.next;
            Some(ifd)
        })
    }

    /// Read an ASCII tag from the first IFD (e.g. Make or Model).
    pub fn string_tag(&self, tag: TiffTag) -> Option<String> {
        let entry = self.ifds.first()?.get(tag)?;
        self.value_reader().read_string(entry).ok()
    }

    /// Absolute file offset of a header-relative offset.
    #[inline]
    pub fn absolute_offset(&self, relative: u64) -> u64 {
        self.base_offset + relative
    }
}

impl fmt::Display for TiffFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "TIFF {} @ {:08x}, first IFD at {:08x}",
            self.header.byte_order,
            self.base_offset,
            self.absolute_offset(self.header.first_ifd_offset as u64)
        )?;

        let reader = self.value_reader();
        for (i, ifd) in self.ifds.iter().enumerate() {
            writeln!(
                f,
                "  IFD#{} @ {:08x}: {} entries, next {:08x}",
                i,
                self.absolute_offset(ifd.offset),
                ifd.entries.len(),
                ifd.next_ifd_offset
            )?;

            for (j, entry) in ifd.entries.iter().enumerate() {
                write!(
                    f,
                    "    {:08x} {} {} x{} [{:02x} {:02x} {:02x} {:02x}]",
                    self.absolute_offset(ifd.entry_offset(j)),
                    entry.tag_name(),
                    entry.type_name(),
                    entry.count,
                    entry.value_offset_bytes[0],
                    entry.value_offset_bytes[1],
                    entry.value_offset_bytes[2],
                    entry.value_offset_bytes[3],
                )?;

                if entry.field_type == Some(FieldType::Ascii) {
                    if let Ok(s) = reader.read_string(entry) {
                        write!(f, " {:?}", s)?;
                    }
                } else if let Some(values) = &entry.values {
                    write!(f, " =")?;
                    for v in values {
                        write!(f, " {}", v)?;
                    }
                } else if !entry.is_inline {
                    let target = entry.value_offset(self.header.byte_order) as u64;
                    write!(f, " -> {:08x}", self.absolute_offset(target))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
