//! TIFF tag value decoding.
//!
//! Values are decoded from borrowed byte slices with explicit per-type
//! functions. Inline values come from the entry's 4-byte slot during directory
//! decoding; out-of-line values are resolved on demand by [`ValueReader`].

use std::fmt;

use bytes::Bytes;

use crate::error::TiffError;
use crate::io::ByteSource;

use super::parser::{ByteOrder, IfdEntry};
use super::tags::FieldType;

// =============================================================================
// TypedValue
// =============================================================================

/// A single decoded TIFF value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "type", content = "value")]
pub enum TypedValue {
    Byte(u8),
    Ascii(u8),
    Short(u16),
    Long(u32),
    SByte(i8),
    Undefined(u8),
    SShort(i16),
    SLong(i32),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Byte(v) | TypedValue::Ascii(v) | TypedValue::Undefined(v) => {
                write!(f, "{}", v)
            }
            TypedValue::Short(v) => write!(f, "{}", v),
            TypedValue::Long(v) => write!(f, "{}", v),
            TypedValue::SByte(v) => write!(f, "{}", v),
            TypedValue::SShort(v) => write!(f, "{}", v),
            TypedValue::SLong(v) => write!(f, "{}", v),
        }
    }
}

/// Decode `count` values of `field_type` from `bytes`.
///
/// Returns `None` for RATIONAL/SRATIONAL, which are not decoded. Elements that
/// would run past the end of `bytes` are dropped.
pub fn decode_values(
    field_type: FieldType,
    count: usize,
    bytes: &[u8],
    byte_order: ByteOrder,
) -> Option<Vec<TypedValue>> {
    if !field_type.is_supported() {
        return None;
    }

    let size = field_type.size_in_bytes();
    let available = (bytes.len() / size).min(count);
    let mut values = Vec::with_capacity(available);

    for chunk in bytes.chunks_exact(size).take(available) {
        let value = match field_type {
            FieldType::Byte => TypedValue::Byte(chunk[0]),
            FieldType::Ascii => TypedValue::Ascii(chunk[0]),
            FieldType::Undefined => TypedValue::Undefined(chunk[0]),
            FieldType::SByte => TypedValue::SByte(chunk[0] as i8),
            FieldType::Short => TypedValue::Short(byte_order.read_u16(chunk)),
            FieldType::SShort => TypedValue::SShort(byte_order.read_u16(chunk) as i16),
            FieldType::Long => TypedValue::Long(byte_order.read_u32(chunk)),
            FieldType::SLong => TypedValue::SLong(byte_order.read_u32(chunk) as i32),
            FieldType::Rational | FieldType::SRational => return None,
        };
        values.push(value);
    }

    Some(values)
}

// =============================================================================
// ValueReader
// =============================================================================

/// Resolves out-of-line tag values against the TIFF stream they belong to.
///
/// Offsets in IFD entries are relative to the TIFF header, so the reader is
/// built over the view that starts at the header.
pub struct ValueReader<'a> {
    source: &'a ByteSource,
    byte_order: ByteOrder,
}

impl<'a> ValueReader<'a> {
    /// Create a new ValueReader over the TIFF stream.
    pub fn new(source: &'a ByteSource, byte_order: ByteOrder) -> Self {
        Self { source, byte_order }
    }

    /// Get the byte order.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Read raw bytes for an IFD entry's value.
    ///
    /// For inline values, returns the used part of the 4-byte slot.
    /// For offset values, fetches the bytes from the stream.
    pub fn read_bytes(&self, entry: &IfdEntry) -> Result<Bytes, TiffError> {
        let size = entry
            .value_byte_size()
            .ok_or(TiffError::UnsupportedFieldType(entry.field_type_raw))?;

        if entry.is_inline {
            Ok(Bytes::copy_from_slice(
                &entry.value_offset_bytes[..size as usize],
            ))
        } else {
            let offset = entry.value_offset(self.byte_order) as u64;
            Ok(self.source.read_at(offset, size as usize)?)
        }
    }

    /// Decode all values of an entry, resolving the out-of-line array if needed.
    pub fn read_values(&self, entry: &IfdEntry) -> Result<Vec<TypedValue>, TiffError> {
        if let Some(values) = &entry.values {
            return Ok(values.clone());
        }

        let field_type = entry
            .field_type
            .filter(|ft| ft.is_supported())
            .ok_or(TiffError::UnsupportedFieldType(entry.field_type_raw))?;

        let bytes = self.read_bytes(entry)?;
        decode_values(field_type, entry.count as usize, &bytes, self.byte_order)
            .ok_or(TiffError::UnsupportedFieldType(entry.field_type_raw))
    }

    /// Read an ASCII value, stripping the NUL terminator.
    pub fn read_string(&self, entry: &IfdEntry) -> Result<String, TiffError> {
        if entry.field_type != Some(FieldType::Ascii) {
            return Err(TiffError::UnsupportedFieldType(entry.field_type_raw));
        }

        let bytes = self.read_bytes(entry)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

// =============================================================================
// Tests
// =============================================================================
