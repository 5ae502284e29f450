//! Bounded views and cursors over a [`RangeReader`].
//!
//! A [`ByteSource`] is a window `[base, base + len)` of some reader. Views are
//! cheap to clone and can be sliced again, so a segment payload, the TIFF
//! stream inside it, and an out-of-line value inside that are all just nested
//! windows over the same underlying bytes. Nothing here ever mutates.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::range_reader::{check_range, read_u16_be};
use super::RangeReader;
use crate::error::IoError;

// =============================================================================
// ByteSource
// =============================================================================

/// A length-bounded, random-access view over shared immutable bytes.
#[derive(Clone)]
pub struct ByteSource {
    reader: Arc<dyn RangeReader>,
    base: u64,
    len: u64,
}

impl ByteSource {
    /// View the whole of `reader`.
    pub fn new<R: RangeReader + 'static>(reader: R) -> Self {
        Self::from_arc(Arc::new(reader))
    }

    /// View the whole of an already shared reader.
    pub fn from_arc(reader: Arc<dyn RangeReader>) -> Self {
        let len = reader.size();
        Self {
            reader,
            base: 0,
            len,
        }
    }

    /// Convenience constructor for in-memory data.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(super::MemoryReader::new(data, "memory"))
    }

    /// Length of this view in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether this view is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute offset of the first byte of this view in the underlying reader.
    #[inline]
    pub fn file_offset(&self) -> u64 {
        self.base
    }

    /// Identifier of the underlying reader.
    pub fn identifier(&self) -> &str {
        self.reader.identifier()
    }

    /// Create a sub-view `[offset, offset + len)` relative to this view.
    pub fn slice(&self, offset: u64, len: u64) -> Result<ByteSource, IoError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(ByteSource {
                reader: Arc::clone(&self.reader),
                base: self.base + offset,
                len,
            }),
            _ => Err(IoError::RangeOutOfBounds {
                offset: self.base.saturating_add(offset),
                requested: len,
                size: self.base + self.len,
            }),
        }
    }

    /// Sub-view from `offset` to the end of this view.
    pub fn slice_from(&self, offset: u64) -> Result<ByteSource, IoError> {
        let len = self.len.checked_sub(offset).ok_or(IoError::RangeOutOfBounds {
            offset: self.base.saturating_add(offset),
            requested: 0,
            size: self.base + self.len,
        })?;
        self.slice(offset, len)
    }

    /// Read exactly `len` bytes at `offset` (relative to this view).
    pub fn read_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.len).map_err(|_| IoError::RangeOutOfBounds {
            offset: self.base.saturating_add(offset),
            requested: len as u64,
            size: self.base + self.len,
        })?;
        self.reader.read_exact_at(self.base + offset, len)
    }

    /// Read the entire view.
    pub fn read_all(&self) -> Result<Bytes, IoError> {
        self.read_at(0, self.len as usize)
    }

    /// Open a cursor positioned at the start of this view.
    pub fn cursor(&self) -> SourceCursor {
        SourceCursor {
            source: self.clone(),
            pos: 0,
        }
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("identifier", &self.reader.identifier())
            .field("base", &self.base)
            .field("len", &self.len)
            .finish()
    }
}

// =============================================================================
// SourceCursor
// =============================================================================

/// Forward reader over a [`ByteSource`] with absolute seeks.
///
/// Positions are relative to the start of the view. Seeking past the end is
/// allowed; the next read then fails with `RangeOutOfBounds`.
#[derive(Debug, Clone)]
pub struct SourceCursor {
    source: ByteSource,
    pos: u64,
}

impl SourceCursor {
    /// Current position relative to the view start.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Absolute file offset of the current position.
    #[inline]
    pub fn file_position(&self) -> u64 {
        self.source.file_offset() + self.pos
    }

    /// Move to an absolute position within the view.
    #[inline]
    pub fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Bytes left before the end of the view.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.source.len().saturating_sub(self.pos)
    }

    /// The view this cursor walks.
    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// Read `len` bytes and advance.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, IoError> {
        let bytes = self.source.read_at(self.pos, len)?;
        self.pos += len as u64;
        Ok(bytes)
    }

    /// Read a fixed-size array and advance.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], IoError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, IoError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a big-endian u16.
    pub fn read_u16_be(&mut self) -> Result<u16, IoError> {
        Ok(read_u16_be(&self.read_array::<2>()?))
    }

    /// Read everything from the current position to the end of the view.
    pub fn read_to_end(&mut self) -> Result<Bytes, IoError> {
        let len = self.remaining() as usize;
        self.read_bytes(len)
    }

    /// Read bytes up to (not including) a NUL, consuming the NUL.
    ///
    /// Stops quietly at the end of the view if no NUL is found.
    pub fn read_until_nul(&mut self) -> Result<Vec<u8>, IoError> {
        let rest = self.source.read_at(self.pos, self.remaining() as usize)?;
        match rest.iter().position(|&b| b == 0) {
            Some(nul) => {
                self.pos += nul as u64 + 1;
                Ok(rest[..nul].to_vec())
            }
            None => {
                self.pos += rest.len() as u64;
                Ok(rest.to_vec())
            }
        }
    }
}
