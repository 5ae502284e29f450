use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use bytes::Bytes;

use super::range_reader::check_range;
use super::RangeReader;
use crate::error::IoError;

// =============================================================================
// MemoryReader
// =============================================================================

/// In-memory implementation of RangeReader.
///
/// Reads are zero-copy slices of the shared buffer.
#[derive(Clone)]
pub struct MemoryReader {
    data: Bytes,
    identifier: String,
}

impl MemoryReader {
    /// Create a reader over `data`.
    pub fn new(data: impl Into<Bytes>, identifier: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }
}

impl RangeReader for MemoryReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.size())?;
        let start = offset as usize;
        Ok(self.data.slice(start..start + len))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// FileReader
// =============================================================================

/// Local-file implementation of RangeReader.
///
/// The file size is captured once on open; the handle is shared behind a
/// mutex so seek+read pairs stay atomic.
#[derive(Debug)]
pub struct FileReader {
    file: Mutex<File>,
    size: u64,
    identifier: String,
}

impl FileReader {
    /// Open `path` for positional reads.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let identifier = path.display().to_string();
        let file_error = |e: std::io::Error| IoError::File {
            path: identifier.clone(),
            message: e.to_string(),
        };

        let file = File::open(path).map_err(file_error)?;
        let size = file.metadata().map_err(file_error)?.len();

        Ok(Self {
            file: Mutex::new(file),
            size,
            identifier,
        })
    }
}

impl RangeReader for FileReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.size)?;
        if len == 0 {
            return Ok(Bytes::new());
        }

        let file_error = |e: std::io::Error| IoError::File {
            path: self.identifier.clone(),
            message: e.to_string(),
        };

        let mut buf = vec![0u8; len];
        let mut file = self.file.lock().map_err(|_| IoError::File {
            path: self.identifier.clone(),
            message: "file handle lock poisoned".to_string(),
        })?;
        file.seek(SeekFrom::Start(offset)).map_err(file_error)?;
        file.read_exact(&mut buf).map_err(file_error)?;

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
