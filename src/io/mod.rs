mod block_cache;
mod byte_source;
mod local_reader;
mod range_reader;

pub use block_cache::{BlockCache, DEFAULT_BLOCK_SIZE, DEFAULT_CACHE_CAPACITY};
pub use byte_source::{ByteSource, SourceCursor};
pub use local_reader::{FileReader, MemoryReader};
pub use range_reader::{read_u16_be, read_u16_le, read_u32_be, read_u32_le, RangeReader};
