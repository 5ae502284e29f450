//! Configuration management for XMP Carver.
//!
//! Settings come from command-line arguments (via clap), with environment
//! variable fallbacks for the tuning knobs.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use xmp_carver::config::Config;
//!
//! let config = Config::parse();
//! for input in &config.inputs {
//!     println!("{}", input.display());
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `XMPC_OUTPUT_DIR` - Directory for extracted files (default: next to the input)
//! - `XMPC_FORMAT` - Report format, `text` or `json` (default: text)
//! - `XMPC_BLOCK_SIZE` - Read block size in bytes (default: 65536)
//! - `XMPC_CACHE_BLOCKS` - Max blocks cached per file (default: 64)

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::io::{DEFAULT_BLOCK_SIZE, DEFAULT_CACHE_CAPACITY};

// =============================================================================
// Default Values
// =============================================================================

/// Smallest accepted block size.
pub const MIN_BLOCK_SIZE: usize = 512;

/// Largest accepted block size (16 MiB).
pub const MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// How the per-file report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable segment dump
    #[default]
    Text,
    /// One JSON object per input file
    Json,
}

/// XMP Carver - decode JPEG segments and extract embedded depth images.
///
/// Dumps the marker segments, Exif directories and XMP packets of each input,
/// then writes the images described by its XMP next to it.
#[derive(Parser, Debug, Clone)]
#[command(name = "xmp-carver")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// JPEG files to decode.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    // =========================================================================
    // Output Configuration
    // =========================================================================
    /// Directory to write extracted files to.
    ///
    /// Defaults to the directory of each input file.
    #[arg(short, long, env = "XMPC_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only print the report; do not write extracted images.
    #[arg(long)]
    pub no_extract: bool,

    /// Also write the reassembled XMP stream to `<input>.xmp`.
    #[arg(long)]
    pub dump_xmp: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text, env = "XMPC_FORMAT")]
    pub format: ReportFormat,

    // =========================================================================
    // Read Configuration
    // =========================================================================
    /// Block size for cached file reads, in bytes.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, env = "XMPC_BLOCK_SIZE")]
    pub block_size: usize,

    /// Maximum number of blocks cached per file.
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, env = "XMPC_CACHE_BLOCKS")]
    pub cache_blocks: usize,

    // =========================================================================
    // Logging
    // =========================================================================
    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration.
    ///
    /// Returns an error message if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.inputs.is_empty() {
            return Err("at least one input file is required".to_string());
        }

        if self.inputs.iter().any(|p| p.as_os_str().is_empty()) {
            return Err("input path must not be empty".to_string());
        }

        if self.cache_blocks == 0 {
            return Err("cache_blocks must be greater than 0".to_string());
        }

        if self.block_size < MIN_BLOCK_SIZE || self.block_size > MAX_BLOCK_SIZE {
            return Err("block_size must be between 512 bytes and 16MB".to_string());
        }

        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!("output_dir {} is not a directory", dir.display()));
            }
        }

        Ok(())
    }

    /// Path an extracted file is written to: `<input>.<suffix>`.
    ///
    /// With an output directory the input's file name is joined to it;
    /// otherwise the file lands next to the input.
    pub fn output_path(&self, input: &Path, suffix: &str) -> PathBuf {
        let mut name = input
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(suffix);

        match &self.output_dir {
            Some(dir) => dir.join(name),
            None => input.with_file_name(name),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
