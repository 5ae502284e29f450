//! Extraction of embedded images described by XMP.
//!
//! Two embedding schemas are recognised:
//!
//! - **Resource container**: the second XMP document lists four directory
//!   items (primary image, original image, depth map, confidence map) by byte
//!   length. The three auxiliary images are appended to the primary image, so
//!   their offsets are reconstructed backwards from the end of the scan data.
//!   See [`container`].
//!
//! - **Legacy depth**: the first document declares depth parameters and
//!   mime types; the second carries the depth map and a secondary image as
//!   base64 attributes. See [`legacy`].
//!
//! ```text
//! XMP stream empty?  ── yes ──▶ NoAssets
//!        │ no
//!        ▼
//! >1 documents and document 2 lists 4 items? ── yes ──▶ container
//!        │ no
//!        ▼
//!     legacy (fails with a SchemaError if the documents do not fit)
//! ```

pub mod container;
pub mod legacy;

use bytes::Bytes;
use tracing::debug;

use crate::error::SchemaError;
use crate::format::jpeg::JpegFile;

pub use container::{ContainerExtraction, ContainerItem};
pub use legacy::{DepthMetadata, LegacyExtraction};

/// Mime type of JPEG assets
pub const MIME_JPEG: &str = "image/jpeg";

/// Mime type of PNG depth maps
pub const MIME_PNG: &str = "image/png";

// =============================================================================
// Asset
// =============================================================================

/// What an extracted asset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Unprocessed camera image (container schema)
    OriginalImage,
    /// Depth map (container schema)
    DepthMap,
    /// Depth confidence map (container schema)
    ConfidenceMap,
    /// Depth map (legacy schema)
    Depth,
    /// Secondary image (legacy schema)
    Image,
}

/// One image carved out of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub kind: AssetKind,

    /// Declared mime type
    pub mime: String,

    /// Exact bytes of the image
    pub data: Bytes,

    /// Whether the trailing EOI was appended because the file's own EOI
    /// doubled as this image's
    pub trailer_synthesized: bool,
}

impl Asset {
    /// Suffix appended to the input file name when the asset is written.
    pub fn file_suffix(&self) -> &'static str {
        match self.kind {
            AssetKind::OriginalImage => "original_image.jpg",
            AssetKind::DepthMap => "depthmap.jpg",
            AssetKind::ConfidenceMap => "confidencemap.jpg",
            AssetKind::Depth if self.mime == MIME_JPEG => "depth.jpg",
            AssetKind::Depth => "depth.png",
            AssetKind::Image => "image.jpg",
        }
    }
}

// =============================================================================
// ExtractionOutcome
// =============================================================================

/// Result of running the extractor over a file.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    /// The file carries no XMP, so there is nothing to extract
    NoAssets,
    /// Resource container schema
    Container(ContainerExtraction),
    /// Legacy depth schema
    Legacy(LegacyExtraction),
}

impl ExtractionOutcome {
    /// The extracted assets, in output order.
    pub fn assets(&self) -> &[Asset] {
        match self {
            ExtractionOutcome::NoAssets => &[],
            ExtractionOutcome::Container(c) => &c.assets,
            ExtractionOutcome::Legacy(l) => &l.assets,
        }
    }

    /// Short name of the matched schema.
    pub fn schema_name(&self) -> &'static str {
        match self {
            ExtractionOutcome::NoAssets => "none",
            ExtractionOutcome::Container(_) => "container",
            ExtractionOutcome::Legacy(_) => "legacy",
        }
    }
}

// =============================================================================
// AssetExtractor
// =============================================================================

/// Matches a file's XMP against the known schemas and carves out the images.
pub struct AssetExtractor<'a> {
    file: &'a JpegFile,
}

impl<'a> AssetExtractor<'a> {
    pub fn new(file: &'a JpegFile) -> Self {
        Self { file }
    }

    /// Run extraction.
    ///
    /// A file with no XMP yields [`ExtractionOutcome::NoAssets`]. A file with
    /// XMP that fits neither schema is an error.
    pub fn extract(&self) -> Result<ExtractionOutcome, SchemaError> {
        let xmp = self.file.xmp();
        if xmp.is_empty() {
            debug!("No XMP present, nothing to extract");
            return Ok(ExtractionOutcome::NoAssets);
        }

        let documents = xmp.documents();
        debug!(documents = documents.len(), "Decoded XMP documents");

        if container::applies(&documents) {
            return container::extract(&documents, self.file.data_segment())
                .map(ExtractionOutcome::Container);
        }

        legacy::extract(&documents).map(ExtractionOutcome::Legacy)
    }
}
