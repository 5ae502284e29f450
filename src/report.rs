//! Serializable per-file reports for `--format json`.

use serde::Serialize;

use crate::error::SchemaError;
use crate::extract::{ContainerItem, DepthMetadata, ExtractionOutcome};
use crate::format::jpeg::{DecodedSegment, JfifHeader, JpegFile, SegmentPayload};
use crate::format::tiff::{ByteOrder, TiffFile, TiffTag, TypedValue};
use crate::format::xmp::{ExtendedGroup, ReassembledXmp};

// =============================================================================
// File Report
// =============================================================================

/// Everything the tool learned about one input file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// Input path as given on the command line
    pub file: String,

    /// File size in bytes
    pub size: u64,

    pub segments: Vec<SegmentReport>,

    /// First Exif TIFF stream, if the file has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif: Option<ExifReport>,

    pub xmp: XmpReport,

    /// Absent when extraction was not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionReport>,
}

impl FileReport {
    /// Build the structural part of a report from a decoded file.
    pub fn new(file: impl Into<String>, jpeg: &JpegFile) -> Self {
        FileReport {
            file: file.into(),
            size: jpeg.source().len(),
            segments: jpeg.segments().iter().map(SegmentReport::from).collect(),
            exif: jpeg.exif().map(ExifReport::from),
            xmp: XmpReport::from(jpeg.xmp()),
            extraction: None,
        }
    }
}

// =============================================================================
// Segments
// =============================================================================

/// One framed segment.
#[derive(Debug, Serialize)]
pub struct SegmentReport {
    pub name: String,
    pub marker: u16,
    pub marker_offset: u64,
    pub file_offset: u64,
    pub length: u64,

    /// Payload kind (`jfif`, `exif`, `xmp`, `xmp-extended`, `generic`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jfif: Option<JfifHeader>,

    /// Why the payload could not be decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&DecodedSegment> for SegmentReport {
    fn from(decoded: &DecodedSegment) -> Self {
        let segment = &decoded.segment;
        let (payload, jfif, error) = match &decoded.payload {
            Ok(p) => {
                let jfif = match p {
                    SegmentPayload::Jfif(header) => Some(*header),
                    _ => None,
                };
                (Some(p.kind_name()), jfif, None)
            }
            Err(e) => (None, None, Some(e.to_string())),
        };

        SegmentReport {
            name: segment.name(),
            marker: segment.marker,
            marker_offset: segment.marker_offset,
            file_offset: segment.file_offset,
            length: segment.length,
            payload,
            jfif,
            error,
        }
    }
}

// =============================================================================
// Exif
// =============================================================================

/// Exif directories in chain order.
#[derive(Debug, Serialize)]
pub struct ExifReport {
    pub byte_order: ByteOrder,

    /// Absolute offset of the TIFF header
    pub base_offset: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub ifds: Vec<IfdReport>,
}

#[derive(Debug, Serialize)]
pub struct IfdReport {
    /// Absolute offset of the directory
    pub offset: u64,
    pub entries: Vec<EntryReport>,
}

#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub tag: u16,
    pub name: String,
    pub field_type: String,
    pub count: u32,
    pub inline: bool,

    /// Absolute offset of the 12-byte entry
    pub offset: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<TypedValue>>,
}

impl From<&TiffFile> for ExifReport {
    fn from(tiff: &TiffFile) -> Self {
        let ifds = tiff
            .chain()
            .map(|ifd| IfdReport {
                offset: tiff.absolute_offset(ifd.offset),
                entries: ifd
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| EntryReport {
                        tag: entry.tag,
                        name: entry.tag_name(),
                        field_type: entry.type_name(),
                        count: entry.count,
                        inline: entry.is_inline,
                        offset: tiff.absolute_offset(ifd.entry_offset(i)),
                        values: entry.values.clone(),
                    })
                    .collect(),
            })
            .collect();

        ExifReport {
            byte_order: tiff.byte_order(),
            base_offset: tiff.base_offset,
            make: tiff.string_tag(TiffTag::Make),
            model: tiff.string_tag(TiffTag::Model),
            ifds,
        }
    }
}

// =============================================================================
// XMP
// =============================================================================

/// Reassembled XMP summary.
#[derive(Debug, Serialize)]
pub struct XmpReport {
    /// Length of the reassembled stream
    pub length: u64,
    pub standard_chunks: usize,
    pub extended_groups: Vec<ExtendedGroup>,
    pub documents: usize,

    /// Why document decoding stopped early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_by: Option<String>,
}

impl From<&ReassembledXmp> for XmpReport {
    fn from(xmp: &ReassembledXmp) -> Self {
        let decoded = xmp.decode();
        XmpReport {
            length: xmp.stream().len() as u64,
            standard_chunks: xmp.standard_chunks(),
            extended_groups: xmp.groups().to_vec(),
            documents: decoded.documents.len(),
            stopped_by: decoded.stopped_by.map(|e| e.to_string()),
        }
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Outcome of asset extraction.
#[derive(Debug, Serialize)]
pub struct ExtractionReport {
    /// `none`, `container` or `legacy`; absent on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ContainerItem>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DepthMetadata>,

    pub assets: Vec<AssetReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssetReport {
    pub kind: crate::extract::AssetKind,
    pub mime: String,
    pub suffix: &'static str,
    pub length: u64,
    pub trailer_synthesized: bool,

    /// Where the asset was written, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&Result<ExtractionOutcome, SchemaError>> for ExtractionReport {
    fn from(result: &Result<ExtractionOutcome, SchemaError>) -> Self {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                return ExtractionReport {
                    schema: None,
                    items: None,
                    metadata: None,
                    assets: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };

        let (items, metadata) = match outcome {
            ExtractionOutcome::NoAssets => (None, None),
            ExtractionOutcome::Container(c) => (Some(c.items.clone()), None),
            ExtractionOutcome::Legacy(l) => (None, Some(l.metadata.clone())),
        };

        let assets = outcome
            .assets()
            .iter()
            .map(|asset| AssetReport {
                kind: asset.kind,
                mime: asset.mime.clone(),
                suffix: asset.file_suffix(),
                length: asset.data.len() as u64,
                trailer_synthesized: asset.trailer_synthesized,
                path: None,
            })
            .collect();

        ExtractionReport {
            schema: Some(outcome.schema_name()),
            items,
            metadata,
            assets,
            error: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
