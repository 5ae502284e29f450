//! Resource container schema.
//!
//! The second XMP document's directory lists four items. Item 0 is the
//! primary image (the JPEG being read, length 0); items 1 to 3 are appended
//! after it and share the file's trailing EOI with the primary image:
//!
//! ```text
//! |<----------------------- Data (L) ----------------------->|EOI|
//! |  primary scan  | original image | depth map | confidence ... |
//!                  ^ base           ^           ^               ^ L + 2
//! base = L + 2 - (len[1] + len[2] + len[3])
//! ```
//!
//! The last item therefore always ends two bytes past the Data segment; its
//! EOI is the file's EOI, which is re-appended to the extracted bytes.

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::SchemaError;
use crate::format::jpeg::markers::EOI_BYTES;
use crate::format::jpeg::Segment;
use crate::format::xmp::{DirectoryItem, XmpDocument};

use super::{Asset, AssetKind, MIME_JPEG};

/// Number of items a container directory must list
pub const CONTAINER_ITEM_COUNT: usize = 4;

/// Expected data URIs, in directory order
pub const CONTAINER_DATA_URIS: [&str; CONTAINER_ITEM_COUNT] = [
    "primary_image",
    "android/original_image",
    "android/depthmap",
    "android/confidencemap",
];

const ASSET_KINDS: [AssetKind; 3] = [
    AssetKind::OriginalImage,
    AssetKind::DepthMap,
    AssetKind::ConfidenceMap,
];

/// A directory item with its reconstructed offset into the Data segment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContainerItem {
    pub mime: String,
    pub length: i64,
    pub data_uri: String,
    /// Offset relative to the start of the Data segment
    pub offset: i64,
}

/// Items and carved assets of a container file.
#[derive(Debug, Clone)]
pub struct ContainerExtraction {
    pub items: Vec<ContainerItem>,
    pub assets: Vec<Asset>,
}

/// Whether the documents look like a resource container.
pub fn applies(documents: &[XmpDocument]) -> bool {
    documents.len() > 1 && documents[1].items.len() == CONTAINER_ITEM_COUNT
}

/// Check the four directory items against the fixed layout.
pub fn validate(items: &[DirectoryItem]) -> Result<(), SchemaError> {
    if items.len() != CONTAINER_ITEM_COUNT {
        return Err(SchemaError::UnknownContainerFormat(format!(
            "expected {} directory items, found {}",
            CONTAINER_ITEM_COUNT,
            items.len()
        )));
    }

    for (i, (item, uri)) in items.iter().zip(CONTAINER_DATA_URIS).enumerate() {
        if item.mime != MIME_JPEG {
            return Err(SchemaError::UnknownContainerFormat(format!(
                "item {} has mime {:?}",
                i, item.mime
            )));
        }
        if item.data_uri != uri {
            return Err(SchemaError::UnknownContainerFormat(format!(
                "item {} has data URI {:?}, expected {:?}",
                i, item.data_uri, uri
            )));
        }
        let length_ok = if i == 0 {
            item.length == 0
        } else {
            item.length > 0
        };
        if !length_ok {
            return Err(SchemaError::UnknownContainerFormat(format!(
                "item {} has length {}",
                i, item.length
            )));
        }
    }

    Ok(())
}

/// Reconstruct item offsets from the Data segment length.
pub fn place_items(
    items: &[DirectoryItem],
    data_length: u64,
) -> Result<Vec<ContainerItem>, SchemaError> {
    let overflow = || SchemaError::UnknownContainerFormat("item lengths overflow".to_string());

    let tail = items[1..]
        .iter()
        .try_fold(0i64, |acc, item| acc.checked_add(item.length))
        .ok_or_else(overflow)?;
    let base = i64::try_from(data_length)
        .ok()
        .and_then(|l| l.checked_add(EOI_BYTES.len() as i64))
        .and_then(|l| l.checked_sub(tail))
        .ok_or_else(overflow)?;

    let mut placed = Vec::with_capacity(items.len());
    let mut offset = base;
    for (i, item) in items.iter().enumerate() {
        let item_offset = if i == 0 { 0 } else { offset };
        if i > 0 {
            offset = offset.checked_add(item.length).ok_or_else(overflow)?;
        }
        placed.push(ContainerItem {
            mime: item.mime.clone(),
            length: item.length,
            data_uri: item.data_uri.clone(),
            offset: item_offset,
        });
    }
    Ok(placed)
}

/// Copy `[offset, offset + length)` out of the Data segment.
///
/// A range that ends exactly two bytes past the segment is completed with an
/// EOI marker.
pub fn carve(data: &Segment, item: &ContainerItem) -> Result<(Bytes, bool), SchemaError> {
    let available = data.length;
    let outside = || SchemaError::RangeOutsideData {
        uri: item.data_uri.clone(),
        offset: item.offset,
        end: item.offset.saturating_add(item.length),
        available,
    };

    let start = u64::try_from(item.offset).map_err(|_| outside())?;
    let length = u64::try_from(item.length).map_err(|_| outside())?;
    let end = start.checked_add(length).ok_or_else(outside)?;

    if end <= available {
        let bytes = data.payload.read_at(start, length as usize)?;
        return Ok((bytes, false));
    }

    let trailer = EOI_BYTES.len() as u64;
    if end == available + trailer && length >= trailer {
        let mut bytes = BytesMut::with_capacity(length as usize);
        bytes.extend_from_slice(&data.payload.read_at(start, (length - trailer) as usize)?);
        bytes.extend_from_slice(&EOI_BYTES);
        return Ok((bytes.freeze(), true));
    }

    Err(outside())
}

/// Validate, place and carve the container items.
pub fn extract(
    documents: &[XmpDocument],
    data: &Segment,
) -> Result<ContainerExtraction, SchemaError> {
    let directory = documents
        .get(1)
        .map(|d| d.items.as_slice())
        .unwrap_or_default();
    validate(directory)?;

    let items = place_items(directory, data.length)?;
    let mut assets = Vec::with_capacity(ASSET_KINDS.len());
    for (item, kind) in items[1..].iter().zip(ASSET_KINDS) {
        let (bytes, trailer_synthesized) = carve(data, item)?;
        debug!(
            uri = %item.data_uri,
            offset = item.offset,
            length = item.length,
            trailer_synthesized,
            "Carved container item"
        );
        assets.push(Asset {
            kind,
            mime: item.mime.clone(),
            data: bytes,
            trailer_synthesized,
        });
    }

    Ok(ContainerExtraction { items, assets })
}

// =============================================================================
// Tests
// =============================================================================
