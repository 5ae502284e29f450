//! Legacy depth schema (GDepth / GImage).
//!
//! The main XMP document declares the depth parameters and mime types; the
//! extended document carries the depth map and the secondary image as base64
//! attributes. Fields missing from the main document are taken from the
//! extended one.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use tracing::debug;

use crate::error::SchemaError;
use crate::format::xmp::XmpDocument;

use super::{Asset, AssetKind, MIME_JPEG, MIME_PNG};

/// Depth parameters after merging the two documents.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DepthMetadata {
    /// Depth encoding, e.g. `RangeInverse` or `RangeLinear`
    pub format: String,
    pub near: f64,
    pub far: f64,
    pub depth_mime: String,
    pub image_mime: String,
}

/// Metadata and decoded assets of a legacy depth file.
#[derive(Debug, Clone)]
pub struct LegacyExtraction {
    pub metadata: DepthMetadata,
    pub assets: Vec<Asset>,
}

fn or_else_string(primary: &str, fallback: &str) -> String {
    if primary.is_empty() {
        fallback.to_string()
    } else {
        primary.to_string()
    }
}

fn or_else_number(primary: f64, fallback: f64) -> f64 {
    if primary == 0.0 {
        fallback
    } else {
        primary
    }
}

/// Check that the two documents carry a usable depth map and image.
pub fn validate(documents: &[XmpDocument]) -> Result<(), SchemaError> {
    let [main, extended] = documents else {
        return Err(SchemaError::InsufficientDocuments(documents.len()));
    };

    if extended.depth_data.is_empty() {
        return Err(SchemaError::UnknownDepthFormat(
            "extended document has no GDepth:Data".to_string(),
        ));
    }
    if extended.image_data.is_empty() {
        return Err(SchemaError::UnknownDepthFormat(
            "extended document has no GImage:Data".to_string(),
        ));
    }

    let depth_mime_ok = [main, extended]
        .iter()
        .any(|d| d.depth_mime == MIME_JPEG || d.depth_mime == MIME_PNG);
    if !depth_mime_ok {
        return Err(SchemaError::UnknownDepthFormat(format!(
            "GDepth:Mime is neither {} nor {}",
            MIME_JPEG, MIME_PNG
        )));
    }

    if main.image_mime != MIME_JPEG && extended.image_mime != MIME_JPEG {
        return Err(SchemaError::UnknownDepthFormat(format!(
            "GImage:Mime is not {}",
            MIME_JPEG
        )));
    }

    Ok(())
}

/// Merge the main document with the extended one.
///
/// Scalar fields come from `main` unless empty or zero; payloads always come
/// from `extended`.
pub fn merge(main: &XmpDocument, extended: &XmpDocument) -> XmpDocument {
    XmpDocument {
        depth_mime: or_else_string(&main.depth_mime, &extended.depth_mime),
        depth_format: or_else_string(&main.depth_format, &extended.depth_format),
        depth_near: or_else_number(main.depth_near, extended.depth_near),
        depth_far: or_else_number(main.depth_far, extended.depth_far),
        depth_data: extended.depth_data.clone(),
        image_mime: or_else_string(&main.image_mime, &extended.image_mime),
        image_data: extended.image_data.clone(),
        items: main.items.clone(),
    }
}

/// Decode standard base64, ignoring line breaks.
pub fn decode_base64(field: &'static str, text: &str) -> Result<Bytes, SchemaError> {
    let cleaned: String = text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    STANDARD
        .decode(cleaned.as_bytes())
        .map(Bytes::from)
        .map_err(|e| SchemaError::InvalidBase64 {
            field,
            message: e.to_string(),
        })
}

/// Validate, merge and decode the two documents.
pub fn extract(documents: &[XmpDocument]) -> Result<LegacyExtraction, SchemaError> {
    validate(documents)?;
    let merged = merge(&documents[0], &documents[1]);

    let depth = decode_base64("GDepth:Data", &merged.depth_data)?;
    let image = decode_base64("GImage:Data", &merged.image_data)?;

    let metadata = DepthMetadata {
        format: merged.depth_format,
        near: merged.depth_near,
        far: merged.depth_far,
        depth_mime: merged.depth_mime,
        image_mime: merged.image_mime,
    };
    debug!(
        format = %metadata.format,
        near = metadata.near,
        far = metadata.far,
        depth_bytes = depth.len(),
        image_bytes = image.len(),
        "Decoded legacy depth payloads"
    );

    let assets = vec![
        Asset {
            kind: AssetKind::Depth,
            mime: metadata.depth_mime.clone(),
            data: depth,
            trailer_synthesized: false,
        },
        Asset {
            kind: AssetKind::Image,
            mime: metadata.image_mime.clone(),
            data: image,
            trailer_synthesized: false,
        },
    ];

    Ok(LegacyExtraction { metadata, assets })
}

// =============================================================================
// Tests
// =============================================================================
