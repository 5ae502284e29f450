//! Asset extraction integration tests.
//!
//! Tests verify:
//! - Resource container files yield the three appended images byte for byte
//! - The last container image gets the file's EOI back
//! - Legacy depth files yield the decoded depth map and image
//! - Schema selection for files without XMP or with unusable XMP

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use xmp_carver::{AssetExtractor, AssetKind, ExtractionOutcome, SchemaError};

use super::test_utils::{
    container_jpeg, container_main_xmp, decode, fake_jpeg, legacy_jpeg, legacy_main_xmp,
    JpegBuilder,
};

// =============================================================================
// Container Schema
// =============================================================================

#[test]
fn test_container_end_to_end() {
    let primary = [0x11u8; 64];
    let original = fake_jpeg(120, 0x22);
    let depth = fake_jpeg(40, 0x33);
    let confidence = fake_jpeg(30, 0x44);

    let jpeg = decode(container_jpeg(&primary, &original, &depth, &confidence));
    let outcome = AssetExtractor::new(&jpeg).extract().unwrap();

    let ExtractionOutcome::Container(container) = &outcome else {
        panic!("expected container outcome, got {}", outcome.schema_name());
    };

    let offsets: Vec<i64> = container.items.iter().map(|i| i.offset).collect();
    assert_eq!(offsets, [0, 64, 64 + 124, 64 + 124 + 44]);

    let assets = outcome.assets();
    assert_eq!(assets.len(), 3);
    assert_eq!(assets[0].kind, AssetKind::OriginalImage);
    assert_eq!(&assets[0].data[..], &original[..]);
    assert_eq!(&assets[1].data[..], &depth[..]);
    assert_eq!(&assets[2].data[..], &confidence[..]);

    assert!(!assets[0].trailer_synthesized);
    assert!(!assets[1].trailer_synthesized);
    assert!(assets[2].trailer_synthesized);
    assert!(assets[2].data.ends_with(&[0xFF, 0xD9]));

    let suffixes: Vec<&str> = assets.iter().map(|a| a.file_suffix()).collect();
    assert_eq!(
        suffixes,
        ["original_image.jpg", "depthmap.jpg", "confidencemap.jpg"]
    );
}

#[test]
fn test_container_base_before_data() {
    let primary = [0x11u8; 8];
    let original = fake_jpeg(10, 0x22);
    let depth = fake_jpeg(10, 0x33);
    let confidence = fake_jpeg(10, 0x44);
    let mut data = container_jpeg(&primary, &original, &depth, &confidence);

    // Drop the primary scan and the head of the original image, so the
    // reconstructed base lands before the start of the Data segment
    let sos_end = data.len() - 2 - (primary.len() + 14 + 14 + 12);
    data.drain(sos_end..sos_end + primary.len() + 4);
    let jpeg = decode(data);

    let err = AssetExtractor::new(&jpeg).extract().unwrap_err();
    assert!(matches!(err, SchemaError::RangeOutsideData { .. }));
}

// =============================================================================
// Legacy Schema
// =============================================================================

#[test]
fn test_legacy_end_to_end() {
    let depth_png = b"\x89PNG\r\n\x1a\n fake depth".to_vec();
    let image = fake_jpeg(200, 0x5A);

    let jpeg = decode(legacy_jpeg("image/png", &depth_png, &image));
    let outcome = AssetExtractor::new(&jpeg).extract().unwrap();

    let ExtractionOutcome::Legacy(legacy) = &outcome else {
        panic!("expected legacy outcome, got {}", outcome.schema_name());
    };
    assert_eq!(legacy.metadata.format, "RangeInverse");
    assert_eq!(legacy.metadata.near, 0.5);
    assert_eq!(legacy.metadata.far, 12.25);

    let assets = outcome.assets();
    assert_eq!(assets[0].kind, AssetKind::Depth);
    assert_eq!(&assets[0].data[..], &depth_png[..]);
    assert_eq!(assets[0].file_suffix(), "depth.png");
    assert_eq!(assets[1].kind, AssetKind::Image);
    assert_eq!(&assets[1].data[..], &image[..]);
    assert_eq!(assets[1].file_suffix(), "image.jpg");
}

#[test]
fn test_legacy_jpeg_depth() {
    let jpeg = decode(legacy_jpeg("image/jpeg", &fake_jpeg(16, 1), &fake_jpeg(16, 2)));
    let outcome = AssetExtractor::new(&jpeg).extract().unwrap();
    assert_eq!(outcome.assets()[0].file_suffix(), "depth.jpg");
}

#[test]
fn test_single_document_is_insufficient() {
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp(&legacy_main_xmp("image/png", "0.5", "2"))
            .build(),
    );

    let err = AssetExtractor::new(&jpeg).extract().unwrap_err();
    assert!(matches!(err, SchemaError::InsufficientDocuments(1)));
}

#[test]
fn test_single_document_with_payloads_is_insufficient() {
    // Both payloads inline in the one standard packet, no extended XMP
    let xmp = format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:GDepth="http://ns.google.com/photos/1.0/depthmap/"
        xmlns:GImage="http://ns.google.com/photos/1.0/image/"
      GDepth:Format="RangeInverse"
      GDepth:Near="0.5"
      GDepth:Far="2"
      GDepth:Mime="image/png"
      GDepth:Data="{}"
      GImage:Mime="image/jpeg"
      GImage:Data="{}"/>
  </rdf:RDF>
</x:xmpmeta>"#,
        STANDARD.encode(b"depth data"),
        STANDARD.encode(fake_jpeg(10, 0x5A)),
    );
    let jpeg = decode(JpegBuilder::new().jfif().xmp(&xmp).build());
    assert_eq!(jpeg.xmp().decode().documents.len(), 1);

    let result = AssetExtractor::new(&jpeg).extract();
    assert!(matches!(result, Err(SchemaError::InsufficientDocuments(1))));
}

#[test]
fn test_container_main_only_is_insufficient() {
    let jpeg = decode(JpegBuilder::new().jfif().xmp(&container_main_xmp()).build());
    let err = AssetExtractor::new(&jpeg).extract().unwrap_err();
    assert!(matches!(err, SchemaError::InsufficientDocuments(1)));
}

// =============================================================================
// No XMP
// =============================================================================

#[test]
fn test_no_xmp_yields_no_assets() {
    let jpeg = decode(JpegBuilder::new().jfif().dqt().build());
    let outcome = AssetExtractor::new(&jpeg).extract().unwrap();

    assert!(matches!(outcome, ExtractionOutcome::NoAssets));
    assert!(outcome.assets().is_empty());
    assert_eq!(outcome.schema_name(), "none");
}
