//! XMP reassembly integration tests.
//!
//! Tests verify:
//! - Extended XMP split across segments reassembles byte for byte
//! - Portions are ordered by their declared offset, not file order
//! - Length and MD5 digest checks on reassembled groups
//! - Document decoding of standard plus extended packets

use xmp_carver::{ChunkKind, SegmentPayload};

use super::test_utils::{
    container_directory_xmp, container_main_xmp, decode, legacy_extended_xmp, legacy_main_xmp,
    md5_digest, JpegBuilder,
};

// =============================================================================
// Reassembly Tests
// =============================================================================

#[test]
fn test_extended_split_across_segments() {
    let main = container_main_xmp();
    let extended = container_directory_xmp([100, 200, 300]);
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp(&main)
            .xmp_extended_split(extended.as_bytes(), 128)
            .build(),
    );

    let xmp = jpeg.xmp();
    assert_eq!(xmp.standard_chunks(), 1);
    assert_eq!(xmp.groups().len(), 1);

    let group = &xmp.groups()[0];
    assert_eq!(group.chunks, extended.len().div_ceil(128));
    assert_eq!(group.assembled_length, extended.len() as u64);
    assert!(group.length_matches);
    assert!(group.digest_matches);

    let expected = [main.as_bytes(), extended.as_bytes()].concat();
    assert_eq!(&xmp.stream()[..], &expected[..]);
}

#[test]
fn test_portions_sorted_by_offset() {
    let packet = legacy_extended_xmp(b"depth-bytes", b"image-bytes");
    let bytes = packet.as_bytes();
    let digest = md5_digest(bytes);
    let full = bytes.len() as u32;
    let (a, rest) = bytes.split_at(100);
    let (b, c) = rest.split_at(100);

    // Written to the file as {200, 0, 100}
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp_extended(&digest, full, 200, c)
            .xmp_extended(&digest, full, 0, a)
            .xmp_extended(&digest, full, 100, b)
            .build(),
    );

    let xmp = jpeg.xmp();
    assert_eq!(&xmp.stream()[..], bytes);
    assert!(xmp.groups()[0].digest_matches);
    assert_eq!(xmp.documents().len(), 1);
}

#[test]
fn test_digest_mismatch_is_flagged() {
    let packet = legacy_extended_xmp(b"d", b"i");
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp_extended(&[b'F'; 32], packet.len() as u32 + 10, 0, packet.as_bytes())
            .build(),
    );

    let group = &jpeg.xmp().groups()[0];
    assert!(!group.digest_matches);
    assert!(!group.length_matches);
    assert_eq!(group.digest, "F".repeat(32));
    // The data is still usable
    assert_eq!(jpeg.xmp().documents().len(), 1);
}

#[test]
fn test_chunk_offsets_recorded() {
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp("<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>")
            .build(),
    );

    let segment = &jpeg.segments()[2];
    let chunk = segment
        .payload
        .as_ref()
        .unwrap()
        .xmp_chunk(segment.segment.file_offset)
        .unwrap();
    assert_eq!(chunk.kind, ChunkKind::Standard);
    assert_eq!(chunk.file_offset, segment.segment.file_offset);
    assert!(chunk.payload.starts_with(b"<x:xmpmeta"));
}

#[test]
fn test_extended_payload_header() {
    let packet = b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>";
    let jpeg = decode(JpegBuilder::new().jfif().xmp_extended_split(packet, 16).build());

    match &jpeg.segments()[3].payload {
        Ok(SegmentPayload::XmpExtended { header, payload }) => {
            assert_eq!(header.offset, 16);
            assert_eq!(header.full_length, packet.len() as u32);
            assert_eq!(&header.digest, &md5_digest(packet));
            assert_eq!(&payload[..], &packet[16..32]);
        }
        other => panic!("expected extended XMP, got {:?}", other),
    }
}

// =============================================================================
// Document Tests
// =============================================================================

#[test]
fn test_standard_and_extended_documents() {
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp(&legacy_main_xmp("image/png", "0.5", "12.25"))
            .xmp_extended_split(legacy_extended_xmp(b"depth", b"image").as_bytes(), 64)
            .build(),
    );

    let decoded = jpeg.xmp().decode();
    assert!(decoded.stopped_by.is_none());
    assert_eq!(decoded.documents.len(), 2);

    let main = &decoded.documents[0];
    assert_eq!(main.depth_mime, "image/png");
    assert_eq!(main.depth_format, "RangeInverse");
    assert_eq!(main.depth_near, 0.5);
    assert_eq!(main.depth_far, 12.25);
    assert_eq!(main.image_mime, "image/jpeg");

    // Prefixes differ in the extended document; namespaces match
    let extended = &decoded.documents[1];
    assert_eq!(extended.depth_data, "ZGVwdGg=");
    assert_eq!(extended.image_data, "aW1hZ2U=");
}

#[test]
fn test_directory_items() {
    let directory = container_directory_xmp([10, 20, 30]);
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp(&container_main_xmp())
            .xmp_extended_split(directory.as_bytes(), 200)
            .build(),
    );

    let documents = jpeg.xmp().documents();
    assert_eq!(documents.len(), 2);
    assert!(documents[0].items.is_empty());

    let items = &documents[1].items;
    let uris: Vec<&str> = items.iter().map(|i| i.data_uri.as_str()).collect();
    assert_eq!(
        uris,
        [
            "primary_image",
            "android/original_image",
            "android/depthmap",
            "android/confidencemap"
        ]
    );
    let lengths: Vec<i64> = items.iter().map(|i| i.length).collect();
    assert_eq!(lengths, [0, 10, 20, 30]);
}

#[test]
fn test_malformed_number_stops_decoding() {
    let jpeg = decode(
        JpegBuilder::new()
            .jfif()
            .xmp(&legacy_main_xmp("image/png", "near", "1"))
            .build(),
    );

    let decoded = jpeg.xmp().decode();
    assert!(decoded.documents.is_empty());
    assert!(decoded
        .stopped_by
        .unwrap()
        .to_string()
        .contains("GDepth:Near"));
}
