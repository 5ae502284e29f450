//! Robustness tests over damaged input.
//!
//! Tests verify:
//! - Any strict prefix of a valid file fails to frame instead of panicking
//! - Prefixes of a container file never panic in extraction
//! - Single-byte corruption anywhere never panics in decoding or extraction

use proptest::prelude::*;

use xmp_carver::{AssetExtractor, ByteSource, JpegFile};

use super::test_utils::{build_tiff, container_jpeg, fake_jpeg, legacy_jpeg, JpegBuilder};

fn container_sample() -> Vec<u8> {
    container_jpeg(
        &[0x11; 32],
        &fake_jpeg(48, 0x22),
        &fake_jpeg(24, 0x33),
        &fake_jpeg(16, 0x44),
    )
}

fn exif_sample() -> Vec<u8> {
    JpegBuilder::new()
        .exif(&build_tiff(false))
        .xmp("<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>")
        .dqt()
        .build()
}

/// Whether an EOI marker appears anywhere but at the very end.
fn has_early_eoi(data: &[u8]) -> bool {
    data[..data.len() - 2]
        .windows(2)
        .any(|w| w == [0xFF, 0xD9])
}

#[test]
fn test_samples_have_single_eoi() {
    // Otherwise a prefix could end on a stray EOI and frame successfully
    assert!(!has_early_eoi(&exif_sample()));
    assert!(!has_early_eoi(&legacy_jpeg(
        "image/png",
        b"depth",
        b"image"
    )));
}

#[test]
fn test_full_sample_frames() {
    assert!(JpegFile::decode(ByteSource::from_bytes(exif_sample())).is_ok());
    assert!(JpegFile::decode(ByteSource::from_bytes(container_sample())).is_ok());
}

proptest! {
    #[test]
    fn prop_truncated_exif_file_fails(cut in 0usize..10_000) {
        let data = exif_sample();
        let cut = cut % data.len();
        let result = JpegFile::decode(ByteSource::from_bytes(data[..cut].to_vec()));
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_truncated_legacy_file_fails(cut in 0usize..10_000) {
        let data = legacy_jpeg("image/png", b"depth", b"image");
        let cut = cut % data.len();
        let result = JpegFile::decode(ByteSource::from_bytes(data[..cut].to_vec()));
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_truncated_container_never_panics(cut in 0usize..10_000) {
        // Embedded images end in EOI, so some prefixes still frame
        let data = container_sample();
        let cut = cut % data.len();
        if let Ok(jpeg) = JpegFile::decode(ByteSource::from_bytes(data[..cut].to_vec())) {
            let _ = jpeg.to_string();
            let _ = AssetExtractor::new(&jpeg).extract();
        }
    }

    #[test]
    fn prop_corrupted_byte_never_panics(index in 0usize..10_000, value in any::<u8>()) {
        let mut data = container_sample();
        let index = index % data.len();
        data[index] = value;

        if let Ok(jpeg) = JpegFile::decode(ByteSource::from_bytes(data)) {
            let _ = jpeg.to_string();
            let _ = AssetExtractor::new(&jpeg).extract();
        }
    }

    #[test]
    fn prop_random_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = JpegFile::decode(ByteSource::from_bytes(data));
    }
}
