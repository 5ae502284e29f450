//! Test utilities for integration tests.
//!
//! This module provides a builder for synthetic JPEG files carrying JFIF,
//! Exif and XMP segments, plus XMP documents for both embedding schemas.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use md5::{Digest, Md5};

use xmp_carver::{ByteSource, JpegFile};

// =============================================================================
// Markers
// =============================================================================

pub const SOI: u16 = 0xFFD8;
pub const APP0: u16 = 0xFFE0;
pub const APP1: u16 = 0xFFE1;
pub const DQT: u16 = 0xFFDB;
pub const SOS: u16 = 0xFFDA;
pub const EOI: u16 = 0xFFD9;

pub const XMP_STANDARD_ID: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
pub const XMP_EXTENSION_ID: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";

/// Scan bytes used when a test does not care about the entropy-coded data.
pub const DEFAULT_SCAN: [u8; 8] = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0x00];

/// SOS header for a single-component baseline scan.
const SOS_HEADER: [u8; 6] = [0x01, 0x01, 0x00, 0x00, 0x3F, 0x00];

// =============================================================================
// JPEG Builder
// =============================================================================

/// Assembles a JPEG byte stream segment by segment.
///
/// `build` always emits SOI first, then the added segments, an SOS header, the
/// scan data and a final EOI.
#[derive(Debug, Default, Clone)]
pub struct JpegBuilder {
    header: Vec<u8>,
    scan: Vec<u8>,
}

impl JpegBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a length-bearing segment.
    pub fn segment(mut self, marker: u16, payload: &[u8]) -> Self {
        let length = u16::try_from(payload.len() + 2).expect("segment payload too large");
        self.header.extend_from_slice(&marker.to_be_bytes());
        self.header.extend_from_slice(&length.to_be_bytes());
        self.header.extend_from_slice(payload);
        self
    }

    /// APP0 with a JFIF 1.02 header at 72 dpi.
    pub fn jfif(self) -> Self {
        let mut payload = b"JFIF\0".to_vec();
        payload.extend_from_slice(&[0x01, 0x02, 0x01, 0x00, 0x48, 0x00, 0x48, 0x00, 0x00]);
        self.segment(APP0, &payload)
    }

    /// APP1 carrying an Exif TIFF stream.
    pub fn exif(self, tiff: &[u8]) -> Self {
        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(tiff);
        self.segment(APP1, &payload)
    }

    /// APP1 carrying a standard XMP packet.
    pub fn xmp(self, packet: &str) -> Self {
        let mut payload = XMP_STANDARD_ID.to_vec();
        payload.extend_from_slice(packet.as_bytes());
        self.segment(APP1, &payload)
    }

    /// APP1 carrying one portion of an extended XMP packet.
    pub fn xmp_extended(self, digest: &[u8; 32], full_length: u32, offset: u32, portion: &[u8]) -> Self {
        let mut payload = XMP_EXTENSION_ID.to_vec();
        payload.extend_from_slice(digest);
        payload.extend_from_slice(&full_length.to_be_bytes());
        payload.extend_from_slice(&offset.to_be_bytes());
        payload.extend_from_slice(portion);
        self.segment(APP1, &payload)
    }

    /// Split `packet` into portions of `portion_size` bytes, in order.
    pub fn xmp_extended_split(mut self, packet: &[u8], portion_size: usize) -> Self {
        let digest = md5_digest(packet);
        let full_length = packet.len() as u32;
        for (i, portion) in packet.chunks(portion_size).enumerate() {
            let offset = (i * portion_size) as u32;
            self = self.xmp_extended(&digest, full_length, offset, portion);
        }
        self
    }

    /// A 64-entry quantization table of ones.
    pub fn dqt(self) -> Self {
        let mut payload = vec![0x00];
        payload.extend_from_slice(&[1u8; 64]);
        self.segment(DQT, &payload)
    }

    /// Bytes between the SOS header and the final EOI.
    pub fn scan(mut self, data: &[u8]) -> Self {
        self.scan = data.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = SOI.to_be_bytes().to_vec();
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&SOS.to_be_bytes());
        out.extend_from_slice(&((SOS_HEADER.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&SOS_HEADER);
        if self.scan.is_empty() {
            out.extend_from_slice(&DEFAULT_SCAN);
        } else {
            out.extend_from_slice(&self.scan);
        }
        out.extend_from_slice(&EOI.to_be_bytes());
        out
    }
}

/// Decode an in-memory file.
pub fn decode(data: Vec<u8>) -> JpegFile {
    JpegFile::decode(ByteSource::from_bytes(data)).expect("synthetic file should frame")
}

/// A stand-in for a complete JPEG image: SOI, `body_len` filler bytes, EOI.
pub fn fake_jpeg(body_len: usize, fill: u8) -> Vec<u8> {
    let mut out = SOI.to_be_bytes().to_vec();
    out.extend(std::iter::repeat(fill).take(body_len));
    out.extend_from_slice(&EOI.to_be_bytes());
    out
}

// =============================================================================
// TIFF Builder
// =============================================================================

/// Offset of the first IFD in [`build_tiff`] output.
pub const TIFF_IFD0_OFFSET: u32 = 8;

/// Offset of the second IFD in [`build_tiff`] output.
pub const TIFF_IFD1_OFFSET: u32 = 50;

/// Offset of the out-of-line Make string in [`build_tiff`] output.
pub const TIFF_MAKE_OFFSET: u32 = 68;

/// A two-IFD TIFF stream.
///
/// IFD0 holds Make ("Canon", out of line), Orientation (1, inline) and
/// XResolution (72/1, out of line); IFD1 holds JPEGInterchangeFormat.
pub fn build_tiff(little_endian: bool) -> Vec<u8> {
    let u16b = |v: u16| if little_endian { v.to_le_bytes() } else { v.to_be_bytes() };
    let u32b = |v: u32| if little_endian { v.to_le_bytes() } else { v.to_be_bytes() };

    let mut out = Vec::new();
    out.extend_from_slice(if little_endian { b"II" } else { b"MM" });
    out.extend_from_slice(&u16b(42));
    out.extend_from_slice(&u32b(TIFF_IFD0_OFFSET));

    let entry = |out: &mut Vec<u8>, tag: u16, ty: u16, count: u32, slot: [u8; 4]| {
        out.extend_from_slice(&u16b(tag));
        out.extend_from_slice(&u16b(ty));
        out.extend_from_slice(&u32b(count));
        out.extend_from_slice(&slot);
    };

    // IFD0 @ 8
    out.extend_from_slice(&u16b(3));
    entry(&mut out, 0x010F, 2, 6, u32b(TIFF_MAKE_OFFSET));
    let mut orientation = [0u8; 4];
    orientation[..2].copy_from_slice(&u16b(1));
    entry(&mut out, 0x0112, 3, 1, orientation);
    entry(&mut out, 0x011A, 5, 1, u32b(TIFF_MAKE_OFFSET + 6));
    out.extend_from_slice(&u32b(TIFF_IFD1_OFFSET));

    // IFD1 @ 50
    assert_eq!(out.len() as u32, TIFF_IFD1_OFFSET);
    out.extend_from_slice(&u16b(1));
    entry(&mut out, 0x0201, 4, 1, u32b(0));
    out.extend_from_slice(&u32b(0));

    // Values @ 68
    assert_eq!(out.len() as u32, TIFF_MAKE_OFFSET);
    out.extend_from_slice(b"Canon\0");
    out.extend_from_slice(&u32b(72));
    out.extend_from_slice(&u32b(1));
    out
}

// =============================================================================
// XMP Documents
// =============================================================================

/// MD5 of `data` as 32 uppercase hex characters.
pub fn md5_digest(data: &[u8]) -> [u8; 32] {
    let hex = hex::encode_upper(Md5::digest(data));
    let mut out = [0u8; 32];
    out.copy_from_slice(hex.as_bytes());
    out
}

/// Main document of the legacy depth schema.
pub fn legacy_main_xmp(depth_mime: &str, near: &str, far: &str) -> String {
    format!(
        r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:GDepth="http://ns.google.com/photos/1.0/depthmap/"
        xmlns:GImage="http://ns.google.com/photos/1.0/image/"
      GDepth:Format="RangeInverse"
      GDepth:Near="{near}"
      GDepth:Far="{far}"
      GDepth:Mime="{depth_mime}"
      GImage:Mime="image/jpeg"/>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#
    )
}

/// Extended document of the legacy depth schema, using other prefixes.
pub fn legacy_extended_xmp(depth: &[u8], image: &[u8]) -> String {
    format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:d="http://ns.google.com/photos/1.0/depthmap/"
        xmlns:i="http://ns.google.com/photos/1.0/image/"
      d:Data="{}"
      i:Data="{}"/>
  </rdf:RDF>
</x:xmpmeta>"#,
        STANDARD.encode(depth),
        STANDARD.encode(image)
    )
}

/// Main document of a resource container file.
pub fn container_main_xmp() -> String {
    r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:xmpNote="http://ns.adobe.com/xmp/note/"
      xmpNote:HasExtendedXMP="0123456789ABCDEF0123456789ABCDEF"/>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#
        .to_string()
}

/// Directory document listing the primary image and three appended images.
pub fn container_directory_xmp(lengths: [usize; 3]) -> String {
    let item = |uri: &str, length: usize| {
        format!(
            r#"
            <rdf:li rdf:parseType="Resource">
              <Container:Item Item:Mime="image/jpeg" Item:Length="{length}" Item:DataURI="{uri}"/>
            </rdf:li>"#
        )
    };

    format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description
        xmlns:Device="http://ns.google.com/photos/dd/1.0/device/"
        xmlns:Container="http://ns.google.com/photos/dd/1.0/container/"
        xmlns:Item="http://ns.google.com/photos/dd/1.0/item/">
      <Device:Container>
        <Container:Directory>
          <rdf:Seq>{}{}{}{}
          </rdf:Seq>
        </Container:Directory>
      </Device:Container>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#,
        item("primary_image", 0),
        item("android/original_image", lengths[0]),
        item("android/depthmap", lengths[1]),
        item("android/confidencemap", lengths[2]),
    )
}

/// A resource container file: the three images are appended to the primary
/// scan, the last one sharing the file's EOI.
pub fn container_jpeg(primary_scan: &[u8], original: &[u8], depth: &[u8], confidence: &[u8]) -> Vec<u8> {
    let directory = container_directory_xmp([original.len(), depth.len(), confidence.len()]);

    let mut scan = primary_scan.to_vec();
    scan.extend_from_slice(original);
    scan.extend_from_slice(depth);
    scan.extend_from_slice(&confidence[..confidence.len() - 2]);

    JpegBuilder::new()
        .jfif()
        .xmp(&container_main_xmp())
        .xmp_extended_split(directory.as_bytes(), 256)
        .dqt()
        .scan(&scan)
        .build()
}

/// A legacy depth file with the extended document split across segments.
pub fn legacy_jpeg(depth_mime: &str, depth: &[u8], image: &[u8]) -> Vec<u8> {
    let extended = legacy_extended_xmp(depth, image);
    JpegBuilder::new()
        .jfif()
        .xmp(&legacy_main_xmp(depth_mime, "0.5", "12.25"))
        .xmp_extended_split(extended.as_bytes(), 100)
        .dqt()
        .build()
}
